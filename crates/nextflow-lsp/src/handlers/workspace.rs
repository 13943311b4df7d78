//! Workspace notifications: files changed on disk and settings updates.

use crate::diagnostics::DiagnosticPublisher;
use crate::frontend::CompilerFrontend;
use crate::orchestrator::{CycleReport, Orchestrator};
use lsp_types::{DidChangeConfigurationParams, DidChangeWatchedFilesParams};

pub fn did_change_watched_files<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: DidChangeWatchedFilesParams,
) -> Option<CycleReport>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let uris = params.changes.into_iter().map(|event| event.uri).collect();
    orchestrator.did_change_watched_files(uris)
}

pub fn did_change_configuration<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: DidChangeConfigurationParams,
) -> Option<CycleReport>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    orchestrator.did_change_configuration(&params.settings)
}
