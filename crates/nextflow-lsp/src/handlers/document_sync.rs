//! Document synchronization handlers
//!
//! Handles document lifecycle events: open, change, save, close

use crate::diagnostics::DiagnosticPublisher;
use crate::frontend::CompilerFrontend;
use crate::orchestrator::{CycleReport, Orchestrator};
use lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams,
};

pub fn did_open<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: DidOpenTextDocumentParams,
) -> Option<CycleReport>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let document = params.text_document;
    orchestrator.did_open(document.uri, document.text, document.version)
}

/// Applies incremental or full-text changes, in the order they were sent.
pub fn did_change<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: DidChangeTextDocumentParams,
) -> Option<CycleReport>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let document = params.text_document;
    orchestrator.did_change(document.uri, document.version, params.content_changes)
}

pub fn did_save<F, P>(orchestrator: &mut Orchestrator<F, P>, params: DidSaveTextDocumentParams)
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    orchestrator.did_save(&params.text_document.uri);
}

pub fn did_close<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: DidCloseTextDocumentParams,
) -> Option<CycleReport>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    orchestrator.did_close(params.text_document.uri)
}
