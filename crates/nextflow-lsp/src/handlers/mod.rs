//! LSP request and notification handlers
//!
//! Each handler turns protocol params into calls on the [`Orchestrator`].
//! Requests go through [`prepare`] first, so they never answer from an index
//! that was last refreshed for another file.

pub mod completion;
pub mod document_sync;
pub mod hover;
pub mod symbols;
pub mod workspace;

pub use completion::completion;
pub use document_sync::{did_change, did_close, did_open, did_save};
pub use hover::hover;
pub use symbols::document_symbol;
pub use workspace::{did_change_configuration, did_change_watched_files};

use crate::diagnostics::DiagnosticPublisher;
use crate::frontend::CompilerFrontend;
use crate::orchestrator::Orchestrator;
use lsp_types::Url;

fn prepare<F, P>(orchestrator: &mut Orchestrator<F, P>, uri: &Url)
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    if let Some(report) = orchestrator.refresh_if_context_changed(uri) {
        orchestrator.ctx().try_log(|logger| {
            debug!(logger, "Refreshed {} before answering ({} error(s))", uri, report.errors)
        });
    }
}
