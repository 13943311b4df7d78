//! Error types for the frontend boundary, the session lifecycle and the
//! transport loop.

use crate::frontend::{CompileMessage, ErrorList};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors a compiler frontend reports back to the orchestrator.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Compilation stopped on errors that are already in the session's message
    /// list.
    #[error("compilation failed with {0} error(s)")]
    MultipleErrors(usize),
    /// A bug inside the frontend itself.
    #[error("internal compiler error: {0}")]
    Internal(String),
    #[error("{0}")]
    Unexpected(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A compile that did not run to the boundary phase.
///
/// Both variants carry whatever the frontend had collected before the fault,
/// which the caller keeps using as a best-effort error list.
#[derive(Debug, Error)]
pub enum CompileFault {
    #[error("internal compiler fault: {reason}")]
    Internal { reason: String, partial: ErrorList },
    #[error("unexpected fault while compiling: {reason}")]
    Unexpected { reason: String, partial: ErrorList },
}

impl CompileFault {
    pub fn partial(&self) -> &[CompileMessage] {
        match self {
            CompileFault::Internal { partial, .. } | CompileFault::Unexpected { partial, .. } => {
                partial
            }
        }
    }

    pub fn into_partial(self) -> ErrorList {
        match self {
            CompileFault::Internal { partial, .. } | CompileFault::Unexpected { partial, .. } => {
                partial
            }
        }
    }
}

/// Failures while moving the compilation session from one cycle to the next.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to delete output directory {}: {source}", path.display())]
    Purge {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to create output directory {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to configure compilation session: {0}")]
    Configure(#[source] FrontendError),
}

/// Errors that end the server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] lsp_server::ProtocolError),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to send message to client: {0}")]
    Send(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
