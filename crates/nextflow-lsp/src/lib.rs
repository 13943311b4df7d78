//! Language server for Nextflow and Groovy sources.
//!
//! The server keeps a compiler frontend session alive across edits and decides,
//! for every notification or request, whether that session can be reused, how
//! much of the symbol index must be rebuilt and which diagnostics have to be
//! republished or cleared.

#[macro_use]
extern crate hiro_system_kit;

#[macro_use]
extern crate lazy_static;

pub mod active_context;
pub mod config;
pub mod diagnostics;
pub mod documents;
pub mod errors;
pub mod frontend;
pub mod handlers;
pub mod index;
pub mod orchestrator;
pub mod server;
pub mod utils;

#[cfg(test)]
mod tests;

use hiro_system_kit::Logger;

pub use lsp_types;

/// Logging context handed to every component that reports to the operator.
///
/// Nothing in here reaches the editor: faults are only ever written to the
/// logger, and an empty context silently drops them.
#[derive(Clone)]
pub struct Context {
    pub logger: Option<Logger>,
}

impl Context {
    pub fn new(logger: Logger) -> Context {
        Context { logger: Some(logger) }
    }

    pub fn empty() -> Context {
        Context { logger: None }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").field("logger", &self.logger.is_some()).finish()
    }
}
