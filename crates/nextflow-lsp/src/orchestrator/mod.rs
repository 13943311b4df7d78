//! The incremental recompilation loop.
//!
//! [`Orchestrator`] owns every piece of mutable state the server has: the
//! open documents, the live compilation session, the declaration index, the
//! last published diagnostics and the active file. Each notification runs at
//! most one cycle:
//!
//! 1. the session manager reuses or recreates the session,
//! 2. the session is compiled up to the boundary phase,
//! 3. the index is rebuilt (new session) or patched for the cycle's files,
//! 4. diagnostics are diffed against the previous cycle and published.

mod compile;
pub mod session;
pub mod state_machine;

pub use compile::compile;

use crate::active_context::ContextTracker;
use crate::config::{classpath_from_settings, WorkspaceConfig};
use crate::diagnostics::{DiagnosticPublisher, DiagnosticSynchronizer};
use crate::documents::DocumentStore;
use crate::frontend::{CompilationSession, CompilerFrontend, SessionId};
use crate::index::AstIndex;
use crate::Context;
use lsp_types::{TextDocumentContentChangeEvent, Url};
use serde_json::Value;
use session::SessionManager;
use std::collections::HashSet;
use std::path::PathBuf;

/// Outcome of one compile cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub session: SessionId,
    pub reused: bool,
    /// Entries in the error list the cycle worked from.
    pub errors: usize,
    /// Files a publish was sent for, clears included.
    pub published: usize,
}

pub struct Orchestrator<F: CompilerFrontend, P: DiagnosticPublisher> {
    config: WorkspaceConfig,
    documents: DocumentStore,
    sessions: SessionManager<F>,
    index: AstIndex,
    diagnostics: DiagnosticSynchronizer,
    context: ContextTracker,
    publisher: P,
    ctx: Context,
}

impl<F: CompilerFrontend, P: DiagnosticPublisher> Orchestrator<F, P> {
    pub fn new(frontend: F, publisher: P, config: WorkspaceConfig, ctx: Context) -> Self {
        Self {
            config,
            documents: DocumentStore::new(),
            sessions: SessionManager::new(frontend),
            index: AstIndex::new(),
            diagnostics: DiagnosticSynchronizer::new(),
            context: ContextTracker::new(),
            publisher,
            ctx,
        }
    }

    pub fn did_open(&mut self, uri: Url, text: String, version: i32) -> Option<CycleReport> {
        self.documents.open(uri.clone(), text, version);
        self.recompile_active(uri)
    }

    pub fn did_change(
        &mut self,
        uri: Url,
        version: i32,
        changes: Vec<TextDocumentContentChangeEvent>,
    ) -> Option<CycleReport> {
        if !self.documents.change(&uri, version, changes) {
            self.ctx.try_log(|logger| {
                warn!(logger, "Ignoring change to unopened document {}", uri)
            });
            return None;
        }
        self.recompile_active(uri)
    }

    pub fn did_close(&mut self, uri: Url) -> Option<CycleReport> {
        self.documents.close(&uri);
        self.recompile_active(uri)
    }

    /// Saving changes nothing the compiler has not already seen through
    /// `did_change`.
    pub fn did_save(&mut self, uri: &Url) {
        self.ctx.try_log(|logger| debug!(logger, "Saved {}", uri));
    }

    /// Files changed on disk. Every event uri is reloaded by the frontend;
    /// the active file stays as it is.
    pub fn did_change_watched_files(&mut self, uris: Vec<Url>) -> Option<CycleReport> {
        if uris.is_empty() {
            return None;
        }
        for uri in &uris {
            self.documents.force_changed(uri);
        }
        let scope: HashSet<Url> = uris.into_iter().collect();
        self.run_cycle(&scope)
    }

    /// Applies a `workspace/didChangeConfiguration` payload. Payloads that are
    /// not objects are ignored.
    pub fn did_change_configuration(&mut self, settings: &Value) -> Option<CycleReport> {
        let Some(classpath) = classpath_from_settings(settings) else {
            self.ctx.try_log(|logger| debug!(logger, "Ignoring non-object settings payload"));
            return None;
        };
        self.update_classpath(classpath)
    }

    /// Replaces the classpath. An identical list is a no-op; any other list
    /// forces a new session and a full index rebuild, and forgets the active
    /// file.
    pub fn update_classpath(&mut self, classpath: Vec<String>) -> Option<CycleReport> {
        if classpath == self.config.classpath {
            return None;
        }

        self.ctx.try_log(|logger| {
            info!(logger, "Classpath changed ({} entries), recompiling workspace", classpath.len())
        });
        self.config = self.config.clone().with_classpath(classpath);
        let report = self.run_cycle(&HashSet::new());
        self.context.reset();
        report
    }

    /// Takes effect with the next cycle, which builds a new session.
    pub fn set_workspace_root(&mut self, root: Option<PathBuf>) {
        self.config.root = root;
    }

    /// Brings the analysis of `uri` up to date before a request is answered
    /// from the index. Only runs a cycle when another file is active.
    pub fn refresh_if_context_changed(&mut self, uri: &Url) -> Option<CycleReport> {
        if !self.context.needs_refresh(uri) {
            return None;
        }

        self.ctx.try_log(|logger| debug!(logger, "Context switched to {}", uri));
        self.documents.force_changed(uri);
        self.recompile_active(uri.clone())
    }

    fn recompile_active(&mut self, uri: Url) -> Option<CycleReport> {
        let report = self.run_cycle(&HashSet::from([uri.clone()]));
        self.context.record(uri);
        report
    }

    /// Runs one cycle. `scope` is what the index is patched for when the
    /// session is reused; a new session is always indexed in full.
    pub fn run_cycle(&mut self, scope: &HashSet<Url>) -> Option<CycleReport> {
        let (session, reused) =
            self.sessions.create_or_reuse(&self.config, &mut self.documents, &self.ctx)?;

        let errors = match compile(session) {
            Ok(errors) => errors,
            Err(fault) => {
                self.ctx.try_log(|logger| error!(logger, "{}", fault));
                fault.into_partial()
            }
        };

        if reused {
            self.index.update_incremental(&*session, scope);
        } else {
            self.index.rebuild_full(&*session);
        }

        let published = self.diagnostics.synchronize(&errors, &mut self.publisher, &self.ctx);

        Some(CycleReport { session: session.id(), reused, errors: errors.len(), published })
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn index(&self) -> &AstIndex {
        &self.index
    }

    pub fn sessions(&self) -> &SessionManager<F> {
        &self.sessions
    }

    pub fn active_context(&self) -> Option<&Url> {
        self.context.active()
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }
}
