//! Owns the single live compilation session and decides, once per cycle,
//! whether it survives.

use super::state_machine::{SessionState, StateHistory, StateTransition};
use crate::config::WorkspaceConfig;
use crate::documents::DocumentStore;
use crate::errors::SessionError;
use crate::frontend::{CompilationSession, CompilerFrontend, SessionId};
use crate::Context;
use std::fs;

pub struct SessionManager<F: CompilerFrontend> {
    frontend: F,
    session: Option<F::Session>,
    state: SessionState,
    history: StateHistory,
}

impl<F: CompilerFrontend> SessionManager<F> {
    pub fn new(frontend: F) -> Self {
        Self {
            frontend,
            session: None,
            state: SessionState::Uninitialized,
            history: StateHistory::default(),
        }
    }

    /// Prepares the session for one compile cycle.
    ///
    /// The previous session's output directory is deleted first; if that
    /// fails the session is dropped and `None` is returned without touching
    /// the changed set. Otherwise the changed set is drained and the previous
    /// session is handed back to the frontend when it was built from an equal
    /// `config`. The boolean is `true` iff the frontend kept it.
    pub fn create_or_reuse(
        &mut self,
        config: &WorkspaceConfig,
        documents: &mut DocumentStore,
        ctx: &Context,
    ) -> Option<(&mut F::Session, bool)> {
        if let Err(e) = self.purge_output_directory() {
            ctx.try_log(|logger| error!(logger, "{}", e));
            self.session = None;
            self.transition(SessionState::Unusable { reason: e.to_string() }, "purge failed", ctx);
            return None;
        }

        let changed = documents.drain_changed();
        let previous = self.session.take();
        let previous_id = previous.as_ref().map(CompilationSession::id);

        let previous = match previous {
            Some(session) if session.config() == config => Some(session),
            Some(session) => {
                ctx.try_log(|logger| {
                    debug!(logger, "Configuration changed, dropping session {}", session.id())
                });
                None
            }
            None => None,
        };

        let session = match self.frontend.configure(config, documents, &changed, previous) {
            Ok(session) => session,
            Err(e) => {
                let e = SessionError::Configure(e);
                ctx.try_log(|logger| error!(logger, "{}", e));
                self.transition(
                    SessionState::Unusable { reason: e.to_string() },
                    "configure failed",
                    ctx,
                );
                return None;
            }
        };

        if let Some(dir) = session.output_directory() {
            if let Err(source) = fs::create_dir_all(dir) {
                let e = SessionError::Prepare { path: dir.to_path_buf(), source };
                ctx.try_log(|logger| warn!(logger, "{}", e));
            }
        }

        let id = session.id();
        let reused = previous_id == Some(id);
        self.record_outcome(previous_id, id, reused, changed.len(), ctx);

        Some((self.session.insert(session), reused))
    }

    fn purge_output_directory(&self) -> Result<(), SessionError> {
        let Some(dir) = self.session.as_ref().and_then(|s| s.output_directory()) else {
            return Ok(());
        };
        if !dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(dir)
            .map_err(|source| SessionError::Purge { path: dir.to_path_buf(), source })
    }

    fn record_outcome(
        &mut self,
        previous: Option<SessionId>,
        current: SessionId,
        reused: bool,
        changed: usize,
        ctx: &Context,
    ) {
        if reused {
            let event = format!("{} changed file(s)", changed);
            self.transition(SessionState::Active { id: current, reused: true }, event, ctx);
            return;
        }
        if let Some(previous) = previous {
            self.transition(SessionState::Replaced { previous, current }, "session recreated", ctx);
        }
        self.transition(SessionState::Active { id: current, reused: false }, "session built", ctx);
    }

    fn transition(&mut self, to: SessionState, event: impl Into<String>, ctx: &Context) {
        let from = std::mem::replace(&mut self.state, to.clone());
        let transition = StateTransition::new(from, to, event);
        ctx.try_log(|logger| debug!(logger, "Session: {}", transition.format()));
        self.history.record(transition);
    }

    pub fn session(&self) -> Option<&F::Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }
}
