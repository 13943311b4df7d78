//! Lifecycle of the compilation session.
//!
//! ```text
//! Uninitialized -> Active -> Active (reused)
//!                    |   \
//!                    |    +-> Replaced -> Active
//!                    v
//!                 Unusable -> Active
//! ```
//!
//! The states only describe what happened; the session manager decides. Every
//! change is recorded in a bounded [`StateHistory`] for debugging.

use crate::frontend::SessionId;
use std::collections::VecDeque;
use std::time::SystemTime;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No cycle has run yet.
    #[default]
    Uninitialized,

    /// A session is live. `reused` tells whether the last cycle kept it.
    Active { id: SessionId, reused: bool },

    /// A new session took over from `previous`. Transient: the manager moves
    /// on to `Active` within the same cycle.
    Replaced { previous: SessionId, current: SessionId },

    /// The last cycle could not produce a session; the next one starts over.
    Unusable { reason: String },
}

impl SessionState {
    pub fn is_usable(&self) -> bool {
        matches!(self, SessionState::Active { .. } | SessionState::Replaced { .. })
    }

    pub fn description(&self) -> String {
        match self {
            SessionState::Uninitialized => "Uninitialized".to_string(),
            SessionState::Active { id, reused: true } => format!("Active {} (reused)", id),
            SessionState::Active { id, reused: false } => format!("Active {}", id),
            SessionState::Replaced { previous, current } => {
                format!("Replaced {} with {}", previous, current)
            }
            SessionState::Unusable { reason } => format!("Unusable: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,
    pub event: String,
    pub timestamp: SystemTime,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState, event: impl Into<String>) -> Self {
        Self { from, to, event: event.into(), timestamp: SystemTime::now() }
    }

    /// `"Active #1 -> Replaced #1 with #2 (classpath changed)"`
    pub fn format(&self) -> String {
        format!("{} -> {} ({})", self.from.description(), self.to.description(), self.event)
    }
}

/// The most recent transitions, oldest first.
#[derive(Debug, Clone)]
pub struct StateHistory {
    transitions: VecDeque<StateTransition>,
    max_size: usize,
}

impl StateHistory {
    pub const DEFAULT_SIZE: usize = 50;

    pub fn new(max_size: usize) -> Self {
        Self { transitions: VecDeque::with_capacity(max_size), max_size }
    }

    pub fn record(&mut self, transition: StateTransition) {
        if self.max_size == 0 {
            return;
        }
        if self.transitions.len() >= self.max_size {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    pub fn format(&self) -> String {
        self.transitions.iter().map(StateTransition::format).collect::<Vec<_>>().join("\n")
    }
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(id: u64) -> SessionState {
        SessionState::Active { id: SessionId(id), reused: false }
    }

    #[test]
    fn test_session_state_default() {
        assert_eq!(SessionState::default(), SessionState::Uninitialized);
        assert!(!SessionState::default().is_usable());
    }

    #[test]
    fn test_transition_format() {
        let transition = StateTransition::new(
            active(1),
            SessionState::Replaced { previous: SessionId(1), current: SessionId(2) },
            "classpath changed",
        );
        assert_eq!(transition.format(), "Active #1 -> Replaced #1 with #2 (classpath changed)");
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let mut history = StateHistory::new(3);
        for i in 0..5 {
            history.record(StateTransition::new(active(i), active(i + 1), format!("cycle {}", i)));
        }

        let events: Vec<_> = history.transitions().map(|t| t.event.as_str()).collect();
        assert_eq!(events, vec!["cycle 2", "cycle 3", "cycle 4"]);
        assert_eq!(history.last().map(|t| t.to.clone()), Some(active(5)));

        history.clear();
        assert!(history.is_empty());
    }
}
