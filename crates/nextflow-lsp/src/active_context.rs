//! Tracks the file the user is working in.
//!
//! Requests for a file other than the active one must not be answered from an
//! index built around another file's edits, so the orchestrator asks
//! [`ContextTracker::needs_refresh`] before serving them.

use lsp_types::Url;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContextTracker {
    active: Option<Url>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Url> {
        self.active.as_ref()
    }

    /// True when a file is tracked and `uri` is a different one. Nothing is
    /// refreshed before the first file has been touched.
    pub fn needs_refresh(&self, uri: &Url) -> bool {
        self.active.as_ref().is_some_and(|active| active != uri)
    }

    pub fn record(&mut self, uri: Url) {
        self.active = Some(uri);
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_only_when_switching_files() {
        let a = Url::parse("file:///work/a.nf").unwrap();
        let b = Url::parse("file:///work/b.nf").unwrap();
        let mut tracker = ContextTracker::new();

        assert!(!tracker.needs_refresh(&a));
        tracker.record(a.clone());
        assert!(!tracker.needs_refresh(&a));
        assert!(tracker.needs_refresh(&b));

        tracker.reset();
        assert!(tracker.active().is_none());
        assert!(!tracker.needs_refresh(&b));
    }
}
