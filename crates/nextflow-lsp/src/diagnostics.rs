//! Turns a session's error list into per-file diagnostics and diffs them
//! against the previous publish so the editor sees explicit clears.

use crate::frontend::{CompileMessage, SyntaxError};
use crate::Context;
use lsp_types::{Diagnostic, DiagnosticSeverity, Url};
use std::collections::BTreeMap;

pub const DIAGNOSTIC_SOURCE: &str = "nextflow";

/// Diagnostics per file as of the last publish.
pub type DiagnosticSnapshot = BTreeMap<Url, Vec<Diagnostic>>;

/// Everything to send for one cycle, ordered by uri. An empty list clears
/// the file in the editor.
pub type PublishSet = Vec<(Url, Vec<Diagnostic>)>;

/// One-way sink for `textDocument/publishDiagnostics`.
pub trait DiagnosticPublisher {
    fn publish(&mut self, uri: Url, diagnostics: Vec<Diagnostic>);
}

fn to_diagnostic(error: &SyntaxError) -> Diagnostic {
    let severity =
        if error.fatal { DiagnosticSeverity::ERROR } else { DiagnosticSeverity::WARNING };
    Diagnostic {
        range: error.span.to_range(),
        severity: Some(severity),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: error.message.clone(),
        ..Default::default()
    }
}

/// Groups the syntax errors of `errors` by file and adds an empty entry for
/// every file of `previous` that no longer has any.
///
/// Returns the new snapshot (without the clears) and the publish set.
pub fn compute_and_publish(
    errors: &[CompileMessage],
    previous: &DiagnosticSnapshot,
    ctx: &Context,
) -> (DiagnosticSnapshot, PublishSet) {
    let mut snapshot = DiagnosticSnapshot::new();

    for error in errors {
        let CompileMessage::Syntax(error) = error else {
            continue;
        };
        let Ok(uri) = Url::from_file_path(&error.source) else {
            ctx.try_log(|logger| {
                debug!(logger, "Skipping diagnostic for {}: not a file uri", error.source.display())
            });
            continue;
        };
        snapshot.entry(uri).or_default().push(to_diagnostic(error));
    }

    let mut publish: BTreeMap<Url, Vec<Diagnostic>> = snapshot.clone();
    for uri in previous.keys() {
        publish.entry(uri.clone()).or_default();
    }

    (snapshot, publish.into_iter().collect())
}

/// Holds the snapshot between cycles.
#[derive(Debug, Default)]
pub struct DiagnosticSynchronizer {
    snapshot: DiagnosticSnapshot,
}

impl DiagnosticSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the diagnostics for `errors` and keeps them as the baseline
    /// for the next call. Returns how many files were published.
    pub fn synchronize<P: DiagnosticPublisher + ?Sized>(
        &mut self,
        errors: &[CompileMessage],
        publisher: &mut P,
        ctx: &Context,
    ) -> usize {
        let previous = std::mem::take(&mut self.snapshot);
        let (snapshot, publish_set) = compute_and_publish(errors, &previous, ctx);
        self.snapshot = snapshot;

        let published = publish_set.len();
        for (uri, diagnostics) in publish_set {
            ctx.try_log(|logger| {
                debug!(logger, "Publishing {} diagnostic(s) for {}", diagnostics.len(), uri)
            });
            publisher.publish(uri, diagnostics);
        }
        published
    }

    pub fn snapshot(&self) -> &DiagnosticSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::SourceSpan;
    use lsp_types::Position;
    use std::path::PathBuf;

    fn syntax(path: &str, line: u32, fatal: bool, message: &str) -> CompileMessage {
        CompileMessage::syntax(path, SourceSpan::on_line(line, 3, 2), fatal, message)
    }

    fn url(path: &str) -> Url {
        Url::from_file_path(path).unwrap()
    }

    #[test]
    fn test_groups_by_file_in_arrival_order() {
        let errors = vec![
            syntax("/work/b.nf", 7, true, "first"),
            CompileMessage::Exception("boom".to_string()),
            syntax("/work/a.nf", 1, false, "only"),
            syntax("/work/b.nf", 2, true, "second"),
        ];

        let (snapshot, publish) = compute_and_publish(&errors, &BTreeMap::new(), &Context::empty());

        let b = &snapshot[&url("/work/b.nf")];
        assert_eq!(b.iter().map(|d| d.message.as_str()).collect::<Vec<_>>(), ["first", "second"]);
        assert_eq!(b[0].range.start, Position::new(6, 2));
        assert_eq!(b[0].severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(b[0].source.as_deref(), Some(DIAGNOSTIC_SOURCE));

        let a = &snapshot[&url("/work/a.nf")];
        assert_eq!(a[0].severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(a.len(), 1);

        let order: Vec<_> = publish.iter().map(|(uri, _)| uri.clone()).collect();
        assert_eq!(order, vec![url("/work/a.nf"), url("/work/b.nf")]);
    }

    #[test]
    fn test_compiler_warnings_are_not_published() {
        let errors = vec![
            CompileMessage::Warning {
                source: Some(PathBuf::from("/work/a.nf")),
                message: "deprecated operator".to_string(),
            },
            CompileMessage::Warning { source: None, message: "classpath entry missing".into() },
        ];

        let (snapshot, publish) = compute_and_publish(&errors, &BTreeMap::new(), &Context::empty());
        assert!(snapshot.is_empty());
        assert!(publish.is_empty());
    }

    #[test]
    fn test_files_without_errors_are_cleared() {
        let ctx = Context::empty();
        let (first, _) =
            compute_and_publish(&[syntax("/work/a.nf", 3, true, "x")], &BTreeMap::new(), &ctx);

        let (second, publish) = compute_and_publish(&[], &first, &ctx);
        assert!(second.is_empty());
        assert_eq!(publish, vec![(url("/work/a.nf"), vec![])]);
    }

    #[test]
    fn test_relative_source_is_skipped() {
        let (snapshot, publish) = compute_and_publish(
            &[syntax("relative/main.nf", 1, true, "x")],
            &BTreeMap::new(),
            &Context::empty(),
        );
        assert!(snapshot.is_empty());
        assert!(publish.is_empty());
    }

    #[derive(Default)]
    struct Recorder(Vec<(Url, usize)>);

    impl DiagnosticPublisher for Recorder {
        fn publish(&mut self, uri: Url, diagnostics: Vec<Diagnostic>) {
            self.0.push((uri, diagnostics.len()));
        }
    }

    #[test]
    fn test_synchronizer_second_identical_run_has_no_clears() {
        let ctx = Context::empty();
        let errors = vec![syntax("/work/a.nf", 3, true, "x")];
        let mut sync = DiagnosticSynchronizer::new();
        let mut recorder = Recorder::default();

        sync.synchronize(&errors, &mut recorder, &ctx);
        sync.synchronize(&errors, &mut recorder, &ctx);
        assert_eq!(recorder.0, vec![(url("/work/a.nf"), 1), (url("/work/a.nf"), 1)]);

        sync.synchronize(&[], &mut recorder, &ctx);
        assert_eq!(recorder.0.last(), Some(&(url("/work/a.nf"), 0)));
        assert!(sync.snapshot().is_empty());
    }
}
