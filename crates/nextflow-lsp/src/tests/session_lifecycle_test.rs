//! Session lifecycle: output directory handling, frontend faults and the
//! recorded state transitions.

use super::mock_editor::{file, syntax_error, MockEditor};
use super::mock_frontend::MockOutcome;
use crate::frontend::SessionId;
use crate::orchestrator::state_machine::SessionState;
use lsp_types::DiagnosticSeverity;
use std::fs;

#[test]
fn test_output_directory_is_recreated_each_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = MockEditor::new();
    editor.script.borrow_mut().output_base = Some(dir.path().to_path_buf());

    editor.open("a.nf", "");
    let output = dir.path().join("session-1");
    assert!(output.is_dir());
    fs::write(output.join("Main.class"), b"stale").unwrap();

    editor.change("a.nf", "workflow {}");
    assert!(output.is_dir());
    assert!(!output.join("Main.class").exists(), "previous output is purged");
}

#[test]
fn test_purge_failure_skips_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut editor = MockEditor::new();
    editor.script.borrow_mut().output_base = Some(dir.path().to_path_buf());
    editor.open("a.nf", "");

    // a plain file where the output directory was cannot be purged
    let output = dir.path().join("session-1");
    fs::remove_dir_all(&output).unwrap();
    fs::write(&output, b"not a directory").unwrap();

    let compiles = editor.compile_calls();
    assert!(editor.change("a.nf", "workflow {}").is_none());
    assert_eq!(editor.compile_calls(), compiles);
    assert!(matches!(
        editor.orchestrator.sessions().state(),
        SessionState::Unusable { .. }
    ));
    assert!(editor.orchestrator.sessions().session().is_none());
    assert!(
        editor.orchestrator.documents().changed().contains(&file("a.nf")),
        "the edit is kept for the next cycle"
    );

    let report = editor.change("a.nf", "workflow { }").unwrap();
    assert_eq!(report.session, SessionId(2));
    assert!(!report.reused);
}

#[test]
fn test_output_directory_creation_failure_still_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let mut editor = MockEditor::new();
    editor.script.borrow_mut().output_base = Some(blocker);
    editor.script.borrow_mut().messages = vec![syntax_error("a.nf", 1, "Unexpected ')'")];

    let report = editor.open("a.nf", ")").unwrap();
    assert_eq!(report.errors, 1);
    assert_eq!(editor.compile_calls(), 1);
    editor.assert_published(&[("a.nf", &[(0, DiagnosticSeverity::ERROR)])]);
}

#[test]
fn test_configure_failure_leaves_no_session() {
    let mut editor = MockEditor::new();
    editor.script.borrow_mut().fail_configure = true;

    assert!(editor.open("a.nf", "").is_none());
    assert_eq!(editor.compile_calls(), 0);
    assert!(!editor.orchestrator.sessions().state().is_usable());

    editor.script.borrow_mut().fail_configure = false;
    let report = editor.change("a.nf", "workflow {}").unwrap();
    assert!(!report.reused);
    assert!(editor.orchestrator.sessions().state().is_usable());
}

#[test]
fn test_internal_fault_uses_partial_errors() {
    let mut editor = MockEditor::new();
    {
        let mut script = editor.script.borrow_mut();
        script.messages = vec![syntax_error("a.nf", 2, "Unexpected '}'")];
        script.outcome = MockOutcome::Internal("visitor failed".to_string());
    }

    let report = editor.open("a.nf", "").unwrap();
    assert_eq!(report.errors, 1);
    editor.assert_published(&[("a.nf", &[(1, DiagnosticSeverity::ERROR)])]);
}

#[test]
fn test_unexpected_fault_is_not_fatal() {
    let mut editor = MockEditor::new();
    editor.script.borrow_mut().outcome = MockOutcome::Unexpected("disk vanished".to_string());

    let report = editor.open("a.nf", "").unwrap();
    assert_eq!(report.errors, 0);
    assert!(editor.take_published().is_empty());
}

#[test]
fn test_panicking_frontend_keeps_server_alive() {
    let mut editor = MockEditor::new();
    {
        let mut script = editor.script.borrow_mut();
        script.messages = vec![syntax_error("a.nf", 1, "Unexpected ']'")];
        script.outcome = MockOutcome::Panic("index out of bounds".to_string());
    }

    let report = editor.open("a.nf", "]").unwrap();
    assert_eq!(report.errors, 1);
    editor.take_published();

    {
        let mut script = editor.script.borrow_mut();
        script.messages.clear();
        script.outcome = MockOutcome::Natural;
    }
    let report = editor.change("a.nf", "").unwrap();
    assert!(report.reused);
    editor.assert_published(&[("a.nf", &[])]);
}

#[test]
fn test_history_records_replacement() {
    let mut editor = MockEditor::new();
    editor.open("a.nf", "");
    editor.change("a.nf", "workflow {}");
    editor.orchestrator.update_classpath(vec!["lib.jar".to_string()]);

    let history = editor.orchestrator.sessions().history();
    let states: Vec<SessionState> = history.transitions().map(|t| t.to.clone()).collect();
    assert_eq!(
        states,
        vec![
            SessionState::Active { id: SessionId(1), reused: false },
            SessionState::Active { id: SessionId(1), reused: true },
            SessionState::Replaced { previous: SessionId(1), current: SessionId(2) },
            SessionState::Active { id: SessionId(2), reused: false },
        ]
    );
    let first = history.transitions().next().map(|t| t.from.clone());
    assert_eq!(first, Some(SessionState::Uninitialized));
}
