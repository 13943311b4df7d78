//! Contract between the orchestrator and a compiler frontend.
//!
//! A frontend turns a [`WorkspaceConfig`] plus the current document texts into
//! a [`CompilationSession`]. Sessions are stateful: they can be handed back to
//! the frontend on the next cycle and updated in place, and they keep the
//! messages and the declaration forest of their last compile.

mod kinds;
pub mod scan;

pub use kinds::{NodeKind, Presentation};

use crate::config::WorkspaceConfig;
use crate::documents::DocumentStore;
use crate::errors::FrontendError;
use lsp_types::{Position, Range, Url};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Messages collected by a session's last compile, in arrival order.
pub type ErrorList = Vec<CompileMessage>;

/// Compiler phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Initialization,
    Parsing,
    Conversion,
    SemanticAnalysis,
    Canonicalization,
    InstructionSelection,
    ClassGeneration,
    Output,
    Finalization,
}

impl Phase {
    /// Last phase needed for code intelligence. After it the AST is fully
    /// name- and type-resolved; everything later is lowering and codegen.
    pub const BOUNDARY: Phase = Phase::Canonicalization;
}

/// A source region in compiler coordinates: 1-based lines and columns, with
/// 0 meaning "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceSpan {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self { start_line, start_column, end_line, end_column }
    }

    /// A span covering `len` columns of a single line.
    pub fn on_line(line: u32, column: u32, len: u32) -> Self {
        Self::new(line, column, line, column + len)
    }

    pub fn to_range(&self) -> Range {
        Range::new(
            to_position(self.start_line, self.start_column),
            to_position(self.end_line, self.end_column),
        )
    }
}

fn to_position(line: u32, column: u32) -> Position {
    Position::new(line.saturating_sub(1), column.saturating_sub(1))
}

/// A syntax error reported against a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub source: PathBuf,
    pub span: SourceSpan,
    pub fatal: bool,
    pub message: String,
}

/// One entry of a session's error list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileMessage {
    Syntax(SyntaxError),
    Warning { source: Option<PathBuf>, message: String },
    Exception(String),
}

impl CompileMessage {
    pub fn syntax(
        source: impl Into<PathBuf>,
        span: SourceSpan,
        fatal: bool,
        message: impl Into<String>,
    ) -> Self {
        CompileMessage::Syntax(SyntaxError {
            source: source.into(),
            span,
            fatal,
            message: message.into(),
        })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, CompileMessage::Syntax(_))
    }
}

/// Frontend-defined session identity. Two sessions are the same session iff
/// their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A declaration produced by the frontend. The node kind is a closed set, so
/// presentation metadata is derived from it once and carried along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub name: String,
    pub kind: NodeKind,
    pub span: SourceSpan,
    pub parent: Option<String>,
    pub detail: Option<String>,
}

impl AstNode {
    pub fn new(name: impl Into<String>, kind: NodeKind, span: SourceSpan) -> Self {
        Self { name: name.into(), kind, span, parent: None, detail: None }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub trait CompilationSession {
    fn id(&self) -> SessionId;

    /// Configuration snapshot the session was built from.
    fn config(&self) -> &WorkspaceConfig;

    /// Where compiled artifacts would be written, if anywhere.
    fn output_directory(&self) -> Option<&Path>;

    /// Compiles every source up to and including `phase`. Errors found in the
    /// sources are collected into [`messages`](Self::messages).
    fn compile(&mut self, phase: Phase) -> Result<(), FrontendError>;

    fn messages(&self) -> &[CompileMessage];

    /// Files that are part of the session's AST forest.
    fn source_uris(&self) -> Vec<Url>;

    /// Declarations of `uri`, or `None` when the file is not part of the
    /// session.
    fn declarations(&self, uri: &Url) -> Option<Vec<AstNode>>;
}

pub trait CompilerFrontend {
    type Session: CompilationSession;

    /// Produces the session for `config`.
    ///
    /// `previous` is only ever a session built from an equal configuration;
    /// returning it (updated for `changed`) keeps its identity and lets the
    /// orchestrator index incrementally.
    fn configure(
        &mut self,
        config: &WorkspaceConfig,
        sources: &DocumentStore,
        changed: &HashSet<Url>,
        previous: Option<Self::Session>,
    ) -> Result<Self::Session, FrontendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_to_range_is_zero_based() {
        let range = SourceSpan::new(3, 5, 3, 9).to_range();
        assert_eq!(range.start, Position::new(2, 4));
        assert_eq!(range.end, Position::new(2, 8));
    }

    #[test]
    fn test_unknown_coordinates_stay_at_zero() {
        let range = SourceSpan::new(0, 0, 1, 0).to_range();
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(0, 0));
    }

    #[test]
    fn test_boundary_phase_precedes_codegen() {
        assert!(Phase::BOUNDARY > Phase::SemanticAnalysis);
        assert!(Phase::BOUNDARY < Phase::ClassGeneration);
    }
}
