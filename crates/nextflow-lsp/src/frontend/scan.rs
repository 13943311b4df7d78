//! A lightweight frontend that needs no JVM.
//!
//! It checks delimiter balance and string termination, and picks declarations
//! out of each source line with a handful of patterns. That is enough for
//! structural diagnostics, completion of workspace names and document
//! outlines; it does not resolve names or types.

use super::{
    AstNode, CompilationSession, CompileMessage, CompilerFrontend, NodeKind, Phase, SessionId,
    SourceSpan,
};
use crate::config::WorkspaceConfig;
use crate::documents::DocumentStore;
use crate::errors::FrontendError;
use crate::utils::file_scanner::{find_source_files, is_source_file};
use lsp_types::Url;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref TYPE_DECL: Regex = Regex::new(
        r"^\s*(?:(?:public|protected|private|static|abstract|final)\s+)*(class|interface|enum|trait)\s+([A-Za-z_]\w*)"
    )
    .unwrap();
    static ref PROCESS_DECL: Regex = Regex::new(r"^\s*process\s+([A-Za-z_]\w*)").unwrap();
    static ref WORKFLOW_DECL: Regex = Regex::new(r"^\s*workflow\s+([A-Za-z_]\w*)").unwrap();
    static ref DEF_METHOD: Regex = Regex::new(
        r"^\s*(?:(?:public|protected|private|static|final|synchronized|abstract)\s+)*def\s+([A-Za-z_]\w*)\s*\("
    )
    .unwrap();
    static ref TYPED_METHOD: Regex = Regex::new(
        r"^\s*(?:(?:public|protected|private|static|final|synchronized|abstract)\s+)*([A-Z]\w*(?:<[^>]*>)?(?:\[\])?|void|boolean|int|long|double|float|char|byte|short)\s+([A-Za-z_]\w*)\s*\("
    )
    .unwrap();
    static ref DEF_VARIABLE: Regex = Regex::new(
        r"^\s*(?:(?:public|protected|private|static|final)\s+)*def\s+([A-Za-z_]\w*)\s*(?:=|;|$)"
    )
    .unwrap();
    static ref TYPED_FIELD: Regex = Regex::new(
        r"^\s*((?:(?:public|protected|private|static|final)\s+)*)([A-Z]\w*(?:<[^>]*>)?(?:\[\])?|boolean|int|long|double|float|char|byte|short)\s+([A-Za-z_]\w*)\s*(?:=|;|$)"
    )
    .unwrap();
}

/// Builds [`ScanSession`]s. Each fresh session gets its own output directory
/// below `output_base`.
#[derive(Debug)]
pub struct ScanFrontend {
    output_base: PathBuf,
    next_id: u64,
}

impl ScanFrontend {
    pub fn new(output_base: impl Into<PathBuf>) -> Self {
        Self { output_base: output_base.into(), next_id: 0 }
    }
}

impl CompilerFrontend for ScanFrontend {
    type Session = ScanSession;

    fn configure(
        &mut self,
        config: &WorkspaceConfig,
        sources: &DocumentStore,
        changed: &HashSet<Url>,
        previous: Option<ScanSession>,
    ) -> Result<ScanSession, FrontendError> {
        if let Some(mut session) = previous {
            for uri in changed {
                session.reload(uri, sources);
            }
            return Ok(session);
        }

        self.next_id += 1;
        let id = SessionId(self.next_id);
        let mut session = ScanSession {
            id,
            config: config.clone(),
            output_directory: self.output_base.join(format!("session-{}", id.0)),
            sources: BTreeMap::new(),
            messages: Vec::new(),
        };

        if let Some(root) = config.root.as_deref().filter(|root| root.is_dir()) {
            for path in find_source_files(root) {
                if let Ok(uri) = Url::from_file_path(&path) {
                    session.load(uri, path, sources);
                }
            }
        }

        for document in sources.documents() {
            if session.sources.contains_key(&document.uri) {
                continue;
            }
            if let Some(path) = document.path().filter(|path| is_source_file(path)) {
                session.load(document.uri.clone(), path, sources);
            }
        }

        Ok(session)
    }
}

#[derive(Debug)]
struct SourceUnit {
    path: PathBuf,
    text: Result<String, String>,
    declarations: Vec<AstNode>,
}

#[derive(Debug)]
pub struct ScanSession {
    id: SessionId,
    config: WorkspaceConfig,
    output_directory: PathBuf,
    sources: BTreeMap<Url, SourceUnit>,
    messages: Vec<CompileMessage>,
}

impl ScanSession {
    fn load(&mut self, uri: Url, path: PathBuf, documents: &DocumentStore) {
        let text = match documents.text(&uri) {
            Some(text) => Ok(text.to_string()),
            None => fs::read(&path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| e.to_string()),
        };
        self.sources.insert(uri, SourceUnit { path, text, declarations: Vec::new() });
    }

    /// Picks up the current text of `uri`: the open document if there is one,
    /// otherwise the file on disk as long as it belongs to the workspace.
    fn reload(&mut self, uri: &Url, documents: &DocumentStore) {
        let Ok(path) = uri.to_file_path() else {
            self.sources.remove(uri);
            return;
        };

        if !is_source_file(&path) {
            return;
        }

        let in_workspace = self.config.root.as_deref().is_some_and(|root| path.starts_with(root));
        if documents.is_open(uri) || (in_workspace && path.is_file()) {
            self.load(uri.clone(), path, documents);
        } else {
            self.sources.remove(uri);
        }
    }
}

impl CompilationSession for ScanSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    fn output_directory(&self) -> Option<&Path> {
        Some(&self.output_directory)
    }

    fn compile(&mut self, phase: Phase) -> Result<(), FrontendError> {
        self.messages.clear();
        let mut unreadable = Vec::new();

        for unit in self.sources.values_mut() {
            unit.declarations.clear();
            let text = match &unit.text {
                Ok(text) => text,
                Err(reason) => {
                    unreadable.push(format!("{} ({})", unit.path.display(), reason));
                    continue;
                }
            };

            if phase >= Phase::Parsing {
                self.messages.extend(check_syntax(&unit.path, text));
            }
            if phase >= Phase::Conversion {
                unit.declarations = extract_declarations(text);
            }
        }

        if !unreadable.is_empty() {
            return Err(FrontendError::Unexpected(format!(
                "unable to read {}",
                unreadable.join(", ")
            )));
        }

        match self.messages.iter().filter(|m| m.is_syntax()).count() {
            0 => Ok(()),
            count => Err(FrontendError::MultipleErrors(count)),
        }
    }

    fn messages(&self) -> &[CompileMessage] {
        &self.messages
    }

    fn source_uris(&self) -> Vec<Url> {
        self.sources.keys().cloned().collect()
    }

    fn declarations(&self, uri: &Url) -> Option<Vec<AstNode>> {
        self.sources.get(uri).map(|unit| unit.declarations.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanMode {
    Code,
    LineComment,
    BlockComment { line: u32, column: u32 },
    Str { quote: char, triple: bool, line: u32, column: u32 },
}

fn closer_for(open: char) -> char {
    match open {
        '{' => '}',
        '(' => ')',
        _ => ']',
    }
}

/// Reports unbalanced delimiters and unterminated literals.
///
/// Stray or mismatched closers, unclosed openers and unterminated strings are
/// fatal; an unterminated block comment is only a warning.
pub fn check_syntax(path: &Path, text: &str) -> Vec<CompileMessage> {
    let chars: Vec<char> = text.chars().collect();
    let mut errors = Vec::new();
    let mut stack: Vec<(char, u32, u32)> = Vec::new();
    let mut mode = ScanMode::Code;
    let (mut line, mut column) = (1u32, 1u32);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();
        let is_triple = |quote: char| next == Some(quote) && chars.get(i + 2) == Some(&quote);
        let mut advance = 1;

        match mode {
            ScanMode::Code => match ch {
                '/' if next == Some('/') => {
                    mode = ScanMode::LineComment;
                    advance = 2;
                }
                '/' if next == Some('*') => {
                    mode = ScanMode::BlockComment { line, column };
                    advance = 2;
                }
                '\'' | '"' => {
                    let triple = is_triple(ch);
                    mode = ScanMode::Str { quote: ch, triple, line, column };
                    advance = if triple { 3 } else { 1 };
                }
                '{' | '(' | '[' => stack.push((ch, line, column)),
                '}' | ')' | ']' => match stack.last() {
                    Some(&(open, _, _)) if closer_for(open) == ch => {
                        stack.pop();
                    }
                    _ => errors.push(CompileMessage::syntax(
                        path,
                        SourceSpan::on_line(line, column, 1),
                        true,
                        format!("Unexpected '{}'", ch),
                    )),
                },
                _ => {}
            },
            ScanMode::LineComment => {
                if ch == '\n' {
                    mode = ScanMode::Code;
                }
            }
            ScanMode::BlockComment { .. } => {
                if ch == '*' && next == Some('/') {
                    mode = ScanMode::Code;
                    advance = 2;
                }
            }
            ScanMode::Str { quote, triple, line: start_line, column: start_column } => {
                if ch == '\\' {
                    advance = 2;
                } else if ch == quote && (!triple || is_triple(quote)) {
                    mode = ScanMode::Code;
                    advance = if triple { 3 } else { 1 };
                } else if ch == '\n' && !triple {
                    errors.push(CompileMessage::syntax(
                        path,
                        SourceSpan::new(start_line, start_column, line, column),
                        true,
                        "Unterminated string literal",
                    ));
                    mode = ScanMode::Code;
                }
            }
        }

        for _ in 0..advance {
            if let Some(&c) = chars.get(i) {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
            i += 1;
        }
    }

    match mode {
        ScanMode::Str { line: start_line, column: start_column, .. } => {
            errors.push(CompileMessage::syntax(
                path,
                SourceSpan::new(start_line, start_column, line, column),
                true,
                "Unterminated string literal",
            ));
        }
        ScanMode::BlockComment { line: start_line, column: start_column } => {
            errors.push(CompileMessage::syntax(
                path,
                SourceSpan::on_line(start_line, start_column, 2),
                false,
                "Unterminated comment",
            ));
        }
        _ => {}
    }

    for (open, open_line, open_column) in stack {
        errors.push(CompileMessage::syntax(
            path,
            SourceSpan::on_line(open_line, open_column, 1),
            true,
            format!("Missing '{}' to close '{}'", closer_for(open), open),
        ));
    }

    errors
}

struct Container {
    node: usize,
    body_depth: u32,
}

/// Extracts declarations line by line, nesting members under the closest
/// enclosing declaration and stretching block declarations to their closing
/// brace.
pub fn extract_declarations(text: &str) -> Vec<AstNode> {
    let mut nodes: Vec<AstNode> = Vec::new();
    let mut containers: Vec<Container> = Vec::new();
    let mut depth = 0u32;

    for (line_index, line_text) in text.lines().enumerate() {
        let line_no = line_index as u32 + 1;
        let depth_before = depth;

        let enclosing = containers.last();
        let parent = enclosing.map(|c| nodes[c.node].name.clone());
        let in_type_body = enclosing.is_some_and(|c| {
            c.body_depth == depth_before
                && matches!(
                    nodes[c.node].kind,
                    NodeKind::Class | NodeKind::Interface | NodeKind::Enum
                )
        });

        let mut declared = match_declaration(line_text, line_no, in_type_body).map(|node| {
            nodes.push(match &parent {
                Some(parent) => node.with_parent(parent.clone()),
                None => node,
            });
            nodes.len() - 1
        });

        for (column, opens) in brace_events(line_text) {
            if opens {
                depth += 1;
                if depth == depth_before + 1 {
                    if let Some(node) = declared.take() {
                        containers.push(Container { node, body_depth: depth });
                    }
                }
            } else {
                depth = depth.saturating_sub(1);
                while containers.last().is_some_and(|c| depth < c.body_depth) {
                    if let Some(container) = containers.pop() {
                        let span = &mut nodes[container.node].span;
                        span.end_line = line_no;
                        span.end_column = column + 1;
                    }
                }
            }
        }
    }

    nodes
}

fn column_of(line: &str, byte_offset: usize) -> u32 {
    line[..byte_offset].chars().count() as u32 + 1
}

fn named(
    line: &str,
    line_no: u32,
    caps: &Captures,
    group: usize,
    kind: NodeKind,
) -> Option<AstNode> {
    let name = caps.get(group)?;
    let column = column_of(line, name.start());
    let len = name.as_str().chars().count() as u32;
    Some(AstNode::new(name.as_str(), kind, SourceSpan::on_line(line_no, column, len)))
}

fn match_declaration(line: &str, line_no: u32, in_type_body: bool) -> Option<AstNode> {
    if let Some(caps) = TYPE_DECL.captures(line) {
        let kind = match caps.get(1).map(|m| m.as_str()) {
            Some("interface") | Some("trait") => NodeKind::Interface,
            Some("enum") => NodeKind::Enum,
            _ => NodeKind::Class,
        };
        return named(line, line_no, &caps, 2, kind);
    }
    if let Some(caps) = PROCESS_DECL.captures(line) {
        return named(line, line_no, &caps, 1, NodeKind::Process);
    }
    if let Some(caps) = WORKFLOW_DECL.captures(line) {
        return named(line, line_no, &caps, 1, NodeKind::Workflow);
    }
    if let Some(caps) = DEF_METHOD.captures(line) {
        return named(line, line_no, &caps, 1, NodeKind::Method);
    }
    if let Some(caps) = TYPED_METHOD.captures(line) {
        let return_type = caps.get(1).map(|m| m.as_str().to_string());
        let node = named(line, line_no, &caps, 2, NodeKind::Method)?;
        return Some(match return_type {
            Some(return_type) => node.with_detail(return_type),
            None => node,
        });
    }
    if let Some(caps) = DEF_VARIABLE.captures(line) {
        let kind = if in_type_body { NodeKind::Property } else { NodeKind::Variable };
        return named(line, line_no, &caps, 1, kind);
    }
    if let Some(caps) = TYPED_FIELD.captures(line) {
        let has_visibility = caps.get(1).is_some_and(|m| {
            ["public", "protected", "private"].iter().any(|v| m.as_str().contains(v))
        });
        let kind = match (in_type_body, has_visibility) {
            (true, true) => NodeKind::Field,
            (true, false) => NodeKind::Property,
            (false, _) => NodeKind::Variable,
        };
        let declared_type = caps.get(2).map(|m| m.as_str().to_string());
        let node = named(line, line_no, &caps, 3, kind)?;
        return Some(match declared_type {
            Some(declared_type) => node.with_detail(declared_type),
            None => node,
        });
    }
    None
}

/// Braces of a single line outside of string literals and line comments, as
/// `(1-based column, is_opening)`.
fn brace_events(line: &str) -> Vec<(u32, bool)> {
    let mut events = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut previous = '\0';

    for (index, ch) in line.chars().enumerate() {
        let column = index as u32 + 1;
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
        } else {
            match ch {
                '/' if previous == '/' => break,
                '\'' | '"' => quote = Some(ch),
                '{' => events.push((column, true)),
                '}' => events.push((column, false)),
                _ => {}
            }
        }
        previous = ch;
    }

    events
}
