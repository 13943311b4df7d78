//! Declaration index over the live session's AST forest.
//!
//! The index is a plain `uri -> nodes` map. It is rebuilt from scratch when a
//! new session was created and patched per file while the same session keeps
//! being reused.

use crate::frontend::{AstNode, CompilationSession, NodeKind, Presentation};
use lsp_types::{Position, Range, Url};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedNode {
    pub uri: Url,
    pub name: String,
    pub kind: NodeKind,
    pub range: Range,
    pub parent: Option<String>,
    pub detail: Option<String>,
    pub presentation: Presentation,
}

impl IndexedNode {
    pub fn from_ast(uri: &Url, node: AstNode) -> Self {
        Self {
            uri: uri.clone(),
            range: node.span.to_range(),
            presentation: node.kind.presentation(),
            name: node.name,
            kind: node.kind,
            parent: node.parent,
            detail: node.detail,
        }
    }

    fn contains(&self, position: Position) -> bool {
        self.range.start <= position && position <= self.range.end
    }
}

/// What the last update touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexUpdate {
    Full,
    Incremental(HashSet<Url>),
}

#[derive(Debug, Default)]
pub struct AstIndex {
    files: HashMap<Url, Vec<IndexedNode>>,
    built: bool,
    last_update: Option<IndexUpdate>,
}

impl AstIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry with the session's current forest.
    pub fn rebuild_full<S: CompilationSession + ?Sized>(&mut self, session: &S) {
        self.files.clear();
        for uri in session.source_uris() {
            let nodes = Self::derive(session, &uri).unwrap_or_default();
            self.files.insert(uri, nodes);
        }
        self.built = true;
        self.last_update = Some(IndexUpdate::Full);
    }

    /// Re-derives only `changed`; files the session dropped are removed.
    /// Falls back to a full rebuild while nothing has been built yet.
    pub fn update_incremental<S: CompilationSession + ?Sized>(
        &mut self,
        session: &S,
        changed: &HashSet<Url>,
    ) {
        if !self.built {
            self.rebuild_full(session);
            return;
        }

        for uri in changed {
            match Self::derive(session, uri) {
                Some(nodes) => {
                    self.files.insert(uri.clone(), nodes);
                }
                None => {
                    self.files.remove(uri);
                }
            }
        }
        self.last_update = Some(IndexUpdate::Incremental(changed.clone()));
    }

    fn derive<S: CompilationSession + ?Sized>(session: &S, uri: &Url) -> Option<Vec<IndexedNode>> {
        session
            .declarations(uri)
            .map(|nodes| nodes.into_iter().map(|node| IndexedNode::from_ast(uri, node)).collect())
    }

    pub fn nodes(&self, uri: &Url) -> &[IndexedNode] {
        self.files.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Innermost node whose range contains `position`.
    pub fn node_at(&self, uri: &Url, position: Position) -> Option<&IndexedNode> {
        let extent = |node: &IndexedNode| {
            let Range { start, end } = node.range;
            (end.line.saturating_sub(start.line), end.character.saturating_sub(start.character))
        };
        self.nodes(uri)
            .iter()
            .filter(|node| node.contains(position))
            .min_by_key(|node| extent(node))
    }

    /// Every indexed name starting with `prefix`, one entry per name and kind,
    /// sorted by name.
    pub fn completion_candidates(&self, prefix: &str) -> Vec<&IndexedNode> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for node in self.files.values().flatten() {
            if node.name.starts_with(prefix) && seen.insert((node.name.as_str(), node.kind)) {
                candidates.push(node);
            }
        }
        candidates.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
        candidates
    }

    pub fn indexed_files(&self) -> Vec<&Url> {
        let mut files: Vec<_> = self.files.keys().collect();
        files.sort();
        files
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn last_update(&self) -> Option<&IndexUpdate> {
        self.last_update.as_ref()
    }
}
