//! Text document lifecycle management for LSP
//!
//! The store holds the in-memory text of every open document plus the set of
//! documents changed since the compiler last looked. Closing a document still
//! counts as a change: the compiler has to fall back to the on-disk contents.

use crate::utils::position_to_offset;
use lsp_types::{TextDocumentContentChangeEvent, Url};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Represents the state of a single document in the workspace
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub content: String,
    pub version: i32,
}

impl Document {
    /// Create a new document
    pub fn new(uri: Url, content: String, version: i32) -> Self {
        Self { uri, content, version }
    }

    /// Apply one content change, either a full replacement or a ranged edit
    pub fn apply_change(&mut self, change: TextDocumentContentChangeEvent) {
        let Some(range) = change.range else {
            self.content = change.text;
            return;
        };

        let start = position_to_offset(&self.content, range.start).unwrap_or(self.content.len());
        let end = position_to_offset(&self.content, range.end)
            .unwrap_or(self.content.len())
            .max(start);
        self.content.replace_range(start..end, &change.text);
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the current version
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Local path of the document, if it is a `file:` uri
    pub fn path(&self) -> Option<PathBuf> {
        self.uri.to_file_path().ok()
    }
}

/// Open documents and the changed-marker set.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Url, Document>,
    changed: HashSet<Url>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, uri: Url, text: String, version: i32) {
        self.documents.insert(uri.clone(), Document::new(uri.clone(), text, version));
        self.changed.insert(uri);
    }

    /// Applies `changes` in order. Returns `false` if the document is not open,
    /// in which case nothing is recorded.
    pub fn change(
        &mut self,
        uri: &Url,
        version: i32,
        changes: Vec<TextDocumentContentChangeEvent>,
    ) -> bool {
        let Some(document) = self.documents.get_mut(uri) else {
            return false;
        };

        for change in changes {
            document.apply_change(change);
        }
        document.version = version;
        self.changed.insert(uri.clone());
        true
    }

    pub fn close(&mut self, uri: &Url) {
        self.documents.remove(uri);
        self.changed.insert(uri.clone());
    }

    /// Marks `uri` changed even though its text did not move.
    pub fn force_changed(&mut self, uri: &Url) {
        self.changed.insert(uri.clone());
    }

    /// Hands the changed set to the caller and starts a fresh one.
    pub fn drain_changed(&mut self) -> HashSet<Url> {
        std::mem::take(&mut self.changed)
    }

    pub fn changed(&self) -> &HashSet<Url> {
        &self.changed
    }

    pub fn text(&self, uri: &Url) -> Option<&str> {
        self.documents.get(uri).map(Document::content)
    }

    pub fn get(&self, uri: &Url) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
