//! Multi-document hosting with revision-checked access.
//!
//! An [`Engine`] owns a shared grammar schema and a set of open documents.
//! Every text update produces a fresh immutable analysis (parse + validate);
//! published trees are never mutated in place. Updates carry a client
//! revision number, and a revision that is not newer than the current one is
//! discarded, so out-of-order edits from an editor transport cannot roll a
//! document backwards. Accessors take the revision the caller believes is
//! current and return empty results on a mismatch.

use std::collections::HashMap;
use std::sync::Arc;

use racf_lang_diagnostics::{Diagnostic, LineIndex};
use racf_lang_schema::GrammarSchema;

use crate::grammar::ast::Ast;
use crate::grammar::parser::parse_with_schema;
use crate::query::{self, Completion, Hover, NodeRef};
use crate::validate::validate;

/// One open document and its current analysis generation.
pub struct Document {
    /// Client-supplied document identifier.
    pub uri: String,
    /// Revision of the text this analysis was built from.
    pub revision: u64,
    /// The source text.
    pub text: String,
    /// Line index over `text` for byte-offset conversion.
    pub line_index: LineIndex,
    /// Parsed tree with only explicit operands.
    pub ast: Ast,
    /// Validated tree with required defaults materialized.
    pub resolved: Ast,
    /// Combined parse and validation diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    fn analyze(uri: String, text: String, revision: u64, schema: &GrammarSchema) -> Self {
        let parse = parse_with_schema(&text, schema);
        let validation = validate(&parse.ast, schema);
        let mut diagnostics = parse.diagnostics;
        diagnostics.extend(validation.issues);
        Self {
            line_index: LineIndex::new(&text),
            uri,
            revision,
            text,
            ast: parse.ast,
            resolved: validation.resolved,
            diagnostics,
        }
    }
}

/// The multi-document engine.
///
/// Single-threaded by design: it spawns nothing and blocks on nothing. The
/// schema is behind an `Arc` so hosts can share one table across engines
/// (or threads) without copying; it is read-only after load, so no further
/// synchronization is needed.
pub struct Engine {
    schema: Arc<GrammarSchema>,
    documents: HashMap<String, Document>,
}

impl Engine {
    /// Create an engine over the bundled grammar schema.
    pub fn new() -> Self {
        Self::with_schema(Arc::new(GrammarSchema::bundled().clone()))
    }

    /// Create an engine over a specific grammar schema.
    pub fn with_schema(schema: Arc<GrammarSchema>) -> Self {
        Self {
            schema,
            documents: HashMap::new(),
        }
    }

    /// The schema this engine analyzes against.
    pub fn schema(&self) -> &GrammarSchema {
        &self.schema
    }

    /// Open a document (or replace an open one with newer content).
    ///
    /// Returns `false` and leaves the current generation in place when the
    /// document is already open at the same or a newer revision.
    pub fn open(&mut self, uri: &str, text: String, revision: u64) -> bool {
        if let Some(doc) = self.documents.get(uri)
            && doc.revision >= revision
        {
            return false;
        }
        let doc = Document::analyze(uri.to_string(), text, revision, &self.schema);
        self.documents.insert(uri.to_string(), doc);
        true
    }

    /// Apply a full-text update to an open document.
    ///
    /// Returns `false` when the document is not open or the revision is not
    /// newer than the current one (the update is discarded).
    pub fn change(&mut self, uri: &str, text: String, revision: u64) -> bool {
        let Some(doc) = self.documents.get(uri) else {
            return false;
        };
        if doc.revision >= revision {
            return false;
        }
        let doc = Document::analyze(uri.to_string(), text, revision, &self.schema);
        self.documents.insert(uri.to_string(), doc);
        true
    }

    /// Close a document. Returns whether it was open.
    pub fn close(&mut self, uri: &str) -> bool {
        self.documents.remove(uri).is_some()
    }

    /// The current generation of a document, if open.
    pub fn document(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    fn at_revision(&self, uri: &str, revision: u64) -> Option<&Document> {
        self.documents.get(uri).filter(|d| d.revision == revision)
    }

    /// Diagnostics for a document at a specific revision. Empty when the
    /// document is unknown or the revision is stale.
    pub fn diagnostics(&self, uri: &str, revision: u64) -> &[Diagnostic] {
        self.at_revision(uri, revision)
            .map_or(&[], |d| d.diagnostics.as_slice())
    }

    /// Most specific node at an offset, revision-checked.
    pub fn node_at(&self, uri: &str, revision: u64, offset: usize) -> Option<NodeRef<'_>> {
        let doc = self.at_revision(uri, revision)?;
        query::node_at(&doc.ast, offset)
    }

    /// Completion candidates at an offset, revision-checked. Empty when the
    /// document is unknown or the revision is stale.
    pub fn completions_at(&self, uri: &str, revision: u64, offset: usize) -> Vec<Completion> {
        let Some(doc) = self.at_revision(uri, revision) else {
            return Vec::new();
        };
        query::completions_at(&doc.ast, &self.schema, offset)
    }

    /// Hover information at an offset, revision-checked.
    pub fn hover_at(&self, uri: &str, revision: u64, offset: usize) -> Option<Hover> {
        let doc = self.at_revision(uri, revision)?;
        query::hover_at(&doc.ast, &self.schema, offset)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
