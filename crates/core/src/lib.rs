//! RACF command language core library.
//!
//! Provides lexing, parsing, and validation of RACF (Resource Access Control
//! Facility) TSO command text, plus a read-only query surface for editor
//! tooling. The main entry points are [`parse_str`] for parsing,
//! [`validate`] for validation, and [`Engine`] for multi-document hosting.
//!
//! The engine never executes a command; it only turns text into a validated
//! structural model plus diagnostics.

#![warn(missing_docs)]

/// RACF command grammar: lexer, parser, AST, and related utilities.
pub mod grammar;
/// Multi-document engine with revision-checked access.
pub mod document;
/// Position-based queries over a parsed document.
pub mod query;
/// AST validation against the grammar schema.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::{ParseResult, parse_str, parse_with_schema};

// AST
pub use grammar::ast::{Ast, CommandNode, Item, OperandNode, OperandValue};

// Lexer
pub use grammar::lexer::{LexResult, Statement, TokKind, Token, lex};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, LineIndex, Severity, Span, codes};

// Validator
pub use validate::{ValidationResult, validate};

// Query surface
pub use query::{Completion, CompletionKind, Hover, NodeRef, completions_at, hover_at, node_at};

// Document hosting
pub use document::{Document, Engine};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
