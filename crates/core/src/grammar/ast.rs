use super::diag::Span;
use serde::Serialize;

/// A parsed document: one node per logical statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    /// Command nodes in source order.
    pub commands: Vec<CommandNode>,
}

/// One command statement.
///
/// An unknown verb still yields a node (`resolved = false`, empty operands)
/// covering the statement span, so position queries keep working over
/// broken documents.
#[derive(Debug, Clone, Serialize)]
pub struct CommandNode {
    /// Canonical command name when resolved, the verbatim verb otherwise.
    pub name: String,
    /// Whether the verb resolved against the grammar schema.
    pub resolved: bool,
    /// Unvalidated subsystem prefix preceding the verb, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Positional operand values, in source order.
    pub positionals: Vec<Item>,
    /// Keyword operands, in source order. Materialized defaults (appended by
    /// the validator) follow all explicit operands.
    pub operands: Vec<OperandNode>,
    /// Byte span of the whole statement.
    pub span: Span,
}

impl CommandNode {
    /// Find a flat operand by canonical keyword name, case-insensitively.
    pub fn operand(&self, keyword: &str) -> Option<&OperandNode> {
        self.operands
            .iter()
            .find(|op| op.keyword.eq_ignore_ascii_case(keyword))
    }
}

/// A positional value or list element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Literal token text (decoded for quoted strings).
    pub text: String,
    /// Byte span in the source. Empty for values the validator materialized
    /// from a schema default.
    pub span: Span,
}

/// One keyword operand, explicit or materialized from a default.
#[derive(Debug, Clone, Serialize)]
pub struct OperandNode {
    /// Canonical keyword spelling from the schema.
    pub keyword: String,
    /// The operand's value.
    pub value: OperandValue,
    /// Byte span from the keyword to its closing parenthesis. Empty for
    /// materialized defaults.
    pub span: Span,
    /// Whether this operand was materialized from a schema default rather
    /// than written in the source.
    pub from_default: bool,
}

/// Value of a keyword operand.
///
/// The parser records the shape the source actually supplied; shape checking
/// against the schema is the validator's job. In particular a single-value
/// keyword written with zero or several values is recorded as `List`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OperandValue {
    /// Bare keyword, presence only.
    Flag,
    /// Exactly one unquoted value.
    Single {
        /// The value.
        value: Item,
    },
    /// Zero or more space-separated values.
    List {
        /// The values, in source order.
        items: Vec<Item>,
    },
    /// One quoted string value.
    Quoted {
        /// The decoded string content.
        value: Item,
    },
    /// A segment scoping its own operands.
    Segment {
        /// The segment's operands, in source order.
        operands: Vec<OperandNode>,
    },
}
