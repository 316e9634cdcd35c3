//! Position-based queries over a parsed document.
//!
//! Everything here is total and read-only: queries borrow the AST and the
//! schema, allocate only their results, and never mutate either input. They
//! are designed to run against the latest parse even while the text already
//! contains errors, so editor features keep working on broken documents.

use crate::grammar::ast::{Ast, CommandNode, OperandNode, OperandValue};
use racf_lang_schema::{
    CommandSpec, GrammarSchema, KeywordKind, KeywordSpec, ValueType, find_keyword,
};
use racf_lang_diagnostics::Span;
use serde::Serialize;

/// The most specific node covering a byte offset.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// The offset is inside a command but not inside any operand.
    Command(&'a CommandNode),
    /// The offset is inside an operand (the innermost one, for segments).
    Operand {
        /// The command owning the operand.
        command: &'a CommandNode,
        /// The innermost operand covering the offset.
        operand: &'a OperandNode,
    },
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Canonical spelling to insert.
    pub label: String,
    /// Short description shown next to the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// What kind of thing is being completed.
    pub kind: CompletionKind,
}

/// Kind of a completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    /// A command verb.
    Command,
    /// A keyword of the current scope.
    Keyword,
    /// A legal enumeration value.
    Value,
}

/// Hover information for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    /// Markdown-ish text describing the thing under the cursor.
    pub contents: String,
    /// Span of the node the hover describes.
    pub span: Span,
}

/// Find the most specific node covering `offset`: operand inside segment,
/// then flat operand, then command. Returns `None` between statements.
pub fn node_at(ast: &Ast, offset: usize) -> Option<NodeRef<'_>> {
    let command = ast.commands.iter().find(|c| c.span.contains(offset))?;
    match deepest_operand(&command.operands, offset) {
        Some(operand) => Some(NodeRef::Operand { command, operand }),
        None => Some(NodeRef::Command(command)),
    }
}

fn deepest_operand(operands: &[OperandNode], offset: usize) -> Option<&OperandNode> {
    let op = operands
        .iter()
        .find(|o| !o.from_default && o.span.contains(offset))?;
    if let OperandValue::Segment { operands: inner } = &op.value
        && let Some(deeper) = deepest_operand(inner, offset)
    {
        return Some(deeper);
    }
    Some(op)
}

/// Completion candidates for a position.
///
/// Outside any command: every command verb. Inside a command: the keywords
/// of the innermost scope that are not yet present and whose exclusion
/// partners are not present. Inside the value parentheses of an
/// enumeration-valued keyword: the legal values.
pub fn completions_at(ast: &Ast, schema: &GrammarSchema, offset: usize) -> Vec<Completion> {
    let Some(cmd) = ast.commands.iter().find(|c| c.span.contains(offset)) else {
        return verb_completions(schema);
    };
    if !cmd.resolved {
        // The verb itself is broken; offer verbs to replace it.
        return verb_completions(schema);
    }
    let Some(spec) = schema.command_by_verb(&cmd.name) else {
        return Vec::new();
    };

    let loc = locate(cmd, spec, offset);
    if let Some((op, kspec)) = loc.operand
        && let Some(values) = enum_values(kspec)
    {
        return value_completions(op, values);
    }
    keyword_completions(loc.scope_keywords, loc.scope_operands)
}

/// Hover text for a position: command summary (with aliases) over the verb
/// or positionals, keyword purpose plus value shape over an operand.
pub fn hover_at(ast: &Ast, schema: &GrammarSchema, offset: usize) -> Option<Hover> {
    let cmd = ast.commands.iter().find(|c| c.span.contains(offset))?;
    if !cmd.resolved {
        return None;
    }
    let spec = schema.command_by_verb(&cmd.name)?;
    let loc = locate(cmd, spec, offset);
    if let Some((op, kspec)) = loc.operand {
        let mut contents = kspec.name.clone();
        if let Some(purpose) = &kspec.purpose {
            contents.push_str(" — ");
            contents.push_str(purpose);
        }
        contents.push('\n');
        contents.push_str(&kspec.shape_summary());
        return Some(Hover {
            contents,
            span: op.span,
        });
    }
    let mut contents = spec.name.clone();
    if !spec.aliases.is_empty() {
        contents.push_str(&format!(" ({})", spec.aliases.join(", ")));
    }
    if let Some(summary) = &spec.summary {
        contents.push_str(" — ");
        contents.push_str(summary);
    }
    Some(Hover {
        contents,
        span: cmd.span,
    })
}

// ─── Scope location ─────────────────────────────────────────────────────────

struct Location<'a> {
    /// Innermost non-segment operand covering the offset, with its spec.
    operand: Option<(&'a OperandNode, &'a KeywordSpec)>,
    /// Keyword map of the innermost scope covering the offset.
    scope_keywords: &'a [KeywordSpec],
    /// Explicit operands already present in that scope.
    scope_operands: &'a [OperandNode],
}

/// Descend from the command through segment operands covering `offset`,
/// tracking the innermost keyword scope along the way.
fn locate<'a>(cmd: &'a CommandNode, spec: &'a CommandSpec, offset: usize) -> Location<'a> {
    let mut scope_keywords: &'a [KeywordSpec] = &spec.keywords;
    let mut scope_operands: &'a [OperandNode] = &cmd.operands;
    let mut operand = None;
    loop {
        let hit = scope_operands
            .iter()
            .find(|o| !o.from_default && o.span.contains(offset));
        let Some(op) = hit else { break };
        let Some(kspec) = find_keyword(scope_keywords, &op.keyword) else {
            break;
        };
        if let (KeywordKind::Segment { keywords }, OperandValue::Segment { operands }) =
            (&kspec.kind, &op.value)
        {
            scope_keywords = keywords;
            scope_operands = operands;
            if operands.iter().any(|o| o.span.contains(offset)) {
                continue;
            }
            // On the segment keyword itself (or inside its parentheses but
            // on no inner operand) the segment is the innermost operand.
            operand = Some((op, kspec));
            break;
        }
        operand = Some((op, kspec));
        break;
    }
    Location {
        operand,
        scope_keywords,
        scope_operands,
    }
}

// ─── Completion builders ────────────────────────────────────────────────────

fn verb_completions(schema: &GrammarSchema) -> Vec<Completion> {
    schema
        .commands
        .iter()
        .map(|c| Completion {
            label: c.name.clone(),
            detail: c.summary.clone(),
            kind: CompletionKind::Command,
        })
        .collect()
}

fn keyword_completions(keywords: &[KeywordSpec], operands: &[OperandNode]) -> Vec<Completion> {
    let present = |name: &str| {
        operands
            .iter()
            .any(|op| op.keyword.eq_ignore_ascii_case(name))
    };
    keywords
        .iter()
        .filter(|k| !present(&k.name) && !k.excludes.iter().any(|e| present(e)))
        .map(|k| Completion {
            label: k.name.clone(),
            detail: k.purpose.clone().or_else(|| Some(k.shape_summary())),
            kind: CompletionKind::Keyword,
        })
        .collect()
}

fn enum_values(kspec: &KeywordSpec) -> Option<&[String]> {
    let vt = match &kspec.kind {
        KeywordKind::SingleValue { value } | KeywordKind::ListValue { value } => value,
        _ => return None,
    };
    match vt {
        ValueType::Enumeration { values } => Some(values),
        _ => None,
    }
}

fn value_completions(op: &OperandNode, values: &[String]) -> Vec<Completion> {
    // For lists, values already written are not offered again.
    let written: Vec<&str> = match &op.value {
        OperandValue::List { items } => items.iter().map(|i| i.text.as_str()).collect(),
        _ => Vec::new(),
    };
    values
        .iter()
        .filter(|v| !written.iter().any(|w| w.eq_ignore_ascii_case(v)))
        .map(|v| Completion {
            label: v.clone(),
            detail: None,
            kind: CompletionKind::Value,
        })
        .collect()
}
