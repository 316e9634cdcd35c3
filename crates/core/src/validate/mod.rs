//! AST validation against the grammar schema.
//!
//! The parser records what the source said; validation checks explicit
//! values against their declared shapes and materializes defaults for
//! required keywords the source omitted. The input AST is never mutated; a
//! resolved copy is returned.

mod values;

use crate::grammar::ast::{Ast, CommandNode, Item, OperandNode, OperandValue};
use crate::grammar::diag::{Diagnostic, Severity, Span, codes, ctx};
use racf_lang_schema::{
    CommandSpec, GrammarSchema, KeywordKind, KeywordSpec, PositionalArity, find_keyword,
};

use values::check_value;

/// Result of validating a parsed document.
pub struct ValidationResult {
    /// True iff validation produced no `Error`-severity issue. Parser
    /// diagnostics are not considered.
    pub ok: bool,
    /// Issues produced by validation.
    pub issues: Vec<Diagnostic>,
    /// Copy of the input AST with required defaults materialized
    /// (`from_default = true`, appended after all explicit operands).
    pub resolved: Ast,
}

/// Validate a parsed document against the grammar schema.
///
/// Only explicit values are shape-checked; materialized defaults come from
/// the schema and are trusted. Unresolved command nodes were already
/// reported by the parser and are skipped.
pub fn validate(ast: &Ast, schema: &GrammarSchema) -> ValidationResult {
    let mut issues = Vec::new();
    let mut resolved = ast.clone();
    for cmd in &mut resolved.commands {
        if !cmd.resolved {
            continue;
        }
        let Some(spec) = schema.command_by_verb(&cmd.name) else {
            continue;
        };
        validate_command(cmd, spec, &mut issues);
    }
    let ok = !issues.iter().any(|d| d.severity == Severity::Error);
    ValidationResult {
        ok,
        issues,
        resolved,
    }
}

fn validate_command(cmd: &mut CommandNode, spec: &CommandSpec, issues: &mut Vec<Diagnostic>) {
    if let Some(pos) = &spec.positional {
        if pos.required && cmd.positionals.is_empty() {
            issues.push(
                Diagnostic::error(
                    codes::REQUIRED_MISSING,
                    format!("{} requires at least one {}", spec.name, pos.name),
                    Some(cmd.span),
                )
                .with_context(ctx! { "command" => spec.name.clone(), "operand" => pos.name.clone() }),
            );
        }
        if pos.arity == PositionalArity::One && cmd.positionals.len() > 1 {
            for extra in &cmd.positionals[1..] {
                issues.push(Diagnostic::error(
                    codes::VALUE_BAD_FORMAT,
                    format!("{} accepts a single {}", spec.name, pos.name),
                    Some(extra.span),
                ));
            }
        }
        for item in &cmd.positionals {
            check_value(&pos.value, item, &pos.name, issues);
        }
    }
    let anchor = Span::empty(cmd.span.end);
    validate_scope(&mut cmd.operands, &spec.keywords, &spec.name, anchor, issues);
}

/// Validate one keyword scope (the command's flat keywords or a segment's),
/// then materialize defaults for required keywords that are absent.
fn validate_scope(
    operands: &mut Vec<OperandNode>,
    keywords: &[KeywordSpec],
    owner: &str,
    anchor: Span,
    issues: &mut Vec<Diagnostic>,
) {
    for op in operands.iter_mut() {
        if op.from_default {
            continue;
        }
        // The parser only records keywords it resolved, but stay total.
        let Some(kspec) = find_keyword(keywords, &op.keyword) else {
            continue;
        };
        check_operand(op, kspec, issues);
    }
    materialize_defaults(operands, keywords, owner, anchor, issues);
}

fn check_operand(op: &mut OperandNode, kspec: &KeywordSpec, issues: &mut Vec<Diagnostic>) {
    match (&kspec.kind, &mut op.value) {
        (KeywordKind::Flag, OperandValue::Flag) => {}
        (KeywordKind::SingleValue { value }, OperandValue::Single { value: item }) => {
            check_value(value, item, &kspec.name, issues);
        }
        (KeywordKind::SingleValue { .. }, OperandValue::List { items }) => {
            if items.is_empty() {
                issues.push(Diagnostic::error(
                    codes::REQUIRED_MISSING,
                    format!("'{}' requires a value", kspec.name),
                    Some(op.span),
                ));
            } else {
                issues.push(Diagnostic::error(
                    codes::VALUE_BAD_FORMAT,
                    format!("'{}' accepts a single value", kspec.name),
                    Some(op.span),
                ));
            }
        }
        (KeywordKind::ListValue { value }, OperandValue::List { items }) => {
            if items.is_empty() {
                issues.push(Diagnostic::error(
                    codes::REQUIRED_MISSING,
                    format!("'{}' requires at least one value", kspec.name),
                    Some(op.span),
                ));
            }
            for item in items.iter() {
                check_value(value, item, &kspec.name, issues);
            }
        }
        (KeywordKind::ListValue { value }, OperandValue::Single { value: item }) => {
            check_value(value, item, &kspec.name, issues);
        }
        (KeywordKind::QuotedString { max_length }, OperandValue::Quoted { value }) => {
            let len = value.text.chars().count();
            if len > *max_length as usize {
                issues.push(
                    Diagnostic::error(
                        codes::VALUE_BAD_FORMAT,
                        format!(
                            "'{}' value is {len} characters; the maximum is {max_length}",
                            kspec.name
                        ),
                        Some(value.span),
                    )
                    .with_context(ctx! {
                        "keyword" => kspec.name.clone(),
                        "maxLength" => max_length.to_string(),
                    }),
                );
            }
        }
        (KeywordKind::QuotedString { .. }, _) => {
            issues.push(Diagnostic::error(
                codes::VALUE_BAD_FORMAT,
                format!("'{}' expects a single quoted string", kspec.name),
                Some(op.span),
            ));
        }
        (KeywordKind::Segment { keywords }, OperandValue::Segment { operands }) => {
            let anchor = Span::empty(op.span.end);
            validate_scope(operands, keywords, &kspec.name, anchor, issues);
        }
        // Shape mismatches the parser cannot produce; nothing to check.
        _ => {}
    }
}

/// Materialize defaults for required keywords absent from the scope, or
/// report them missing when no default is declared. A required keyword whose
/// exclusion partner was written explicitly is considered satisfied.
fn materialize_defaults(
    operands: &mut Vec<OperandNode>,
    keywords: &[KeywordSpec],
    owner: &str,
    anchor: Span,
    issues: &mut Vec<Diagnostic>,
) {
    for kspec in keywords {
        if !kspec.required {
            continue;
        }
        let present = operands
            .iter()
            .any(|op| op.keyword.eq_ignore_ascii_case(&kspec.name));
        if present {
            continue;
        }
        let excluded = operands.iter().any(|op| {
            kspec
                .excludes
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&op.keyword))
        });
        if excluded {
            continue;
        }
        match &kspec.default {
            Some(default) => operands.push(default_operand(kspec, default, anchor)),
            None => issues.push(
                Diagnostic::error(
                    codes::REQUIRED_MISSING,
                    format!("'{}' is required on {owner}", kspec.name),
                    Some(anchor),
                )
                .with_context(ctx! { "keyword" => kspec.name.clone() }),
            ),
        }
    }
}

fn default_operand(kspec: &KeywordSpec, default: &str, anchor: Span) -> OperandNode {
    let item = || Item {
        text: default.to_string(),
        span: anchor,
    };
    let value = match &kspec.kind {
        KeywordKind::Flag => OperandValue::Flag,
        KeywordKind::SingleValue { .. } => OperandValue::Single { value: item() },
        KeywordKind::ListValue { .. } => OperandValue::List { items: vec![item()] },
        KeywordKind::QuotedString { .. } => OperandValue::Quoted { value: item() },
        // Segments carry no scalar default; an absent segment stays absent.
        KeywordKind::Segment { .. } => OperandValue::Segment {
            operands: Vec::new(),
        },
    };
    OperandNode {
        keyword: kspec.name.clone(),
        value,
        span: anchor,
        from_default: true,
    }
}
