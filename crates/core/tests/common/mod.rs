//! Shared test helpers for `racf_lang_core` integration tests.

#![allow(unreachable_pub)]

use racf_lang_core::grammar::ast::{CommandNode, OperandNode, OperandValue};
use racf_lang_core::grammar::parser::{ParseResult, parse_str};
use racf_lang_core::validate::{ValidationResult, validate};
use racf_lang_diagnostics::Diagnostic;
use racf_lang_schema::GrammarSchema;

/// Parse and validate against the bundled schema.
#[allow(dead_code)]
pub fn analyze(input: &str) -> (ParseResult, ValidationResult) {
    let parsed = parse_str(input);
    let validated = validate(&parsed.ast, GrammarSchema::bundled());
    (parsed, validated)
}

/// Collect diagnostic codes, in order.
#[allow(dead_code)]
pub fn diag_codes(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.id.as_ref()).collect()
}

/// The single command of a single-statement parse.
#[allow(dead_code)]
pub fn only_command(result: &ParseResult) -> &CommandNode {
    assert_eq!(
        result.ast.commands.len(),
        1,
        "expected exactly one command node"
    );
    &result.ast.commands[0]
}

/// Find an operand by keyword, searching one level of segments too.
#[allow(dead_code)]
pub fn find_operand<'a>(cmd: &'a CommandNode, keyword: &str) -> Option<&'a OperandNode> {
    fn search<'a>(ops: &'a [OperandNode], keyword: &str) -> Option<&'a OperandNode> {
        for op in ops {
            if op.keyword.eq_ignore_ascii_case(keyword) {
                return Some(op);
            }
            if let OperandValue::Segment { operands } = &op.value
                && let Some(found) = search(operands, keyword)
            {
                return Some(found);
            }
        }
        None
    }
    search(&cmd.operands, keyword)
}

/// The text of a single-valued operand.
#[allow(dead_code)]
pub fn single_text(op: &OperandNode) -> &str {
    match &op.value {
        OperandValue::Single { value } => &value.text,
        OperandValue::Quoted { value } => &value.text,
        other => panic!("operand '{}' is not single-valued: {other:?}", op.keyword),
    }
}
