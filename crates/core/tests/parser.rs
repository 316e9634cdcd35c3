//! Parser integration tests: verb resolution, positionals, keyword scan,
//! recovery, and the last-wins exclusion mechanism.

mod common;

use common::{diag_codes, find_operand, only_command, single_text};
use racf_lang_core::grammar::ast::OperandValue;
use racf_lang_core::grammar::parser::parse_str;
use racf_lang_core::to_pretty_json;
use racf_lang_diagnostics::{Severity, Span, codes};

#[test]
fn resolves_canonical_verb() {
    let result = parse_str("ADDUSER JSMITH");
    let cmd = only_command(&result);
    assert!(cmd.resolved);
    assert_eq!(cmd.name, "ADDUSER");
    assert_eq!(cmd.positionals.len(), 1);
    assert_eq!(cmd.positionals[0].text, "JSMITH");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn resolves_alias_case_insensitively() {
    let result = parse_str("au jsmith");
    let cmd = only_command(&result);
    assert!(cmd.resolved);
    assert_eq!(cmd.name, "ADDUSER", "alias resolves to the canonical name");
}

#[test]
fn unknown_command_yields_unresolved_node() {
    let result = parse_str("FROBNICATE JSMITH\nLISTUSER JSMITH");
    assert_eq!(diag_codes(&result.diagnostics), [codes::UNKNOWN_COMMAND]);
    assert_eq!(result.ast.commands.len(), 2);
    let bad = &result.ast.commands[0];
    assert!(!bad.resolved);
    assert_eq!(bad.name, "FROBNICATE");
    assert!(bad.operands.is_empty());
    // The rest of the document still parses.
    assert!(result.ast.commands[1].resolved);
}

#[test]
fn subsystem_prefix_is_kept() {
    let result = parse_str("RACF ADDUSER JSMITH");
    let cmd = only_command(&result);
    assert!(cmd.resolved);
    assert_eq!(cmd.prefix.as_deref(), Some("RACF"));
    assert_eq!(cmd.name, "ADDUSER");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn positional_list_in_parens() {
    let result = parse_str("DELUSER (JSMITH MJONES PBROWN)");
    let cmd = only_command(&result);
    let texts: Vec<&str> = cmd.positionals.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, ["JSMITH", "MJONES", "PBROWN"]);
}

#[test]
fn bare_positionals_take_multiple_words() {
    let result = parse_str("DELUSER JSMITH JDOE");
    assert!(result.diagnostics.is_empty());
    let cmd = only_command(&result);
    let texts: Vec<&str> = cmd.positionals.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, ["JSMITH", "JDOE"]);
}

#[test]
fn resource_commands_take_class_and_profile() {
    let result = parse_str("RDEFINE FACILITY BPX.SUPERUSER UACC(NONE)");
    assert!(result.diagnostics.is_empty());
    let cmd = only_command(&result);
    assert_eq!(cmd.name, "RDEFINE");
    let texts: Vec<&str> = cmd.positionals.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, ["FACILITY", "BPX.SUPERUSER"]);
    assert!(find_operand(cmd, "UACC").is_some());
}

#[test]
fn bare_keyword_starts_keyword_section() {
    // SPECIAL resolves as a keyword, so it is not taken as the positional.
    let result = parse_str("ADDUSER SPECIAL");
    let cmd = only_command(&result);
    assert!(cmd.positionals.is_empty());
    assert!(find_operand(cmd, "SPECIAL").is_some());
}

#[test]
fn flag_and_single_value_operands() {
    let result = parse_str("ADDUSER JSMITH SPECIAL UACC(READ)");
    let cmd = only_command(&result);
    assert!(matches!(
        find_operand(cmd, "SPECIAL").unwrap().value,
        OperandValue::Flag
    ));
    assert_eq!(single_text(find_operand(cmd, "UACC").unwrap()), "READ");
}

#[test]
fn list_value_operand() {
    let result = parse_str("PERMIT PAYROLL.DATA ID(JSMITH MJONES)");
    let cmd = only_command(&result);
    let OperandValue::List { items } = &find_operand(cmd, "ID").unwrap().value else {
        panic!("ID should be a list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].text, "JSMITH");
}

#[test]
fn quoted_string_operand() {
    let result = parse_str("ADDUSER JSMITH NAME('John Smith')");
    let cmd = only_command(&result);
    assert_eq!(single_text(find_operand(cmd, "NAME").unwrap()), "John Smith");
}

#[test]
fn segment_operands_use_their_own_scope() {
    let result = parse_str("ADDUSER JSMITH OMVS(UID(7) HOME('/u/jsmith'))");
    let cmd = only_command(&result);
    assert!(result.diagnostics.is_empty());
    let OperandValue::Segment { operands } = &find_operand(cmd, "OMVS").unwrap().value else {
        panic!("OMVS should be a segment");
    };
    assert_eq!(operands.len(), 2);
    assert_eq!(single_text(&operands[0]), "7");
    assert_eq!(single_text(&operands[1]), "/u/jsmith");
}

#[test]
fn segments_nest() {
    let result = parse_str("ADDUSER JSMITH KERB(KERBNAME('jsmith') ENCRYPT(DES3 NOAES128))");
    let cmd = only_command(&result);
    assert!(result.diagnostics.is_empty());
    assert!(find_operand(cmd, "DES3").is_some());
    assert!(find_operand(cmd, "NOAES128").is_some());
}

#[test]
fn segment_keyword_not_visible_at_top_level() {
    // UID only exists inside OMVS. The keyword is reported and the stray
    // value group that followed it is skipped with one warning.
    let result = parse_str("ADDUSER JSMITH UID(7)");
    assert_eq!(
        diag_codes(&result.diagnostics),
        [codes::UNRECOGNIZED_KEYWORD, codes::STRAY_CONTENT]
    );
}

#[test]
fn unrecognized_keyword_skips_one_token() {
    let result = parse_str("ADDUSER JSMITH BOGUS SPECIAL");
    assert_eq!(
        diag_codes(&result.diagnostics),
        [codes::UNRECOGNIZED_KEYWORD]
    );
    let cmd = only_command(&result);
    assert!(
        find_operand(cmd, "SPECIAL").is_some(),
        "recovery continues after the bad keyword"
    );
}

#[test]
fn missing_paren_drops_the_keyword() {
    let result = parse_str("ADDUSER JSMITH UACC READ");
    let codes_seen = diag_codes(&result.diagnostics);
    assert!(codes_seen.contains(&codes::EXPECTED_PAREN));
    let cmd = only_command(&result);
    assert!(find_operand(cmd, "UACC").is_none());
}

#[test]
fn missing_paren_at_statement_end_anchors_on_keyword() {
    let input = "ADDUSER JSMITH UACC";
    let result = parse_str(input);
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.id == codes::EXPECTED_PAREN)
        .expect("EXPECTED_PAREN reported");
    assert_eq!(diag.span, Some(Span::empty(input.len())));
}

#[test]
fn unmatched_opener_reported_at_statement_end() {
    let result = parse_str("ADDUSER JOHN OMVS(UID(7) HOME('/u/john')");
    assert_eq!(diag_codes(&result.diagnostics), [codes::UNMATCHED_PAREN]);
    let diag = &result.diagnostics[0];
    let end = result.ast.commands[0].span.end;
    assert_eq!(diag.span, Some(Span::empty(end)));
    // The group is closed implicitly; inner operands stay resolved.
    let cmd = only_command(&result);
    assert!(find_operand(cmd, "UID").is_some());
    assert!(find_operand(cmd, "HOME").is_some());
}

#[test]
fn stray_closer_is_skipped() {
    let result = parse_str("ADDUSER JSMITH ) SPECIAL");
    assert_eq!(diag_codes(&result.diagnostics), [codes::UNMATCHED_PAREN]);
    let cmd = only_command(&result);
    assert!(find_operand(cmd, "SPECIAL").is_some());
}

#[test]
fn stray_quoted_value_is_warned() {
    let result = parse_str("ADDUSER JSMITH 'floating'");
    assert_eq!(diag_codes(&result.diagnostics), [codes::STRAY_CONTENT]);
    assert_eq!(result.diagnostics[0].severity, Severity::Warn);
}

#[test]
fn repeated_keyword_last_wins() {
    let result = parse_str("ADDUSER JSMITH UACC(READ) UACC(NONE)");
    assert_eq!(
        diag_codes(&result.diagnostics),
        [codes::DUPLICATE_MUTUALLY_EXCLUSIVE]
    );
    let cmd = only_command(&result);
    let uacc: Vec<_> = cmd
        .operands
        .iter()
        .filter(|op| op.keyword == "UACC")
        .collect();
    assert_eq!(uacc.len(), 1);
    assert_eq!(single_text(uacc[0]), "NONE");
}

#[test]
fn negating_flag_pair_last_wins() {
    // The warning lands on the earlier operand's span and names the
    // survivor; the tree keeps only the survivor.
    let input = "ADDUSER PAY1 SPECIAL NOSPECIAL";
    let result = parse_str(input);
    assert_eq!(result.diagnostics.len(), 1);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.id, codes::DUPLICATE_MUTUALLY_EXCLUSIVE);
    assert_eq!(diag.severity, Severity::Warn);
    let special_at = input.find("SPECIAL").unwrap();
    assert_eq!(
        diag.span,
        Some(Span::new(special_at, special_at + "SPECIAL".len()))
    );
    let ctx = diag.context.as_ref().expect("context");
    assert_eq!(ctx.get("survivor").unwrap(), "NOSPECIAL");

    let cmd = only_command(&result);
    assert!(find_operand(cmd, "SPECIAL").is_none());
    assert!(find_operand(cmd, "NOSPECIAL").is_some());
}

#[test]
fn exclusion_in_segment_scope() {
    let result = parse_str("ADDUSER JSMITH OMVS(UID(7) AUTOUID)");
    assert_eq!(
        diag_codes(&result.diagnostics),
        [codes::DUPLICATE_MUTUALLY_EXCLUSIVE]
    );
    let cmd = only_command(&result);
    assert!(find_operand(cmd, "UID").is_none());
    assert!(find_operand(cmd, "AUTOUID").is_some());
}

#[test]
fn parse_is_idempotent() {
    let input = "ADDUSER JSMITH UACC(READ) OMVS(UID(7))\nBADVERB X\nPERMIT A.B ID(C)";
    let a = parse_str(input);
    let b = parse_str(input);
    assert_eq!(
        to_pretty_json(&a.ast).unwrap(),
        to_pretty_json(&b.ast).unwrap()
    );
    assert_eq!(a.diagnostics, b.diagnostics);
}

#[test]
fn statements_parse_independently() {
    let result = parse_str("ADDUSER JSMITH\nNOTACMD\nDELGROUP PAYROLL");
    assert_eq!(result.ast.commands.len(), 3);
    assert!(result.ast.commands[0].resolved);
    assert!(!result.ast.commands[1].resolved);
    assert!(result.ast.commands[2].resolved);
}
