//! Query surface tests: node lookup, completions, and hover.

use racf_lang_core::grammar::parser::parse_str;
use racf_lang_core::query::{CompletionKind, NodeRef, completions_at, hover_at, node_at};
use racf_lang_schema::GrammarSchema;

fn labels(completions: &[racf_lang_core::query::Completion]) -> Vec<&str> {
    completions.iter().map(|c| c.label.as_str()).collect()
}

// ─── node_at ────────────────────────────────────────────────────────────────

#[test]
fn node_at_finds_innermost_operand() {
    let input = "ADDUSER JSMITH OMVS(UID(7))";
    let result = parse_str(input);
    let uid_at = input.find("UID").unwrap();
    match node_at(&result.ast, uid_at + 1) {
        Some(NodeRef::Operand { operand, .. }) => assert_eq!(operand.keyword, "UID"),
        other => panic!("expected the UID operand, got {other:?}"),
    }
}

#[test]
fn node_at_positional_falls_back_to_command() {
    let input = "ADDUSER JSMITH OMVS(UID(7))";
    let result = parse_str(input);
    match node_at(&result.ast, input.find("JSMITH").unwrap()) {
        Some(NodeRef::Command(cmd)) => assert_eq!(cmd.name, "ADDUSER"),
        other => panic!("expected the command node, got {other:?}"),
    }
}

#[test]
fn node_at_outside_any_statement() {
    let result = parse_str("ADDUSER JSMITH");
    assert!(node_at(&result.ast, 500).is_none());
}

#[test]
fn node_at_works_on_unresolved_commands() {
    let result = parse_str("FROBNICATE X");
    assert!(matches!(
        node_at(&result.ast, 3),
        Some(NodeRef::Command(_))
    ));
}

// ─── completions ────────────────────────────────────────────────────────────

#[test]
fn completions_between_statements_offer_verbs() {
    let input = "ADDUSER X\n\nLISTUSER Y";
    let result = parse_str(input);
    let completions = completions_at(&result.ast, GrammarSchema::bundled(), 10);
    assert!(completions.iter().all(|c| c.kind == CompletionKind::Command));
    let l = labels(&completions);
    assert!(l.contains(&"ADDUSER"));
    assert!(l.contains(&"PERMIT"));
}

#[test]
fn completions_in_command_scope_exclude_present_and_partners() {
    let input = "ADDUSER JSMITH SPECIAL";
    let result = parse_str(input);
    let offset = input.find("SPECIAL").unwrap() + 2;
    let completions = completions_at(&result.ast, GrammarSchema::bundled(), offset);
    let l = labels(&completions);
    assert!(!l.contains(&"SPECIAL"), "already present");
    assert!(!l.contains(&"NOSPECIAL"), "exclusion partner is present");
    assert!(l.contains(&"OMVS"));
    assert!(l.contains(&"UACC"));
}

#[test]
fn completions_inside_segment_use_segment_scope() {
    let input = "ADDUSER JSMITH OMVS(UID(7))";
    let result = parse_str(input);
    let offset = input.find("UID").unwrap() + 1;
    let completions = completions_at(&result.ast, GrammarSchema::bundled(), offset);
    let l = labels(&completions);
    assert!(l.contains(&"HOME"));
    assert!(!l.contains(&"UID"), "already present");
    assert!(!l.contains(&"AUTOUID"), "excluded by the present UID");
    assert!(!l.contains(&"SPECIAL"), "top-level keywords are out of scope");
}

#[test]
fn completions_in_enum_value_offer_values() {
    let input = "ADDUSER JSMITH UACC(READ)";
    let result = parse_str(input);
    let offset = input.find("READ").unwrap() + 1;
    let completions = completions_at(&result.ast, GrammarSchema::bundled(), offset);
    assert!(completions.iter().all(|c| c.kind == CompletionKind::Value));
    let l = labels(&completions);
    assert!(l.contains(&"ALTER"));
    assert!(l.contains(&"NONE"));
}

#[test]
fn list_enum_completions_skip_written_values() {
    let input = "ADDUSER JSMITH WHEN(DAYS(MONDAY FRIDAY))";
    let result = parse_str(input);
    let offset = input.find("FRIDAY").unwrap() + 1;
    let completions = completions_at(&result.ast, GrammarSchema::bundled(), offset);
    let l = labels(&completions);
    assert!(l.contains(&"TUESDAY"));
    assert!(!l.contains(&"MONDAY"));
    assert!(!l.contains(&"FRIDAY"));
}

#[test]
fn completions_on_broken_verb_offer_verbs() {
    let input = "ADDUSR JSMITH";
    let result = parse_str(input);
    let completions = completions_at(&result.ast, GrammarSchema::bundled(), 3);
    assert!(labels(&completions).contains(&"ADDUSER"));
}

// ─── hover ──────────────────────────────────────────────────────────────────

#[test]
fn hover_on_verb_shows_summary_and_aliases() {
    let input = "ADDUSER JSMITH";
    let result = parse_str(input);
    let hover = hover_at(&result.ast, GrammarSchema::bundled(), 2).expect("hover");
    assert!(hover.contents.contains("ADDUSER"));
    assert!(hover.contents.contains("AU"));
    assert!(hover.contents.contains("user profile"));
}

#[test]
fn hover_on_keyword_shows_purpose_and_shape() {
    let input = "ADDUSER JSMITH UACC(READ)";
    let result = parse_str(input);
    let offset = input.find("UACC").unwrap() + 1;
    let hover = hover_at(&result.ast, GrammarSchema::bundled(), offset).expect("hover");
    assert!(hover.contents.contains("Universal access"));
    assert!(hover.contents.contains("one of NONE, READ"));
}

#[test]
fn hover_on_segment_keyword() {
    let input = "ADDUSER JSMITH OMVS(UID(7))";
    let result = parse_str(input);
    let offset = input.find("UID").unwrap() + 1;
    let hover = hover_at(&result.ast, GrammarSchema::bundled(), offset).expect("hover");
    assert!(hover.contents.contains("UNIX user identifier"));
}

#[test]
fn hover_on_segment_name_shows_segment_purpose() {
    let input = "ADDUSER JSMITH OMVS(UID(7))";
    let result = parse_str(input);
    let offset = input.find("OMVS").unwrap() + 1;
    let hover = hover_at(&result.ast, GrammarSchema::bundled(), offset).expect("hover");
    assert!(hover.contents.contains("OMVS"));
    assert!(hover.contents.contains("z/OS UNIX System Services"));
    assert!(
        !hover.contents.contains("user profile"),
        "the segment keyword must not fall back to the command hover"
    );
}

#[test]
fn hover_outside_statements_is_none() {
    let input = "ADDUSER X\n\nLISTUSER Y";
    let result = parse_str(input);
    assert!(hover_at(&result.ast, GrammarSchema::bundled(), 10).is_none());
}

#[test]
fn hover_on_unknown_command_is_none() {
    let result = parse_str("FROBNICATE X");
    assert!(hover_at(&result.ast, GrammarSchema::bundled(), 3).is_none());
}
