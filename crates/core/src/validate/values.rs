//! The `ValueType` interpreter: checks one literal value against its
//! declared shape.

use crate::grammar::ast::Item;
use crate::grammar::diag::{Diagnostic, codes, ctx};
use racf_lang_schema::{CharsetPolicy, FormatPattern, ValueType};

/// Check an explicit value against its declared shape, pushing at most one
/// issue. `label` is the keyword or positional name used in messages.
pub(super) fn check_value(
    vt: &ValueType,
    item: &Item,
    label: &str,
    issues: &mut Vec<Diagnostic>,
) {
    match vt {
        ValueType::Identifier {
            min_length,
            max_length,
            charset,
        } => check_identifier(item, label, *min_length, *max_length, *charset, issues),
        ValueType::IntegerRange { min, max } => match item.text.parse::<i64>() {
            Ok(v) if v < *min || v > *max => issues.push(
                Diagnostic::error(
                    codes::VALUE_OUT_OF_RANGE,
                    format!("'{}' value {v} is outside the range {min}..{max}", label),
                    Some(item.span),
                )
                .with_context(ctx! {
                    "keyword" => label,
                    "value" => item.text.clone(),
                    "min" => min.to_string(),
                    "max" => max.to_string(),
                }),
            ),
            Ok(_) => {}
            Err(_) => issues.push(Diagnostic::error(
                codes::VALUE_BAD_FORMAT,
                format!("'{}' expects an integer, got '{}'", label, item.text),
                Some(item.span),
            )),
        },
        ValueType::Enumeration { values } => {
            if !values.iter().any(|v| v.eq_ignore_ascii_case(&item.text)) {
                issues.push(
                    Diagnostic::error(
                        codes::VALUE_BAD_ENUM,
                        format!(
                            "'{}' is not valid for '{}'; expected one of {}",
                            item.text,
                            label,
                            values.join(", ")
                        ),
                        Some(item.span),
                    )
                    .with_context(ctx! {
                        "keyword" => label,
                        "value" => item.text.clone(),
                        "expected" => values.join(","),
                    }),
                );
            }
        }
        ValueType::FixedFormat { pattern } => {
            let good = match pattern {
                FormatPattern::TimeOfDay => is_time_of_day(&item.text),
                FormatPattern::TimeRange => is_time_range(&item.text),
            };
            if !good {
                let expected = match pattern {
                    FormatPattern::TimeOfDay => "hhmm",
                    FormatPattern::TimeRange => "hhmm:hhmm",
                };
                issues.push(Diagnostic::error(
                    codes::VALUE_BAD_FORMAT,
                    format!(
                        "'{}' value '{}' does not match the {expected} format",
                        label, item.text
                    ),
                    Some(item.span),
                ));
            }
        }
        ValueType::CharCount { length } => {
            if item.text.chars().count() != *length as usize {
                issues.push(Diagnostic::error(
                    codes::VALUE_BAD_FORMAT,
                    format!(
                        "'{}' expects exactly {length} character{}, got '{}'",
                        label,
                        if *length == 1 { "" } else { "s" },
                        item.text
                    ),
                    Some(item.span),
                ));
            }
        }
    }
}

fn check_identifier(
    item: &Item,
    label: &str,
    min_length: u32,
    max_length: u32,
    charset: CharsetPolicy,
    issues: &mut Vec<Diagnostic>,
) {
    let len = item.text.chars().count();
    if len < min_length as usize || len > max_length as usize {
        issues.push(
            Diagnostic::error(
                codes::VALUE_BAD_FORMAT,
                format!(
                    "'{}' value '{}' must be {min_length}-{max_length} characters",
                    label, item.text
                ),
                Some(item.span),
            )
            .with_context(ctx! {
                "keyword" => label,
                "value" => item.text.clone(),
            }),
        );
        return;
    }
    let allowed = |c: char, first: bool| -> bool {
        match charset {
            CharsetPolicy::Any => true,
            CharsetPolicy::Standard => {
                c.is_ascii_alphabetic() || "@#$".contains(c) || (!first && c.is_ascii_digit())
            }
            CharsetPolicy::Dataset => {
                c.is_ascii_alphanumeric() || "@#$.*%&".contains(c)
            }
        }
    };
    let mut chars = item.text.chars();
    let first_ok = chars.next().is_none_or(|c| allowed(c, true));
    let rest_ok = chars.all(|c| allowed(c, false));
    if !first_ok || !rest_ok {
        issues.push(Diagnostic::error(
            codes::VALUE_BAD_FORMAT,
            format!(
                "'{}' value '{}' contains characters that are not allowed",
                label, item.text
            ),
            Some(item.span),
        ));
    }
}

fn is_time_of_day(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() != 4 || !b.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hh = (b[0] - b'0') * 10 + (b[1] - b'0');
    let mm = (b[2] - b'0') * 10 + (b[3] - b'0');
    hh < 24 && mm < 60
}

fn is_time_range(s: &str) -> bool {
    let Some((from, to)) = s.split_once(':') else {
        return false;
    };
    is_time_of_day(from) && is_time_of_day(to)
}
