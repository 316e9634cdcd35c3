//! RACF command grammar schema.
//!
//! Defines the data structures describing every known command: verb
//! aliases, positional operand shape, keyword specs (value type, default,
//! aliases, mutual exclusions), and named segments with their own keyword
//! vocabularies. The schema is pure data deserialized from a versioned
//! JSONC table and consumed generically by the parser and validator —
//! adding a command means adding a record, never changing engine code.
//!
//! The schema is read-only after load. [`GrammarSchema::bundled`] exposes a
//! process-wide instance built once from the embedded table; it may be
//! shared across threads without synchronization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

use racf_lang_jsonc_strip::strip_jsonc;

/// Current format version for the grammar table JSONC schema.
pub const SCHEMA_FORMAT_VERSION: &str = "1.0.0";

/// The bundled command grammar table, embedded at compile time.
const BUNDLED_TABLE: &str = include_str!("../data/commands.jsonc");

fn default_format_version() -> String {
    SCHEMA_FORMAT_VERSION.to_string()
}

/// Top-level container for the command grammar.
///
/// Deserialized from the grammar table and used by the parser for verb and
/// keyword resolution and by the validator for value-shape, default, and
/// exclusion rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarSchema {
    /// Grammar table content version (e.g., `"1.2.0"`).
    pub schema_version: String,
    /// Table format version for compatibility checks.
    #[serde(default = "default_format_version")]
    pub format_version: String,
    /// All known command records.
    pub commands: Vec<CommandSpec>,

    /// Cached map from uppercased verb spelling → index into `commands`
    /// (lazily initialized).
    #[serde(skip)]
    verb_map: OnceLock<HashMap<String, usize>>,
}

impl GrammarSchema {
    /// Create a `GrammarSchema` from parts. The verb cache is built lazily
    /// on first lookup.
    pub fn new(schema_version: String, format_version: String, commands: Vec<CommandSpec>) -> Self {
        Self {
            schema_version,
            format_version,
            commands,
            verb_map: OnceLock::new(),
        }
    }

    /// Parse a grammar table from JSONC text.
    pub fn from_jsonc(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&strip_jsonc(text))
    }

    /// The process-wide schema built from the bundled grammar table.
    ///
    /// Loaded on first access and never mutated afterwards, so the returned
    /// reference is safe to share across any number of concurrent parses.
    pub fn bundled() -> &'static GrammarSchema {
        static SCHEMA: OnceLock<GrammarSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            GrammarSchema::from_jsonc(BUNDLED_TABLE)
                .expect("bundled grammar table is valid JSONC — verified by unit tests")
        })
    }

    fn verb_map(&self) -> &HashMap<String, usize> {
        self.verb_map.get_or_init(|| {
            let mut m = HashMap::new();
            for (i, c) in self.commands.iter().enumerate() {
                m.insert(c.name.to_ascii_uppercase(), i);
                for alias in &c.aliases {
                    m.insert(alias.to_ascii_uppercase(), i);
                }
            }
            m
        })
    }

    /// Look up a `CommandSpec` by any of its verb spellings,
    /// case-insensitively (e.g. `"adduser"`, `"AU"`).
    pub fn command_by_verb(&self, verb: &str) -> Option<&CommandSpec> {
        self.verb_map()
            .get(&verb.to_ascii_uppercase())
            .map(|&i| &self.commands[i])
    }
}

/// Grammar record for a single command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Canonical command name (e.g., `"ADDUSER"`).
    pub name: String,
    /// Accepted abbreviations (e.g., `["AU"]`).
    #[serde(default)]
    pub aliases: Vec<String>,
    /// One-line description shown in hover and completion detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Positional operand shape, if the command takes positional operands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional: Option<PositionalSpec>,
    /// Flat keywords and segments accepted by this command.
    #[serde(default)]
    pub keywords: Vec<KeywordSpec>,
}

impl CommandSpec {
    /// Resolve a word against this command's keyword map (names and
    /// aliases, case-insensitive).
    pub fn keyword(&self, word: &str) -> Option<&KeywordSpec> {
        find_keyword(&self.keywords, word)
    }
}

/// Resolve a word against a keyword scope (a command's flat keywords or a
/// segment's keyword list), case-insensitively across names and aliases.
///
/// Scopes are small (tens of entries), so a linear scan beats building and
/// caching per-scope maps.
pub fn find_keyword<'a>(keywords: &'a [KeywordSpec], word: &str) -> Option<&'a KeywordSpec> {
    keywords.iter().find(|k| {
        k.name.eq_ignore_ascii_case(word)
            || k.aliases.iter().any(|a| a.eq_ignore_ascii_case(word))
    })
}

/// Positional operand shape for a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalSpec {
    /// Operand name used in messages (e.g., `"userid"`).
    pub name: String,
    /// How many values the positional list accepts.
    #[serde(default)]
    pub arity: PositionalArity,
    /// Whether at least one value must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Shape rule applied to each positional value.
    pub value: ValueType,
}

/// Arity of a positional operand list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PositionalArity {
    /// Exactly one value.
    #[default]
    One,
    /// One or more values in a parenthesized, space-separated list
    /// (a bare single value is accepted interchangeably).
    OneOrMore,
}

/// Grammar record for one keyword operand within a command or segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSpec {
    /// Canonical keyword spelling (e.g., `"DFLTGRP"`).
    pub name: String,
    /// Accepted alternative spellings.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Declared purpose, shown in hover text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Value shape of this keyword.
    #[serde(flatten)]
    pub kind: KeywordKind,
    /// Whether the command requires a resolved value for this keyword.
    #[serde(default)]
    pub required: bool,
    /// Default value materialized when the keyword is absent and required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Keywords this one is mutually exclusive with. Declared symmetrically
    /// in the table: both partners name each other.
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl KeywordSpec {
    /// Short value-shape summary for hover and completion detail.
    pub fn shape_summary(&self) -> String {
        match &self.kind {
            KeywordKind::Flag => "flag".to_string(),
            KeywordKind::SingleValue { value } => format!("single value: {}", value.describe()),
            KeywordKind::ListValue { value } => format!("list of {}", value.describe()),
            KeywordKind::QuotedString { max_length } => {
                format!("quoted string (max {max_length} characters)")
            }
            KeywordKind::Segment { keywords } => {
                format!("segment with {} keywords", keywords.len())
            }
        }
    }
}

/// Value shape of a keyword — a tagged variant so the parser's keyword-scan
/// loop can recurse uniformly on `Segment` without any type hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KeywordKind {
    /// Presence/absence only. Negating pairs (`ADSP`/`NOADSP`) are two flag
    /// records with mutual `excludes`.
    Flag,
    /// One parenthesized value, e.g. `DFLTGRP(PAYROLL)`.
    SingleValue {
        /// Shape rule for the value.
        value: ValueType,
    },
    /// A parenthesized space-separated list, e.g. `ID(JSMITH MJONES)`.
    ListValue {
        /// Shape rule applied to each element independently.
        value: ValueType,
    },
    /// One parenthesized quoted string, e.g. `NAME('John Smith')`.
    #[serde(rename_all = "camelCase")]
    QuotedString {
        /// Maximum content length in characters.
        max_length: u32,
    },
    /// A named sub-group scoping its own keyword vocabulary, e.g.
    /// `OMVS(UID(0) HOME('/'))`. Segments may contain further segments
    /// (`ENCRYPT` inside `KERB`).
    Segment {
        /// The segment's own keyword map.
        keywords: Vec<KeywordSpec>,
    },
}

/// A closed set of primitive value validators, interpreted by the validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueType {
    /// A name of bounded length drawn from a character-set policy.
    #[serde(rename_all = "camelCase")]
    Identifier {
        /// Minimum length in characters (defaults to 1).
        #[serde(default = "default_min_length")]
        min_length: u32,
        /// Maximum length in characters.
        max_length: u32,
        /// Which characters are permitted.
        #[serde(default)]
        charset: CharsetPolicy,
    },
    /// An integer within inclusive bounds.
    IntegerRange {
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
    /// One of a fixed set of spellings, matched case-insensitively.
    Enumeration {
        /// The allowed spellings, in display order.
        values: Vec<String>,
    },
    /// A fixed textual pattern such as a time of day.
    FixedFormat {
        /// Which pattern applies.
        pattern: FormatPattern,
    },
    /// Exactly `length` characters (e.g., single-character class codes).
    CharCount {
        /// Required character count.
        length: u32,
    },
}

fn default_min_length() -> u32 {
    1
}

impl ValueType {
    /// Human-readable description of the expected shape, used in hover text
    /// and in diagnostics naming what was expected.
    pub fn describe(&self) -> String {
        match self {
            ValueType::Identifier {
                min_length,
                max_length,
                charset,
            } => {
                let chars = match charset {
                    CharsetPolicy::Standard => " (A-Z, 0-9, @#$)",
                    CharsetPolicy::Dataset => " (dataset characters)",
                    CharsetPolicy::Any => "",
                };
                if min_length == max_length {
                    format!("identifier of {max_length} characters{chars}")
                } else {
                    format!("identifier of {min_length}-{max_length} characters{chars}")
                }
            }
            ValueType::IntegerRange { min, max } => format!("integer in {min}..{max}"),
            ValueType::Enumeration { values } => format!("one of {}", values.join(", ")),
            ValueType::FixedFormat { pattern } => match pattern {
                FormatPattern::TimeOfDay => "time of day (hhmm)".to_string(),
                FormatPattern::TimeRange => "time range (hhmm:hhmm)".to_string(),
            },
            ValueType::CharCount { length } => {
                if *length == 1 {
                    "exactly 1 character".to_string()
                } else {
                    format!("exactly {length} characters")
                }
            }
        }
    }
}

/// Character-set policy for [`ValueType::Identifier`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CharsetPolicy {
    /// Letters, digits, and the national characters `@#$`; first character
    /// must not be a digit.
    #[default]
    Standard,
    /// Standard plus `.`, `*`, `%`, and `&` for dataset and profile names.
    Dataset,
    /// No character restrictions; only length is checked.
    Any,
}

/// Fixed textual patterns for [`ValueType::FixedFormat`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FormatPattern {
    /// `hhmm`, 24-hour clock.
    TimeOfDay,
    /// `hhmm:hhmm`, both endpoints on the 24-hour clock.
    TimeRange,
}
