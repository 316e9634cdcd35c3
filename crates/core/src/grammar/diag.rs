//! Diagnostics re-exports.
//!
//! The grammar and validator modules report everything through the shared
//! diagnostics crate; this module keeps their imports local.

pub use racf_lang_diagnostics::{Diagnostic, LineIndex, Severity, Span, codes};

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

pub(crate) use ctx;
