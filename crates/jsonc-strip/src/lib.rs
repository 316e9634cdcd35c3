//! Shared JSONC comment stripping utility.
//!
//! The grammar table and the diagnostics spec are authored as JSONC so they
//! can carry inline documentation. This crate reduces them to plain JSON:
//! - `//` line comments
//! - `/* ... */` block comments
//! - string literals (including escapes) are preserved verbatim

/// Strip `//` and `/* */` comments from JSONC input.
///
/// Comment-like sequences inside string literals are kept, and escaped
/// quotes do not end a string.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                // Copy the whole string literal through, honoring escapes.
                let start = i;
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' if i + 1 < bytes.len() => i += 2,
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                out.push_str(&input[start..i]);
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            _ => {
                // Advance one full UTF-8 character at a time so multi-byte
                // text in comments/values never splits a char boundary.
                let ch_len = input[i..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&input[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    out
}
