use super::diag::{Diagnostic, Span, codes};

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// A bare word: verb, keyword, identifier, or other unquoted value.
    Word,
    /// A bare word consisting entirely of ASCII digits.
    Number,
    /// A `'...'` string. The token text is the decoded content (`''` → `'`).
    Quoted,
    /// `(`.
    LParen,
    /// `)`.
    RParen,
}

/// A single lexed token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification.
    pub kind: TokKind,
    /// Token text. For `Quoted` this is the decoded content without the
    /// surrounding quotes.
    pub text: String,
    /// Byte span in the original source, including quote characters for
    /// `Quoted` tokens.
    pub span: Span,
}

/// One logical statement: a command image after continuation joining.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Tokens of the statement, in source order. Never empty.
    pub tokens: Vec<Token>,
    /// Byte span from the first to the last token.
    pub span: Span,
    /// 0-indexed first physical line the statement touches.
    pub first_line: usize,
    /// 0-indexed last physical line the statement touches. Greater than
    /// `first_line` when the statement uses continuations.
    pub last_line: usize,
}

/// Result of lexing an input string.
#[derive(Debug)]
pub struct LexResult {
    /// Logical statements in source order.
    pub statements: Vec<Statement>,
    /// Diagnostics produced while lexing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Lex raw input into logical statements.
///
/// Total: never fails, never panics on any input. Statements end at
/// end-of-line unless the last non-blank character of the physical line is
/// the continuation marker `-`; the marker, the line break, and the next
/// line's leading indentation are discarded and the statement continues.
/// `/* ... */` comments are skipped wherever they appear. Quoted strings use
/// `'` with `''` as the escape and may cross a continuation join.
pub fn lex(input: &str) -> LexResult {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    i: usize,
    line: usize,
    toks: Vec<Token>,
    stmt_first_line: usize,
    statements: Vec<Statement>,
    diags: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            i: 0,
            line: 0,
            toks: Vec::new(),
            stmt_first_line: 0,
            statements: Vec::new(),
            diags: Vec::new(),
        }
    }

    fn run(mut self) -> LexResult {
        while self.i < self.bytes.len() {
            match self.bytes[self.i] {
                b'\n' => {
                    self.flush_statement();
                    self.line += 1;
                    self.i += 1;
                }
                b' ' | b'\t' | b'\r' => self.i += 1,
                b'/' if self.bytes.get(self.i + 1) == Some(&b'*') => {
                    if !self.skip_comment() {
                        break;
                    }
                }
                b'\'' => self.read_quoted(),
                b'(' => self.push_char_token(TokKind::LParen),
                b')' => self.push_char_token(TokKind::RParen),
                b'-' if self.rest_of_line_blank(self.i + 1) => self.take_continuation(),
                _ => self.read_word(),
            }
        }
        self.flush_statement();
        LexResult {
            statements: self.statements,
            diagnostics: self.diags,
        }
    }

    fn flush_statement(&mut self) {
        if self.toks.is_empty() {
            return;
        }
        let toks = std::mem::take(&mut self.toks);
        let span = Span::new(toks[0].span.start, toks[toks.len() - 1].span.end);
        self.statements.push(Statement {
            tokens: toks,
            span,
            first_line: self.stmt_first_line,
            last_line: self.line,
        });
    }

    fn push_token(&mut self, kind: TokKind, text: String, span: Span) {
        if self.toks.is_empty() {
            self.stmt_first_line = self.line;
        }
        self.toks.push(Token { kind, text, span });
    }

    fn push_char_token(&mut self, kind: TokKind) {
        let span = Span::new(self.i, self.i + 1);
        let text = self.input[self.i..self.i + 1].to_string();
        self.push_token(kind, text, span);
        self.i += 1;
    }

    /// Whether only blanks remain between `from` and the next line break
    /// (or end of input).
    fn rest_of_line_blank(&self, mut from: usize) -> bool {
        while let Some(&b) = self.bytes.get(from) {
            match b {
                b' ' | b'\t' | b'\r' => from += 1,
                b'\n' => return true,
                _ => return false,
            }
        }
        true
    }

    /// Consume a continuation marker at `self.i`: the `-`, trailing blanks,
    /// the line break, and the next line's leading indentation.
    fn take_continuation(&mut self) {
        self.i += 1;
        while let Some(&b) = self.bytes.get(self.i) {
            self.i += 1;
            if b == b'\n' {
                self.line += 1;
                break;
            }
        }
        while matches!(self.bytes.get(self.i), Some(b' ' | b'\t' | b'\r')) {
            self.i += 1;
        }
    }

    /// Skip a `/* ... */` comment starting at `self.i`. Returns `false` when
    /// the comment is unterminated; the rest of the input is then treated as
    /// commented out.
    fn skip_comment(&mut self) -> bool {
        let open = self.i;
        match self.input[open + 2..].find("*/") {
            Some(rel) => {
                let end = open + 2 + rel + 2;
                self.line += self.bytes[open..end].iter().filter(|&&b| b == b'\n').count();
                self.i = end;
                true
            }
            None => {
                self.diags.push(Diagnostic::error(
                    codes::UNTERMINATED_COMMENT,
                    "comment opened with '/*' is never closed",
                    Some(Span::new(open, open + 2)),
                ));
                self.i = self.bytes.len();
                false
            }
        }
    }

    fn read_quoted(&mut self) {
        let open = self.i;
        self.i += 1;
        let mut content = String::new();
        while self.i < self.bytes.len() {
            match self.bytes[self.i] {
                b'\'' => {
                    if self.bytes.get(self.i + 1) == Some(&b'\'') {
                        content.push('\'');
                        self.i += 2;
                    } else {
                        self.i += 1;
                        let span = Span::new(open, self.i);
                        self.push_token(TokKind::Quoted, content, span);
                        return;
                    }
                }
                b'\n' => {
                    // Line break without a continuation marker: the quote
                    // cannot be closed on a later line.
                    self.diags.push(Diagnostic::error(
                        codes::UNTERMINATED_QUOTE,
                        "quoted string is not terminated before the end of the line",
                        Some(Span::new(open, self.i)),
                    ));
                    let span = Span::new(open, self.i);
                    self.push_token(TokKind::Quoted, content, span);
                    return;
                }
                b'-' if self.continuation_here() => self.take_continuation(),
                _ => {
                    let ch = self.input[self.i..]
                        .chars()
                        .next()
                        .unwrap_or('\u{FFFD}');
                    content.push(ch);
                    self.i += ch.len_utf8();
                }
            }
        }
        self.diags.push(Diagnostic::error(
            codes::UNTERMINATED_QUOTE,
            "quoted string is not terminated before the end of the input",
            Some(Span::new(open, self.bytes.len())),
        ));
        let span = Span::new(open, self.bytes.len());
        self.push_token(TokKind::Quoted, content, span);
    }

    /// Whether `self.i` sits on a `-` acting as a continuation marker inside
    /// a quoted string: only blanks follow on this line and a further line
    /// exists to continue onto.
    fn continuation_here(&self) -> bool {
        let mut j = self.i + 1;
        while let Some(&b) = self.bytes.get(j) {
            match b {
                b' ' | b'\t' | b'\r' => j += 1,
                b'\n' => return true,
                _ => return false,
            }
        }
        false
    }

    fn read_word(&mut self) {
        let start = self.i;
        while self.i < self.bytes.len() {
            match self.bytes[self.i] {
                b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'\'' => break,
                b'/' if self.bytes.get(self.i + 1) == Some(&b'*') => break,
                b'-' if self.i > start && self.rest_of_line_blank(self.i + 1) => break,
                _ => self.i += 1,
            }
        }
        if self.i == start {
            // Lone marker-like byte that matched no rule; skip it.
            self.i += 1;
            return;
        }
        let text = &self.input[start..self.i];
        let kind = if text.bytes().all(|b| b.is_ascii_digit()) {
            TokKind::Number
        } else {
            TokKind::Word
        };
        let span = Span::new(start, self.i);
        self.push_token(kind, text.to_string(), span);
    }
}
