use super::{
    ast::{Ast, CommandNode, Item, OperandNode, OperandValue},
    diag::{Diagnostic, Span, codes, ctx},
    lexer::{Statement, TokKind, Token, lex},
};
use racf_lang_schema::{
    CommandSpec, GrammarSchema, KeywordKind, KeywordSpec, PositionalArity, find_keyword,
};

/// Result of parsing a RACF command document.
#[derive(serde::Serialize)]
pub struct ParseResult {
    /// The parsed abstract syntax tree.
    pub ast: Ast,
    /// Diagnostics (errors, warnings, info) produced during lexing and
    /// parsing.
    pub diagnostics: Vec<Diagnostic>,
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse a RACF command document using the bundled grammar schema.
pub fn parse_str(input: &str) -> ParseResult {
    parse_with_schema(input, GrammarSchema::bundled())
}

/// Parse a RACF command document against a specific grammar schema.
///
/// Total: every statement yields a `CommandNode` and every problem is
/// reported as a diagnostic. The schema is never mutated.
pub fn parse_with_schema(input: &str, schema: &GrammarSchema) -> ParseResult {
    let lexed = lex(input);
    let mut diags = lexed.diagnostics;
    let mut commands = Vec::new();
    for stmt in &lexed.statements {
        if let Some(node) = parse_statement(stmt, schema, &mut diags) {
            commands.push(node);
        }
    }
    ParseResult {
        ast: Ast { commands },
        diagnostics: diags,
    }
}

// ─── Statement parsing ──────────────────────────────────────────────────────

fn parse_statement(
    stmt: &Statement,
    schema: &GrammarSchema,
    diags: &mut Vec<Diagnostic>,
) -> Option<CommandNode> {
    let toks = &stmt.tokens;
    let first = toks.first()?;

    // Verb resolution over name and aliases. When the first word does not
    // resolve but the second does, the first is kept as an unvalidated
    // subsystem prefix (e.g. `RACF ADDUSER ...`).
    let mut idx = 1;
    let mut prefix = None;
    let mut spec = schema.command_by_verb(&first.text);
    if spec.is_none()
        && let Some(second) = toks.get(1)
        && second.kind == TokKind::Word
        && let Some(s) = schema.command_by_verb(&second.text)
    {
        prefix = Some(first.text.clone());
        spec = Some(s);
        idx = 2;
    }

    let Some(spec) = spec else {
        diags.push(
            Diagnostic::error(
                codes::UNKNOWN_COMMAND,
                format!("unknown command '{}'", first.text),
                Some(stmt.span),
            )
            .with_context(ctx! { "command" => first.text.clone() }),
        );
        return Some(CommandNode {
            name: first.text.clone(),
            resolved: false,
            prefix: None,
            positionals: Vec::new(),
            operands: Vec::new(),
            span: stmt.span,
        });
    };

    let mut p = StatementParser {
        toks,
        pos: idx,
        stmt_end: stmt.span.end,
        diags,
    };
    let positionals = p.parse_positionals(spec);
    let operands = p.scan_operands(&spec.keywords, true);

    Some(CommandNode {
        name: spec.name.clone(),
        resolved: true,
        prefix,
        positionals,
        operands,
        span: stmt.span,
    })
}

struct StatementParser<'a, 'd> {
    toks: &'a [Token],
    pos: usize,
    stmt_end: usize,
    diags: &'d mut Vec<Diagnostic>,
}

impl StatementParser<'_, '_> {
    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }

    fn advance(&mut self) -> &Token {
        let t = &self.toks[self.pos];
        self.pos += 1;
        t
    }

    /// Positional operands: a parenthesized space-separated list, or bare
    /// values up to the declared arity (`RDEFINE FACILITY MY.RESOURCE`). A
    /// bare word that resolves as one of the command's keywords, or that
    /// opens its own parenthesized value, starts the keyword section
    /// instead.
    fn parse_positionals(&mut self, spec: &CommandSpec) -> Vec<Item> {
        let Some(pos_spec) = &spec.positional else {
            return Vec::new();
        };
        if let Some(t) = self.peek()
            && t.kind == TokKind::LParen
        {
            let opener = t.clone();
            self.advance();
            return self
                .read_group_items(&opener, "positional list")
                .into_iter()
                .map(|(_, item)| item)
                .collect();
        }
        let mut items = Vec::new();
        while let Some(t) = self.peek() {
            if !matches!(t.kind, TokKind::Word | TokKind::Number)
                || spec.keyword(&t.text).is_some()
                || self.next_is_lparen()
            {
                break;
            }
            items.push(Item {
                text: t.text.clone(),
                span: t.span,
            });
            self.advance();
            if matches!(pos_spec.arity, PositionalArity::One) {
                break;
            }
        }
        items
    }

    fn next_is_lparen(&self) -> bool {
        self.toks
            .get(self.pos + 1)
            .is_some_and(|t| t.kind == TokKind::LParen)
    }

    /// The schema-driven keyword scan loop. Recurses into segment scopes
    /// with the segment's own keyword map. At the top level a stray `)` is
    /// reported and skipped; inside a segment it closes the scope.
    fn scan_operands(&mut self, keywords: &[KeywordSpec], top_level: bool) -> Vec<OperandNode> {
        let mut operands = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::RParen => {
                    if !top_level {
                        break;
                    }
                    self.diags.push(Diagnostic::error(
                        codes::UNMATCHED_PAREN,
                        "')' without a matching '('",
                        Some(tok.span),
                    ));
                    self.advance();
                }
                TokKind::LParen => {
                    self.diags.push(Diagnostic::warn(
                        codes::STRAY_CONTENT,
                        "parenthesized group is not attached to any keyword",
                        Some(tok.span),
                    ));
                    self.skip_balanced_group();
                }
                TokKind::Quoted | TokKind::Number => {
                    self.diags.push(Diagnostic::warn(
                        codes::STRAY_CONTENT,
                        format!("'{}' is not attached to any keyword", tok.text),
                        Some(tok.span),
                    ));
                    self.advance();
                }
                TokKind::Word => {
                    let kw_tok = self.advance().clone();
                    let Some(kspec) = find_keyword(keywords, &kw_tok.text) else {
                        self.diags.push(
                            Diagnostic::error(
                                codes::UNRECOGNIZED_KEYWORD,
                                format!("unrecognized keyword '{}'", kw_tok.text),
                                Some(kw_tok.span),
                            )
                            .with_context(ctx! { "keyword" => kw_tok.text.clone() }),
                        );
                        continue;
                    };
                    self.parse_operand(&kw_tok, kspec, &mut operands);
                }
            }
        }
        operands
    }

    fn parse_operand(
        &mut self,
        kw_tok: &Token,
        kspec: &KeywordSpec,
        operands: &mut Vec<OperandNode>,
    ) {
        match &kspec.kind {
            KeywordKind::Flag => {
                self.record(operands, kspec, OperandValue::Flag, kw_tok.span);
            }
            KeywordKind::SingleValue { .. } => {
                if !self.expect_lparen(kw_tok, kspec) {
                    return;
                }
                let mut items = self.read_group_items(kw_tok, &kspec.name);
                let end = self.last_end(kw_tok);
                let value = if items.len() == 1 {
                    let (_, value) = items.remove(0);
                    OperandValue::Single { value }
                } else {
                    OperandValue::List {
                        items: items.into_iter().map(|(_, item)| item).collect(),
                    }
                };
                self.record(operands, kspec, value, Span::new(kw_tok.span.start, end));
            }
            KeywordKind::ListValue { .. } => {
                if !self.expect_lparen(kw_tok, kspec) {
                    return;
                }
                let items = self.read_group_items(kw_tok, &kspec.name);
                let end = self.last_end(kw_tok);
                self.record(
                    operands,
                    kspec,
                    OperandValue::List {
                        items: items.into_iter().map(|(_, item)| item).collect(),
                    },
                    Span::new(kw_tok.span.start, end),
                );
            }
            KeywordKind::QuotedString { .. } => {
                if !self.expect_lparen(kw_tok, kspec) {
                    return;
                }
                let mut items = self.read_group_items(kw_tok, &kspec.name);
                let end = self.last_end(kw_tok);
                // Record the written shape; the validator reports a
                // non-quoted or multi-valued body.
                let value = match items.first() {
                    Some((TokKind::Quoted, _)) if items.len() == 1 => {
                        let (_, value) = items.remove(0);
                        OperandValue::Quoted { value }
                    }
                    Some(_) if items.len() == 1 => {
                        let (_, value) = items.remove(0);
                        OperandValue::Single { value }
                    }
                    _ => OperandValue::List {
                        items: items.into_iter().map(|(_, item)| item).collect(),
                    },
                };
                self.record(operands, kspec, value, Span::new(kw_tok.span.start, end));
            }
            KeywordKind::Segment { keywords } => {
                if !self.expect_lparen(kw_tok, kspec) {
                    return;
                }
                let inner = self.scan_operands(keywords, false);
                match self.peek() {
                    Some(t) if t.kind == TokKind::RParen => {
                        self.advance();
                    }
                    // The scope is closed implicitly so the inner operands
                    // stay resolved.
                    _ => self.unmatched_group(kw_tok),
                }
                let end = self.last_end(kw_tok);
                self.record(
                    operands,
                    kspec,
                    OperandValue::Segment { operands: inner },
                    Span::new(kw_tok.span.start, end),
                );
            }
        }
    }

    /// Skip a stray parenthesized group, including nested groups. The
    /// opening `(` is the current token.
    fn skip_balanced_group(&mut self) {
        let mut depth = 0usize;
        while let Some(t) = self.peek() {
            match t.kind {
                TokKind::LParen => depth += 1,
                TokKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume the `(` that must follow a value keyword. On failure the
    /// keyword is dropped after the diagnostic; the offending token stays
    /// for the scan loop.
    fn expect_lparen(&mut self, kw_tok: &Token, kspec: &KeywordSpec) -> bool {
        match self.peek() {
            Some(t) if t.kind == TokKind::LParen => {
                self.advance();
                true
            }
            _ => {
                // Anchor on the offending token, or on the end of the
                // keyword when nothing follows it.
                let at = self
                    .peek()
                    .map_or(Span::empty(kw_tok.span.end), |t| t.span);
                self.diags.push(
                    Diagnostic::error(
                        codes::EXPECTED_PAREN,
                        format!("'{}' requires a parenthesized value", kspec.name),
                        Some(at),
                    )
                    .with_context(ctx! { "keyword" => kspec.name.clone() }),
                );
                false
            }
        }
    }

    /// Read value items up to the matching `)`. The opening `(` has already
    /// been consumed. An unterminated group is reported once, at the end of
    /// the statement, citing the opener.
    fn read_group_items(&mut self, opener: &Token, what: &str) -> Vec<(TokKind, Item)> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    self.unmatched_group(opener);
                    break;
                }
                Some(t) => match t.kind {
                    TokKind::RParen => {
                        self.advance();
                        break;
                    }
                    TokKind::Word | TokKind::Number | TokKind::Quoted => {
                        items.push((
                            t.kind,
                            Item {
                                text: t.text.clone(),
                                span: t.span,
                            },
                        ));
                        self.advance();
                    }
                    TokKind::LParen => {
                        self.diags.push(Diagnostic::warn(
                            codes::STRAY_CONTENT,
                            format!("unexpected '(' inside {what}"),
                            Some(t.span),
                        ));
                        self.advance();
                    }
                },
            }
        }
        items
    }

    fn unmatched_group(&mut self, opener: &Token) {
        self.diags.push(
            Diagnostic::error(
                codes::UNMATCHED_PAREN,
                format!(
                    "missing ')' for group opened after '{}'",
                    opener.text
                ),
                Some(Span::empty(self.stmt_end)),
            )
            .with_context(ctx! {
                "opener" => opener.text.clone(),
                "openedAt" => opener.span.start.to_string(),
            }),
        );
    }

    /// End offset of the last consumed token, for operand spans.
    fn last_end(&self, fallback: &Token) -> usize {
        if self.pos == 0 {
            return fallback.span.end;
        }
        self.toks
            .get(self.pos - 1)
            .map_or(fallback.span.end, |t| t.span.end)
    }

    /// Record an operand last-wins: a new operand whose keyword repeats an
    /// earlier one, or conflicts with it via the schema's exclusion groups,
    /// replaces it. The warning is attached to the earlier operand's span
    /// and names the survivor.
    fn record(
        &mut self,
        operands: &mut Vec<OperandNode>,
        kspec: &KeywordSpec,
        value: OperandValue,
        span: Span,
    ) {
        let mut i = 0;
        while i < operands.len() {
            let earlier = &operands[i];
            let repeat = earlier.keyword.eq_ignore_ascii_case(&kspec.name);
            let conflict = kspec
                .excludes
                .iter()
                .any(|e| e.eq_ignore_ascii_case(&earlier.keyword));
            if !repeat && !conflict {
                i += 1;
                continue;
            }
            let earlier = operands.remove(i);
            let message = if repeat {
                format!(
                    "'{}' is specified more than once; the last occurrence takes effect",
                    kspec.name
                )
            } else {
                format!(
                    "'{}' is overridden by the later '{}'",
                    earlier.keyword, kspec.name
                )
            };
            self.diags.push(
                Diagnostic::warn(
                    codes::DUPLICATE_MUTUALLY_EXCLUSIVE,
                    message,
                    Some(earlier.span),
                )
                .with_context(ctx! {
                    "overridden" => earlier.keyword,
                    "survivor" => kspec.name.clone(),
                }),
            );
        }
        operands.push(OperandNode {
            keyword: kspec.name.clone(),
            value,
            span,
            from_default: false,
        });
    }
}
