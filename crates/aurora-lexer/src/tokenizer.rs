use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::buffer::TokenBuffer;
use crate::token::{LineIndex, Span, Token, TokenKind};
use crate::{LexErrorKind, LexerError, TokenizerOptions};

/// Whitespace seen since the last emitted token.
#[derive(Debug)]
struct PendingWhitespace {
    start: usize,
    end: usize,
    text: String,
}

/// Aurora source tokenizer.
///
/// Produces tokens lazily through [`Iterator`]: each call to `next` lexes
/// exactly one token from a character [`TokenBuffer`]. The sequence is
/// finite and fused; after the first error it yields `None`. Re-tokenizing
/// requires a fresh tokenizer.
///
/// Priority at each position: whitespace accumulation, block comments,
/// `i"…"` identifiers, `r"…"` raw strings, identifiers and keywords, quoted
/// strings, numbers, punctuation.
pub struct Tokenizer {
    buffer: TokenBuffer<char>,
    lines: LineIndex,
    source_id: String,
    punctuation: Vec<char>,
    whitespace: Option<PendingWhitespace>,
    finished: bool,
}

impl Tokenizer {
    /// Create a tokenizer with the default options.
    pub fn new(source: &str) -> Self {
        Self::with_options(source, &TokenizerOptions::default())
    }

    pub fn with_options(source: &str, options: &TokenizerOptions) -> Self {
        Self {
            buffer: TokenBuffer::from_source(source),
            lines: LineIndex::new(source),
            source_id: options.source_id.clone(),
            punctuation: options.punctuation.chars().collect(),
            whitespace: None,
            finished: false,
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
        Tokenizer::new(source).collect()
    }

    pub fn tokenize_with(source: &str, options: &TokenizerOptions) -> Result<Vec<Token>, LexerError> {
        Tokenizer::with_options(source, options).collect()
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Span covering the end of the source, for end-of-input diagnostics.
    pub fn end_span(&self) -> Span {
        let end = self.buffer.len();
        self.lines.span(end, end)
    }

    /// Lex the next token, or `None` once the source is exhausted.
    fn next_token(&mut self) -> Option<Result<Token, LexerError>> {
        loop {
            let Some(ch) = self.peek() else {
                return self.flush_whitespace().map(Ok);
            };

            if ch.is_whitespace() {
                self.push_whitespace(ch);
                continue;
            }

            // Comments vanish without breaking the surrounding whitespace run.
            if ch == '/' && self.peek_next() == Some('*') {
                if let Err(err) = self.skip_block_comment() {
                    return Some(Err(err));
                }
                continue;
            }

            if let Some(whitespace) = self.flush_whitespace() {
                return Some(Ok(whitespace));
            }

            return Some(self.scan_token(ch));
        }
    }

    /// Scan one non-whitespace token starting with `ch`.
    fn scan_token(&mut self, ch: char) -> Result<Token, LexerError> {
        let next = self.peek_next();
        match ch {
            'i' | 'I' if next == Some('"') => self.scan_interpolated_identifier(),
            'r' | 'R' if next == Some('"') => self.scan_raw_string(),
            c if c.is_alphabetic() || c == '_' => Ok(self.scan_identifier()),
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            c if self.punctuation.contains(&c) => {
                let start = self.buffer.position();
                self.advance();
                Ok(self.emit(TokenKind::Punctuation(c), start))
            }
            _ => Err(self.error_at(
                self.buffer.position(),
                LexErrorKind::InvalidSyntax,
                format!("Invalid syntax: unexpected character '{ch}'"),
            )),
        }
    }

    // --- Whitespace and comments ---

    fn push_whitespace(&mut self, ch: char) {
        let position = self.buffer.position();
        self.advance();
        let pending = self.whitespace.get_or_insert_with(|| PendingWhitespace {
            start: position,
            end: position,
            text: String::new(),
        });
        pending.text.push(ch);
        pending.end = position + 1;
    }

    fn flush_whitespace(&mut self) -> Option<Token> {
        let pending = self.whitespace.take()?;
        let span = self.lines.span(pending.start, pending.end);
        trace!(len = pending.text.len(), "whitespace");
        Some(Token::new(TokenKind::Whitespace, pending.text, span))
    }

    /// Skip a `/* … */` comment. Comments do not nest.
    fn skip_block_comment(&mut self) -> Result<(), LexerError> {
        let start = self.buffer.position();
        self.advance();
        self.advance();

        loop {
            if self.buffer.starts_with("*/") {
                self.advance();
                self.advance();
                return Ok(());
            }
            if self.buffer.get().is_err() {
                return Err(self.error_at(
                    start,
                    LexErrorKind::UnterminatedComment,
                    "Unterminated block comment".into(),
                ));
            }
        }
    }

    // --- Strings ---

    /// Consume a `"…"` literal and return its source text, quotes included.
    /// A backslash always takes the following character with it.
    fn scan_string_literal(&mut self) -> Result<String, LexerError> {
        let start = self.buffer.position();
        self.advance(); // consume opening quote

        loop {
            match self.buffer.get() {
                Ok('"') => break,
                Ok('\\') => {
                    if self.buffer.get().is_err() {
                        return Err(self.unterminated_string(start));
                    }
                }
                Ok(_) => {}
                Err(_) => return Err(self.unterminated_string(start)),
            }
        }

        Ok(self.buffer.slice(start, self.buffer.position()))
    }

    /// Decode a quoted literal with JSON escape rules.
    fn decode_string(&self, literal: &str, start: usize) -> Result<String, LexerError> {
        serde_json::from_str::<String>(literal).map_err(|err| {
            self.error_at(
                start,
                LexErrorKind::InvalidStringLiteral,
                format!("Invalid string literal: {literal} ({err})"),
            )
        })
    }

    fn scan_string(&mut self) -> Result<Token, LexerError> {
        let start = self.buffer.position();
        let literal = self.scan_string_literal()?;
        let value = self.decode_string(&literal, start)?;
        Ok(self.emit(TokenKind::String(value), start))
    }

    /// `r"…"`: the body is kept verbatim, `raw` holds its JSON-escaped form.
    fn scan_raw_string(&mut self) -> Result<Token, LexerError> {
        let start = self.buffer.position();
        self.advance(); // consume `r`
        let literal = self.scan_string_literal()?;
        let body: String = literal
            .chars()
            .skip(1)
            .take(literal.chars().count().saturating_sub(2))
            .collect();
        let raw = serde_json::to_string(&body).map_err(|err| {
            self.error_at(
                start,
                LexErrorKind::InvalidStringLiteral,
                format!("Invalid raw string literal: {err}"),
            )
        })?;

        let span = self.lines.span(start, self.buffer.position());
        trace!(raw = %raw, "raw string");
        Ok(Token::new(TokenKind::String(body), raw, span))
    }

    /// `i"…"`: an identifier whose name is any decoded string.
    fn scan_interpolated_identifier(&mut self) -> Result<Token, LexerError> {
        let start = self.buffer.position();
        self.advance(); // consume `i`
        let literal_start = self.buffer.position();
        let literal = self.scan_string_literal()?;
        let name = self.decode_string(&literal, literal_start)?;
        Ok(self.emit(
            TokenKind::Identifier {
                name,
                interpolated: true,
            },
            start,
        ))
    }

    // --- Identifiers ---

    fn scan_identifier(&mut self) -> Token {
        let start = self.buffer.position();
        self.advance();

        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = self.buffer.slice(start, self.buffer.position());
        let kind = match text.as_str() {
            "null" => TokenKind::Null,
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            _ => TokenKind::Identifier {
                name: text,
                interpolated: false,
            },
        };
        self.emit(kind, start)
    }

    // --- Numbers ---

    /// Scan a numeric literal, dispatching on the two-character base prefix.
    fn scan_number(&mut self) -> Result<Token, LexerError> {
        let radix = if self.buffer.starts_with("0x") || self.buffer.starts_with("0X") {
            16
        } else if self.buffer.starts_with("0b") || self.buffer.starts_with("0B") {
            2
        } else if self.buffer.starts_with("0o") || self.buffer.starts_with("0O") {
            8
        } else {
            return self.scan_decimal();
        };

        let start = self.buffer.position();
        self.advance();
        self.advance();

        let digits_start = self.buffer.position();
        while self.peek().is_some_and(|c| c.is_digit(radix)) {
            self.advance();
        }

        let raw = self.buffer.slice(start, self.buffer.position());
        let digits = self.buffer.slice(digits_start, self.buffer.position());
        let value = BigInt::parse_bytes(digits.as_bytes(), radix)
            .map(|integer| BigDecimal::new(integer, 0))
            .ok_or_else(|| {
                self.error_at(
                    start,
                    LexErrorKind::InvalidNumericLiteral,
                    format!("Invalid numeric literal '{raw}': expected digits after the prefix"),
                )
            })?;

        Ok(self.emit(TokenKind::Numeric(value), start))
    }

    /// Decimal literal: digits with at most one `.` and one exponent marker,
    /// which may be followed directly by a sign.
    fn scan_decimal(&mut self) -> Result<Token, LexerError> {
        let start = self.buffer.position();
        let mut seen_dot = false;
        let mut seen_exponent = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.'
                && !seen_dot
                && !seen_exponent
                && self.peek_next().is_some_and(|n| n.is_ascii_digit())
            {
                seen_dot = true;
                self.advance();
            } else if (c == 'e' || c == 'E') && !seen_exponent {
                seen_exponent = true;
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
            } else {
                break;
            }
        }

        let raw = self.buffer.slice(start, self.buffer.position());
        let text = if raw.starts_with('.') {
            format!("0{raw}")
        } else {
            raw.clone()
        };
        let value = BigDecimal::from_str(&text).map_err(|_| {
            self.error_at(
                start,
                LexErrorKind::InvalidNumericLiteral,
                format!("Invalid numeric literal '{raw}'"),
            )
        })?;

        Ok(self.emit(TokenKind::Numeric(value), start))
    }

    // --- Helpers ---

    /// Build a token spanning from `start` to the cursor.
    fn emit(&self, kind: TokenKind, start: usize) -> Token {
        let end = self.buffer.position();
        let raw = self.buffer.slice(start, end);
        trace!(?kind, raw = %raw, "token");
        Token::new(kind, raw, self.lines.span(start, end))
    }

    fn peek(&self) -> Option<char> {
        self.buffer.peek().copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.buffer.get_at(self.buffer.position() + 1).copied()
    }

    fn advance(&mut self) {
        let _ = self.buffer.get();
    }

    fn unterminated_string(&self, start: usize) -> LexerError {
        self.error_at(
            start,
            LexErrorKind::InvalidStringLiteral,
            "Unterminated string literal".into(),
        )
    }

    fn error_at(&self, position: usize, kind: LexErrorKind, message: String) -> LexerError {
        let (line, column) = self.lines.line_col(position);
        debug!(%kind, position, message = %message, "lexer error");
        LexerError {
            kind,
            message,
            source_id: self.source_id.clone(),
            position,
            line,
            column,
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_token();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

impl std::iter::FusedIterator for Tokenizer {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenType;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return token kinds (ignoring spans).
    fn kinds(source: &str) -> Vec<TokenKind> {
        Tokenizer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    /// Helper: tokenize and panic on error.
    fn tokens(source: &str) -> Vec<Token> {
        Tokenizer::tokenize(source).unwrap()
    }

    /// Helper: the single token of a source with no whitespace.
    fn single(source: &str) -> Token {
        let mut toks = tokens(source);
        assert_eq!(toks.len(), 1, "expected one token for {source:?}: {toks:?}");
        toks.remove(0)
    }

    fn error(source: &str) -> LexerError {
        Tokenizer::tokenize(source).unwrap_err()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier {
            name: name.into(),
            interpolated: false,
        }
    }

    fn number(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    fn numeric_value(source: &str) -> BigDecimal {
        match single(source).kind {
            TokenKind::Numeric(value) => value,
            other => panic!("Expected Numeric, got {other:?}"),
        }
    }

    // =========================================================================
    // Structure: empty input, whitespace
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn test_whitespace_between_tokens() {
        assert_eq!(
            kinds("a b"),
            vec![ident("a"), TokenKind::Whitespace, ident("b")]
        );
    }

    #[test]
    fn test_whitespace_run_is_one_token() {
        let toks = tokens("a \n\t\r\n b");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1].kind, TokenKind::Whitespace);
        assert_eq!(toks[1].raw, " \n\t\r\n ");
    }

    #[test]
    fn test_trailing_whitespace_is_kept() {
        let toks = tokens("a  ");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[1].raw, "  ");
        assert_eq!(toks[1].span, Span::new(1, 3, 1, 2));
    }

    #[test]
    fn test_leading_whitespace_only() {
        assert_eq!(kinds("\n\n"), vec![TokenKind::Whitespace]);
    }

    // =========================================================================
    // Block comments
    // =========================================================================

    #[test]
    fn test_comment_vanishes() {
        assert_eq!(kinds("a/* note */b"), vec![ident("a"), ident("b")]);
    }

    #[test]
    fn test_comment_does_not_split_whitespace() {
        let toks = tokens("a /* x */ b");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1].raw, "  ");
    }

    #[test]
    fn test_comment_with_stars() {
        assert_eq!(kinds("/** doc **/x"), vec![ident("x")]);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = error("a /* never closed");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_slash_alone_is_punctuation() {
        assert_eq!(
            kinds("a/b"),
            vec![ident("a"), TokenKind::Punctuation('/'), ident("b")]
        );
    }

    // =========================================================================
    // Identifiers and reserved spellings
    // =========================================================================

    #[test]
    fn test_simple_identifier() {
        let token = single("count");
        assert_eq!(token.kind, ident("count"));
        assert_eq!(token.raw, "count");
    }

    #[test]
    fn test_identifier_with_underscore_and_digits() {
        assert_eq!(kinds("_my_var2"), vec![ident("_my_var2")]);
    }

    #[test]
    fn test_unicode_identifier() {
        assert_eq!(kinds("größe"), vec![ident("größe")]);
    }

    #[test]
    fn test_reserved_literals() {
        assert_eq!(
            kinds("null true false"),
            vec![
                TokenKind::Null,
                TokenKind::Whitespace,
                TokenKind::Boolean(true),
                TokenKind::Whitespace,
                TokenKind::Boolean(false),
            ]
        );
    }

    #[test]
    fn test_reserved_prefix_is_identifier() {
        assert_eq!(kinds("nullable"), vec![ident("nullable")]);
    }

    #[test]
    fn test_identifier_starting_with_i_or_r() {
        assert_eq!(
            kinds("if return"),
            vec![ident("if"), TokenKind::Whitespace, ident("return")]
        );
    }

    // =========================================================================
    // Interpolated identifiers
    // =========================================================================

    #[test]
    fn test_interpolated_identifier() {
        let token = single(r#"i"hello world""#);
        assert_eq!(
            token.kind,
            TokenKind::Identifier {
                name: "hello world".into(),
                interpolated: true,
            }
        );
        assert_eq!(token.raw, r#"i"hello world""#);
    }

    #[test]
    fn test_interpolated_identifier_decodes_escapes() {
        let token = single(r#"I"a\tb""#);
        assert_eq!(
            token.kind,
            TokenKind::Identifier {
                name: "a\tb".into(),
                interpolated: true,
            }
        );
    }

    // =========================================================================
    // Strings
    // =========================================================================

    #[test]
    fn test_string_escape_newline() {
        let token = single("\"a\\nb\"");
        assert_eq!(token.kind, TokenKind::String("a\nb".into()));
        assert_eq!(token.raw, "\"a\\nb\"");
    }

    #[test]
    fn test_string_unicode_escape() {
        assert_eq!(
            kinds(r#""\u0041\"""#),
            vec![TokenKind::String("A\"".into())]
        );
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(kinds(r#""""#), vec![TokenKind::String(String::new())]);
    }

    #[test]
    fn test_string_invalid_escape() {
        let err = error(r#"x = "bad \q""#);
        assert_eq!(err.kind, LexErrorKind::InvalidStringLiteral);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_unterminated_string() {
        let err = error("\"open");
        assert_eq!(err.kind, LexErrorKind::InvalidStringLiteral);
        assert!(err.message.contains("Unterminated"));
    }

    #[test]
    fn test_unterminated_string_after_backslash() {
        assert_eq!(error("\"open\\").kind, LexErrorKind::InvalidStringLiteral);
    }

    #[test]
    fn test_raw_string_keeps_backslashes() {
        let token = single(r#"r"a\nb""#);
        assert_eq!(token.kind, TokenKind::String(r"a\nb".into()));
        assert_eq!(token.raw, r#""a\\nb""#);
    }

    #[test]
    fn test_raw_string_accepts_invalid_json_escapes() {
        let token = single(r#"R"C:\path\q""#);
        assert_eq!(token.kind, TokenKind::String(r"C:\path\q".into()));
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    #[test]
    fn test_integer() {
        assert_eq!(numeric_value("42"), BigDecimal::from(42));
    }

    #[test]
    fn test_decimal_with_exponent() {
        assert_eq!(numeric_value("3.14e2"), BigDecimal::from(314));
    }

    #[test]
    fn test_negative_exponent() {
        assert_eq!(numeric_value("1.5E-3"), number("0.0015"));
    }

    #[test]
    fn test_leading_dot() {
        let token = single(".5");
        assert_eq!(token.kind, TokenKind::Numeric(number("0.5")));
        assert_eq!(token.raw, ".5");
    }

    #[test]
    fn test_decimal_keeps_precision() {
        assert_eq!(
            numeric_value("0.1000000000000000000000000000001"),
            number("0.1000000000000000000000000000001")
        );
    }

    #[test]
    fn test_hex_binary_octal() {
        assert_eq!(numeric_value("0x1F"), BigDecimal::from(31));
        assert_eq!(numeric_value("0XfF"), BigDecimal::from(255));
        assert_eq!(numeric_value("0b101"), BigDecimal::from(5));
        assert_eq!(numeric_value("0o17"), BigDecimal::from(15));
    }

    #[test]
    fn test_prefixed_raw_preserved() {
        assert_eq!(single("0x1F").raw, "0x1F");
    }

    #[test]
    fn test_large_hex_value() {
        assert_eq!(
            numeric_value("0xFFFFFFFFFFFFFFFFFFFF"),
            number("1208925819614629174706175")
        );
    }

    #[test]
    fn test_empty_prefixed_bodies() {
        for source in ["0x", "0b", "0o", "0xg", "0b2"] {
            let err = error(source);
            assert_eq!(err.kind, LexErrorKind::InvalidNumericLiteral, "{source}");
            assert_eq!(err.position, 0);
        }
    }

    #[test]
    fn test_malformed_exponent() {
        assert_eq!(error("1e").kind, LexErrorKind::InvalidNumericLiteral);
        assert_eq!(error("1e+").kind, LexErrorKind::InvalidNumericLiteral);
    }

    #[test]
    fn test_second_dot_ends_number() {
        assert_eq!(
            kinds("1.2.3"),
            vec![
                TokenKind::Numeric(number("1.2")),
                TokenKind::Numeric(number("0.3")),
            ]
        );
    }

    #[test]
    fn test_member_access_on_number() {
        assert_eq!(
            kinds("1.abs"),
            vec![
                TokenKind::Numeric(BigDecimal::from(1)),
                TokenKind::Punctuation('.'),
                ident("abs"),
            ]
        );
    }

    // =========================================================================
    // Punctuation
    // =========================================================================

    #[test]
    fn test_default_punctuation() {
        let toks = tokens(DEFAULT_PUNCTUATION_SAMPLE);
        assert_eq!(toks.len(), DEFAULT_PUNCTUATION_SAMPLE.chars().count());
        assert!(toks.iter().all(|t| t.token_type() == TokenType::Punctuation));
    }

    const DEFAULT_PUNCTUATION_SAMPLE: &str = "+-*<>,;:?()[]{}!%|&=@";

    #[test]
    fn test_invalid_character() {
        let err = error("a # b");
        assert_eq!(err.kind, LexErrorKind::InvalidSyntax);
        assert_eq!(err.position, 2);
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn test_custom_punctuation_alphabet() {
        let options = TokenizerOptions::new().with_punctuation("#");
        let toks = Tokenizer::tokenize_with("#", &options).unwrap();
        assert_eq!(toks[0].kind, TokenKind::Punctuation('#'));

        let err = Tokenizer::tokenize_with("@", &options).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidSyntax);
    }

    // =========================================================================
    // Spans, laziness and diagnostics
    // =========================================================================

    #[test]
    fn test_spans_track_lines() {
        let toks = tokens("package\n  main");
        assert_eq!(toks[0].span, Span::new(0, 7, 1, 1));
        assert_eq!(toks[2].span, Span::new(10, 14, 2, 3));
    }

    #[test]
    fn test_iterator_is_lazy_and_fused() {
        let mut tokenizer = Tokenizer::new("a $ b");
        assert!(matches!(tokenizer.next(), Some(Ok(_))));
        assert!(matches!(tokenizer.next(), Some(Ok(_)))); // whitespace
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert!(tokenizer.next().is_none());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_error_carries_source_id() {
        let options = TokenizerOptions::new().with_source_id("main.aurora");
        let err = Tokenizer::tokenize_with("\n  $", &options).unwrap_err();
        assert_eq!(err.source_id, "main.aurora");
        assert_eq!((err.line, err.column), (2, 3));
        assert!(err.to_string().contains("main.aurora"));
    }

    #[test]
    fn test_end_span() {
        let tokenizer = Tokenizer::new("ab\ncd");
        assert_eq!(tokenizer.end_span(), Span::new(5, 5, 2, 3));
    }
}
