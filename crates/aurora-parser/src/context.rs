//! Parser state shared by every parser taking part in one parse.
//!
//! The context owns the token buffer and a stack of rule frames. The top
//! frame belongs to the parser currently executing, the frames below it are
//! its ancestors. Each frame carries a commit flag ("mark"); when a frame
//! is popped its flag is folded into the parent, so a mark reaches every
//! ancestor by the time they inspect it.

use aurora_lexer::{Span, Token, TokenBuffer, TokenType, Tokenizer, TokenizerOptions};

use crate::error::{ErrorKind, ParseError};
use crate::parser::Parser;
use crate::ParseResult;

/// Rule name reported when no parser is running.
pub const ROOT_RULE: &str = "<root>";

#[derive(Debug, Clone)]
struct Frame {
    rule: String,
    /// Combinators run in frames of their own but stay out of rule chains.
    visible: bool,
    committed: bool,
}

/// Outcome of running a parser through [`Context::attempt`].
#[derive(Debug)]
pub struct Attempt<T> {
    pub result: ParseResult<T>,
    /// Whether the attempt (or anything it ran) marked the state.
    pub committed: bool,
    /// Token position before the attempt, for backtracking.
    pub start: usize,
}

/// Per-parse state: source identifier, token cursor, and the frame stack.
pub struct Context {
    source_id: String,
    tokens: TokenBuffer<Token>,
    end: Span,
    frames: Vec<Frame>,
}

impl Context {
    pub fn new(source_id: impl Into<String>, tokens: Vec<Token>, end: Span) -> Self {
        Self {
            source_id: source_id.into(),
            tokens: TokenBuffer::new(tokens),
            end,
            frames: Vec::new(),
        }
    }

    /// Tokenize `source` up front and build a context over the tokens.
    pub fn from_source(source: &str, options: &TokenizerOptions) -> ParseResult<Self> {
        let mut tokenizer = Tokenizer::with_options(source, options);
        let end = tokenizer.end_span();
        let tokens = tokenizer.by_ref().collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(options.source_id.clone(), tokens, end))
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    // =========================================================================
    // Cursor and commit state
    // =========================================================================

    pub fn position(&self) -> usize {
        self.tokens.position()
    }

    pub fn set_position(&mut self, position: usize) {
        self.tokens.set_position(position);
    }

    /// Flag the running parser, and through it every ancestor, as committed.
    ///
    /// Call right after consuming the token that selects a unique production;
    /// failures after this point are no longer absorbed by `optional` or `choice`.
    pub fn mark(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.committed = true;
        }
    }

    pub fn is_committed(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.committed)
    }

    /// Names of the visible rules currently running, innermost first.
    pub fn rule_chain(&self) -> Vec<&str> {
        self.frames
            .iter()
            .rev()
            .filter(|frame| frame.visible)
            .map(|frame| frame.rule.as_str())
            .collect()
    }

    // =========================================================================
    // Running sub-parsers
    // =========================================================================

    /// Run a sub-parser as a child of the current one. Failures propagate as-is.
    pub fn include<P: Parser + ?Sized>(&mut self, parser: &P) -> ParseResult<P::Output> {
        self.attempt(parser).result
    }

    /// Run a sub-parser in a fresh frame and report whether it committed.
    /// The cursor is left wherever the parser stopped.
    pub fn attempt<P: Parser + ?Sized>(&mut self, parser: &P) -> Attempt<P::Output> {
        let start = self.position();
        self.frames.push(Frame {
            rule: parser.name().into_owned(),
            visible: !parser.is_combinator(),
            committed: false,
        });

        let result = parser.parse(self);

        let committed = self.frames.pop().is_some_and(|frame| frame.committed);
        if committed {
            self.mark();
        }

        Attempt {
            result,
            committed,
            start,
        }
    }

    // =========================================================================
    // Token access
    // =========================================================================

    /// Next token, whitespace included.
    pub fn next_token(&mut self) -> ParseResult<Token> {
        match self.tokens.get() {
            Ok(token) => Ok(token),
            Err(_) => Err(self.error_at(
                self.end,
                ErrorKind::UnexpectedEndOfInput,
                "Unexpected end of input".into(),
            )),
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.tokens.peek().is_some_and(Token::is_whitespace) {
            self.tokens.set_position(self.tokens.position() + 1);
        }
    }

    /// Next significant (non-whitespace) token, without consuming anything.
    pub fn peek(&self) -> Option<&Token> {
        let mut position = self.tokens.position();
        while let Some(token) = self.tokens.get_at(position) {
            if !token.is_whitespace() {
                return Some(token);
            }
            position += 1;
        }
        None
    }

    /// Next token, whitespace included, without consuming it.
    pub fn peek_raw(&self) -> Option<&Token> {
        self.tokens.peek()
    }

    /// True while a significant token remains.
    pub fn has_next(&self) -> bool {
        self.peek().is_some()
    }

    /// Consume a whitespace token at the cursor. When `required`, its absence is an error.
    pub fn whitespace(&mut self, required: bool) -> ParseResult<Option<Token>> {
        if self.tokens.peek().is_some_and(Token::is_whitespace) {
            return self.next_token().map(Some);
        }
        if required {
            return self
                .expect_token(false, TokenType::Whitespace, None)
                .map(Some);
        }
        Ok(None)
    }

    /// Consume the next significant token, which must be of type `token_type`.
    pub fn expect(&mut self, token_type: TokenType) -> ParseResult<Token> {
        self.expect_token(true, token_type, None)
    }

    /// Consume the next significant token, which must have this type and spelling.
    pub fn expect_raw(&mut self, token_type: TokenType, raw: &str) -> ParseResult<Token> {
        self.expect_token(true, token_type, Some(raw))
    }

    pub fn identifier(&mut self) -> ParseResult<Token> {
        self.expect(TokenType::Identifier)
    }

    /// A plain identifier spelled exactly `name`; `i"…"` identifiers never match.
    pub fn keyword(&mut self, name: &str) -> ParseResult<Token> {
        self.expect_raw(TokenType::Identifier, name)
    }

    pub fn punctuation(&mut self, ch: char) -> ParseResult<Token> {
        let mut buf = [0; 4];
        self.expect_raw(TokenType::Punctuation, ch.encode_utf8(&mut buf))
    }

    pub fn numeric(&mut self) -> ParseResult<Token> {
        self.expect(TokenType::Numeric)
    }

    pub fn boolean(&mut self) -> ParseResult<Token> {
        self.expect(TokenType::Boolean)
    }

    /// Consume a symbol made of punctuation characters and identifier runs,
    /// such as `:=`, `!in` or `@[`. Whitespace may precede the symbol but not
    /// separate its parts.
    pub fn symbol(&mut self, text: &str) -> ParseResult<()> {
        for (index, (token_type, raw)) in symbol_parts(text).iter().enumerate() {
            self.expect_token(index == 0, *token_type, Some(raw))?;
        }
        Ok(())
    }

    /// Consume `text` if it comes next; otherwise leave the cursor untouched.
    pub fn try_symbol(&mut self, text: &str) -> bool {
        let start = self.position();
        if self.symbol(text).is_ok() {
            return true;
        }
        self.set_position(start);
        false
    }

    /// Whether `text` comes next. Never consumes.
    pub fn at_symbol(&mut self, text: &str) -> bool {
        let start = self.position();
        let found = self.symbol(text).is_ok();
        self.set_position(start);
        found
    }

    /// Fail unless only whitespace is left.
    pub fn finish(&mut self) -> ParseResult<()> {
        self.skip_whitespace();
        match self.tokens.peek() {
            None => Ok(()),
            Some(token) => Err(self.error_at(
                token.span,
                ErrorKind::UnexpectedToken,
                format!(
                    "Unexpected {} '{}', expected end of input",
                    token.token_type(),
                    token.raw
                ),
            )),
        }
    }

    fn expect_token(
        &mut self,
        skip_whitespace: bool,
        token_type: TokenType,
        raw: Option<&str>,
    ) -> ParseResult<Token> {
        if skip_whitespace {
            self.skip_whitespace();
        }

        let expected = match raw {
            Some(raw) => format!("'{raw}'"),
            None => token_type.to_string(),
        };

        let Some(token) = self.tokens.peek() else {
            return Err(self.error_at(
                self.end,
                ErrorKind::UnexpectedEndOfInput,
                format!("Unexpected end of input, expected {expected}"),
            ));
        };

        if token.token_type() != token_type || raw.is_some_and(|raw| token.raw != raw) {
            return Err(self.error_at(
                token.span,
                ErrorKind::UnexpectedToken,
                format!(
                    "Unexpected {} '{}', expected {expected}",
                    token.token_type(),
                    token.raw
                ),
            ));
        }

        self.next_token()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Build an error located at the next significant token (or end of input).
    pub fn error(&self, kind: ErrorKind, message: String) -> ParseError {
        let span = self.peek().map_or(self.end, |token| token.span);
        self.error_at(span, kind, message)
    }

    pub fn error_at(&self, span: Span, kind: ErrorKind, message: String) -> ParseError {
        let mut chain = self.rule_chain().into_iter().map(str::to_string);
        let rule = chain.next().unwrap_or_else(|| ROOT_RULE.to_string());
        ParseError {
            kind,
            message,
            source_id: self.source_id.clone(),
            position: span.start,
            length: span.len(),
            line: span.line,
            column: span.column,
            rule,
            rule_chain: chain.collect(),
            alternatives: Vec::new(),
        }
    }

    /// Error for a next token that cannot start `expected`.
    pub fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => self.error_at(
                token.span,
                ErrorKind::UnexpectedToken,
                format!(
                    "Unexpected {} '{}', expected {expected}",
                    token.token_type(),
                    token.raw
                ),
            ),
            None => self.error_at(
                self.end,
                ErrorKind::UnexpectedEndOfInput,
                format!("Unexpected end of input, expected {expected}"),
            ),
        }
    }

    /// Description of the next significant token, for messages.
    pub fn describe_next(&self) -> String {
        match self.peek() {
            Some(token) => format!("{} '{}'", token.token_type(), token.raw),
            None => "end of input".to_string(),
        }
    }
}

/// Split a symbol into identifier runs and single punctuation characters.
fn symbol_parts(text: &str) -> Vec<(TokenType, String)> {
    let mut parts: Vec<(TokenType, String)> = Vec::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            match parts.last_mut() {
                Some((TokenType::Identifier, run)) => run.push(ch),
                _ => parts.push((TokenType::Identifier, ch.to_string())),
            }
        } else {
            parts.push((TokenType::Punctuation, ch.to_string()));
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(source: &str) -> Context {
        Context::from_source(source, &TokenizerOptions::default()).unwrap()
    }

    // =========================================================================
    // Token access
    // =========================================================================

    #[test]
    fn test_expect_skips_whitespace() {
        let mut ctx = context("  \n name");
        let token = ctx.identifier().unwrap();
        assert_eq!(token.raw, "name");
        assert!(!ctx.has_next());
    }

    #[test]
    fn test_expect_wrong_type() {
        let mut ctx = context("42");
        let err = ctx.identifier().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert_eq!(err.message, "Unexpected number '42', expected identifier");
        assert_eq!(err.rule, ROOT_RULE);
    }

    #[test]
    fn test_expect_raw_wrong_spelling() {
        let mut ctx = context("import");
        let err = ctx.keyword("package").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert!(err.message.contains("expected 'package'"));
    }

    #[test]
    fn test_keyword_rejects_interpolated_identifier() {
        let mut ctx = context(r#"i"package""#);
        assert!(ctx.keyword("package").is_err());
    }

    #[test]
    fn test_expect_at_end_of_input() {
        let mut ctx = context("a ");
        ctx.identifier().unwrap();
        let err = ctx.identifier().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_symbol_requires_adjacent_parts() {
        let mut ctx = context("x :=");
        ctx.identifier().unwrap();
        assert!(ctx.at_symbol(":="));
        ctx.symbol(":=").unwrap();

        let mut spaced = context(": =");
        assert!(!spaced.try_symbol(":="));
        assert_eq!(spaced.position(), 0);
    }

    #[test]
    fn test_symbol_with_identifier_part() {
        let mut ctx = context("a !in b");
        ctx.identifier().unwrap();
        ctx.symbol("!in").unwrap();
        assert_eq!(ctx.identifier().unwrap().raw, "b");
    }

    #[test]
    fn test_symbol_parts() {
        assert_eq!(
            symbol_parts("!in"),
            vec![
                (TokenType::Punctuation, "!".to_string()),
                (TokenType::Identifier, "in".to_string()),
            ]
        );
        assert_eq!(symbol_parts("@[").len(), 2);
    }

    #[test]
    fn test_whitespace_primitive() {
        let mut ctx = context("a b");
        ctx.identifier().unwrap();
        assert!(ctx.whitespace(true).unwrap().is_some());
        assert!(ctx.whitespace(false).unwrap().is_none());
        assert_eq!(
            ctx.whitespace(true).unwrap_err().kind,
            ErrorKind::UnexpectedToken
        );
    }

    #[test]
    fn test_finish() {
        let mut ctx = context("a  ");
        ctx.identifier().unwrap();
        assert!(ctx.finish().is_ok());

        let mut ctx = context("a b");
        ctx.identifier().unwrap();
        assert!(ctx.finish().is_err());
    }

    #[test]
    fn test_lexer_error_becomes_parse_error() {
        let err = Context::from_source("0x", &TokenizerOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidNumericLiteral);
        assert_eq!(err.rule, crate::error::TOKENIZER_RULE);
    }

    #[test]
    fn test_unexpected() {
        let ctx = context("  )");
        let err = ctx.unexpected("expression");
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert_eq!(err.message, "Unexpected punctuation ')', expected expression");
        assert_eq!(err.position, 2);

        let ctx = context("");
        assert_eq!(
            ctx.unexpected("expression").kind,
            ErrorKind::UnexpectedEndOfInput
        );
    }

    #[test]
    fn test_error_locates_next_significant_token() {
        let ctx = context("\n  oops");
        let err = ctx.error(ErrorKind::UnexpectedToken, "bad".into());
        assert_eq!(err.position, 3);
        assert_eq!((err.line, err.column), (2, 3));
        assert_eq!(err.length, 4);
    }
}
