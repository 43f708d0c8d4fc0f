use bigdecimal::BigDecimal;

/// Punctuation characters recognised when no custom alphabet is configured.
pub const DEFAULT_PUNCTUATION: &str = "+-*/<>,.;:?()[]{}!%|&=@";

/// A position in source text, tracking line and column for error reporting.
///
/// `start` and `end` are character offsets, not byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Character offsets of every line start, used to turn offsets into line/column pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line and column of a character offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        let (line, column) = self.line_col(start);
        Span::new(start, end, line, column)
    }
}

/// Token classification for Aurora source.
///
/// Data-carrying variants embed their decoded value; the exact source
/// spelling lives in [`Token::raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `name`, or `i"any text"` when `interpolated` is set.
    Identifier { name: String, interpolated: bool },
    String(String),
    Numeric(BigDecimal),
    Punctuation(char),
    Boolean(bool),
    Null,
    Whitespace,
}

impl TokenKind {
    pub fn token_type(&self) -> TokenType {
        match self {
            TokenKind::Identifier { .. } => TokenType::Identifier,
            TokenKind::String(_) => TokenType::String,
            TokenKind::Numeric(_) => TokenType::Numeric,
            TokenKind::Punctuation(_) => TokenType::Punctuation,
            TokenKind::Boolean(_) => TokenType::Boolean,
            TokenKind::Null => TokenType::Null,
            TokenKind::Whitespace => TokenType::Whitespace,
        }
    }
}

/// Payload-free discriminant of [`TokenKind`], used when a parser expects a kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Identifier,
    String,
    Numeric,
    Punctuation,
    Boolean,
    Null,
    Whitespace,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenType::Identifier => "identifier",
            TokenType::String => "string",
            TokenType::Numeric => "number",
            TokenType::Punctuation => "punctuation",
            TokenType::Boolean => "boolean",
            TokenType::Null => "null",
            TokenType::Whitespace => "whitespace",
        };
        f.write_str(name)
    }
}

/// A token produced by the Aurora tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            raw: raw.into(),
            span,
        }
    }

    pub fn token_type(&self) -> TokenType {
        self.kind.token_type()
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace)
    }

    /// True when the token has the given type and spelling.
    pub fn is(&self, token_type: TokenType, raw: &str) -> bool {
        self.token_type() == token_type && self.raw == raw
    }

    pub fn is_punctuation(&self, ch: char) -> bool {
        self.kind == TokenKind::Punctuation(ch)
    }
}
