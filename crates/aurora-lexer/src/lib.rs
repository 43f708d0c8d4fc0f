//! Aurora Lexer
//!
//! Tokenizes Aurora source text into a lazy stream of tokens.
//! Handles multi-base numeric literals, JSON-escaped, raw (`r"…"`) and
//! interpolated identifier (`i"…"`) string literals, block comments and a
//! configurable punctuation alphabet. Whitespace runs are kept as tokens.
//!
//! # Example
//!
//! ```
//! use aurora_lexer::{Tokenizer, TokenKind};
//!
//! let tokens = Tokenizer::tokenize("x").unwrap();
//! assert_eq!(tokens.len(), 1);
//! assert!(matches!(tokens[0].kind, TokenKind::Identifier { .. }));
//! ```

pub mod buffer;
pub mod token;
pub mod tokenizer;


pub use buffer::{EndOfInput, TokenBuffer};
pub use token::{LineIndex, Span, Token, TokenKind, TokenType, DEFAULT_PUNCTUATION};
pub use tokenizer::Tokenizer;

/// Source identifier used when the caller does not name the source.
pub const ANONYMOUS_SOURCE: &str = "<anonymous>";

/// Lexical failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    /// A character that starts no token.
    InvalidSyntax,
    /// Empty digit run after a base prefix, or a malformed decimal.
    InvalidNumericLiteral,
    /// Escape decoding failed, or the literal is unterminated.
    InvalidStringLiteral,
    UnterminatedComment,
}

impl std::fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexer error in {source_id} at line {line}, column {column}: {message}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub message: String,
    pub source_id: String,
    /// Character offset of the failure.
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

/// Tokenizer configuration: how the source is named in diagnostics and
/// which characters form single-character punctuation tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerOptions {
    pub source_id: String,
    pub punctuation: String,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            source_id: ANONYMOUS_SOURCE.to_string(),
            punctuation: DEFAULT_PUNCTUATION.to_string(),
        }
    }
}

impl TokenizerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    pub fn with_punctuation(mut self, punctuation: impl Into<String>) -> Self {
        self.punctuation = punctuation.into();
        self
    }
}
