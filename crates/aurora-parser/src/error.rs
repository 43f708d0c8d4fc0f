//! Parse diagnostics.

use aurora_lexer::{LexErrorKind, LexerError};
use serde::Serialize;

/// Rule name reported for failures raised while tokenizing.
pub const TOKENIZER_RULE: &str = "Tokenizer";

/// Failure categories, lexical and syntactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidSyntax,
    InvalidNumericLiteral,
    InvalidStringLiteral,
    UnterminatedComment,
    /// Wrong kind of token, or wrong spelling where a specific one was required.
    UnexpectedToken,
    UnexpectedEndOfInput,
    /// Every branch of a choice failed without committing.
    ExhaustedAlternatives,
    /// Assignment or update whose left-hand side is not addressable.
    InvalidAssignmentTarget,
}

impl ErrorKind {
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidSyntax
                | ErrorKind::InvalidNumericLiteral
                | ErrorKind::InvalidStringLiteral
                | ErrorKind::UnterminatedComment
        )
    }
}

impl From<LexErrorKind> for ErrorKind {
    fn from(kind: LexErrorKind) -> Self {
        match kind {
            LexErrorKind::InvalidSyntax => ErrorKind::InvalidSyntax,
            LexErrorKind::InvalidNumericLiteral => ErrorKind::InvalidNumericLiteral,
            LexErrorKind::InvalidStringLiteral => ErrorKind::InvalidStringLiteral,
            LexErrorKind::UnterminatedComment => ErrorKind::UnterminatedComment,
        }
    }
}

/// Parser error with position information and the chain of active rules.
///
/// Serializes to `{ kind, message, sourceId, position, rule, ruleChain }`,
/// plus `alternatives` when a choice was exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("Parse error in {source_id} at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub source_id: String,
    /// Character offset of the offending token, or of the end of input.
    pub position: usize,
    #[serde(skip)]
    pub length: usize,
    #[serde(skip)]
    pub line: usize,
    #[serde(skip)]
    pub column: usize,
    /// Innermost rule active at the failure.
    pub rule: String,
    /// Ancestors of `rule`, innermost first.
    pub rule_chain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

impl ParseError {
    /// "while parsing …" lines, innermost rule first.
    pub fn trace(&self) -> String {
        std::iter::once(&self.rule)
            .chain(&self.rule_chain)
            .map(|rule| format!("while parsing {rule}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError {
            kind: err.kind.into(),
            message: err.message,
            source_id: err.source_id,
            position: err.position,
            length: 1,
            line: err.line,
            column: err.column,
            rule: TOKENIZER_RULE.to_string(),
            rule_chain: Vec::new(),
            alternatives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ParseError {
        ParseError {
            kind: ErrorKind::UnexpectedToken,
            message: "Unexpected token ')', expected identifier".into(),
            source_id: "main.aurora".into(),
            position: 12,
            length: 1,
            line: 2,
            column: 4,
            rule: "Parameter".into(),
            rule_chain: vec!["FunctionDeclaration".into(), "Program".into()],
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "Parse error in main.aurora at line 2, column 4: Unexpected token ')', expected identifier"
        );
    }

    #[test]
    fn test_trace() {
        assert_eq!(
            sample().trace(),
            "while parsing Parameter\nwhile parsing FunctionDeclaration\nwhile parsing Program"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "kind": "UnexpectedToken",
                "message": "Unexpected token ')', expected identifier",
                "sourceId": "main.aurora",
                "position": 12,
                "rule": "Parameter",
                "ruleChain": ["FunctionDeclaration", "Program"],
            })
        );
    }

    #[test]
    fn test_from_lexer_error() {
        let err = ParseError::from(LexerError {
            kind: LexErrorKind::InvalidNumericLiteral,
            message: "Invalid numeric literal '0x'".into(),
            source_id: "<anonymous>".into(),
            position: 3,
            line: 1,
            column: 4,
        });
        assert_eq!(err.kind, ErrorKind::InvalidNumericLiteral);
        assert!(err.kind.is_lexical());
        assert_eq!(err.rule, TOKENIZER_RULE);
        assert!(err.rule_chain.is_empty());
    }
}
