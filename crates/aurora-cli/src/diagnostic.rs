//! Conversion of parse failures into `miette` diagnostics.

// miette's derive trips unused_assignments on newer rustc.
#![allow(unused_assignments)]

use aurora_parser::{ErrorKind, ParseError};
use miette::{Diagnostic, NamedSource, SourceSpan};

/// A parse or tokenize failure, rendered with a source snippet and the
/// rules that were active when it happened.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(aurora::parse))]
pub struct ParseDiagnostic {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    label: String,
    #[help]
    trace: Option<String>,
}

impl ParseDiagnostic {
    pub fn new(err: &ParseError, source: impl Into<String>) -> Self {
        let source = source.into();
        // Error positions count characters; miette spans count bytes.
        let start = byte_offset(&source, err.position);
        let end = byte_offset(&source, err.position + err.length);

        let trace = if err.kind.is_lexical() {
            None
        } else {
            Some(err.trace())
        };

        Self {
            message: err.message.clone(),
            src: NamedSource::new(&err.source_id, source),
            span: (start, end - start).into(),
            label: label_for(err.kind).to_string(),
            trace,
        }
    }
}

fn label_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidSyntax => "invalid syntax",
        ErrorKind::InvalidNumericLiteral => "invalid number",
        ErrorKind::InvalidStringLiteral => "invalid string",
        ErrorKind::UnterminatedComment => "comment starts here",
        ErrorKind::UnexpectedToken => "unexpected token",
        ErrorKind::UnexpectedEndOfInput => "input ends here",
        ErrorKind::ExhaustedAlternatives => "no alternative matches",
        ErrorKind::InvalidAssignmentTarget => "cannot be assigned",
    }
}

fn byte_offset(source: &str, chars: usize) -> usize {
    source
        .char_indices()
        .nth(chars)
        .map_or(source.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_parser::error::TOKENIZER_RULE;
    use pretty_assertions::assert_eq;

    fn error(kind: ErrorKind, position: usize, length: usize) -> ParseError {
        ParseError {
            kind,
            message: "Unexpected punctuation '?', expected identifier".into(),
            source_id: "main.aurora".into(),
            position,
            length,
            line: 2,
            column: 1,
            rule: "Parameter".into(),
            rule_chain: vec!["FunctionDeclaration".into(), "Program".into()],
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn test_span_from_character_offsets() {
        let source = "val s = \"é\";\n?";
        let diag = ParseDiagnostic::new(&error(ErrorKind::UnexpectedToken, 13, 1), source);
        // `é` takes two bytes, so the `?` at character 13 starts at byte 14.
        assert_eq!(diag.span.offset(), 14);
        assert_eq!(diag.span.len(), 1);
        assert_eq!(diag.label, "unexpected token");
    }

    #[test]
    fn test_span_at_end_of_input() {
        let source = "package demo";
        let diag = ParseDiagnostic::new(&error(ErrorKind::UnexpectedEndOfInput, 12, 0), source);
        assert_eq!(diag.span.offset(), 12);
        assert_eq!(diag.span.len(), 0);
    }

    #[test]
    fn test_help_lists_rule_chain() {
        let diag = ParseDiagnostic::new(&error(ErrorKind::UnexpectedToken, 0, 1), "?");
        assert_eq!(
            diag.trace.as_deref(),
            Some(
                "while parsing Parameter\nwhile parsing FunctionDeclaration\nwhile parsing Program"
            )
        );
        assert_eq!(diag.to_string(), "Unexpected punctuation '?', expected identifier");
    }

    #[test]
    fn test_lexical_error_has_no_trace() {
        let mut err = error(ErrorKind::InvalidNumericLiteral, 0, 1);
        err.rule = TOKENIZER_RULE.into();
        err.rule_chain.clear();
        let diag = ParseDiagnostic::new(&err, "0x");
        assert_eq!(diag.trace, None);
        assert_eq!(diag.label, "invalid number");
    }

    #[test]
    fn test_from_real_parse_failure() {
        let err = aurora_parser::parse("package demo").unwrap_err();
        let diag = ParseDiagnostic::new(&err, "package demo");
        assert_eq!(diag.span.offset(), 12);
        assert_eq!(diag.span.len(), 0);
        assert_eq!(diag.label, "input ends here");
        assert!(diag
            .trace
            .as_deref()
            .is_some_and(|trace| trace.starts_with("while parsing PackageDeclaration")));
    }
}
