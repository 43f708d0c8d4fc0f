//! Aurora Parser
//!
//! A backtracking parser-combinator engine over the token stream from
//! `aurora-lexer`, the Aurora grammar built on it, the syntax tree, and a
//! generic serializer that renders any tree node as a document.
//!
//! ```
//! let program = aurora_parser::parse("package demo; val answer = 42;").unwrap();
//! assert_eq!(program.package.name, "demo");
//! assert_eq!(program.declarations.len(), 1);
//! ```

pub mod ast;
pub mod context;
pub mod decl_parser;
pub mod document;
pub mod error;
pub mod expr_parser;
pub mod node;
pub mod parser;
pub mod stmt_parser;
pub mod type_parser;

use tracing::debug;

pub use ast::{Declaration, Expression, Program, Statement, Type};
pub use aurora_lexer::TokenizerOptions as ParseOptions;
pub use context::{Attempt, Context};
pub use decl_parser::ProgramParser;
pub use document::{to_json_string, to_value, Document};
pub use error::{ErrorKind, ParseError};
pub use node::{Node, Property};
pub use parser::{choice, rule, Choice, ListParser, Map, Optional, Parser, ParserExt, Rule};

pub type ParseResult<T> = Result<T, ParseError>;

/// Tokenize `source`, run `parser` as the root rule, and require that only
/// whitespace follows what it consumed.
pub fn run<P: Parser + ?Sized>(
    parser: &P,
    source: &str,
    options: &ParseOptions,
) -> ParseResult<P::Output> {
    let mut ctx = Context::from_source(source, options)?;
    let output = ctx.include(parser).inspect_err(|err| {
        debug!(
            source_id = %err.source_id,
            rule = %err.rule,
            kind = ?err.kind,
            position = err.position,
            "parse failed"
        );
    })?;
    ctx.finish()?;
    Ok(output)
}

/// Parse a complete Aurora source file.
pub fn parse(source: &str) -> ParseResult<Program> {
    parse_with(source, &ParseOptions::default())
}

pub fn parse_with(source: &str, options: &ParseOptions) -> ParseResult<Program> {
    run(&ProgramParser, source, options)
}
