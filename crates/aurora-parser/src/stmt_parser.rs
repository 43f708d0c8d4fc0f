//! Statements and blocks.

use crate::ast::{Declaration, Statement};
use crate::context::Context;
use crate::decl_parser::{FunctionDeclarationParser, VariableDeclarationParser};
use crate::expr_parser::ExpressionParser;
use crate::parser::{ListParser, Parser, ParserExt};
use crate::ParseResult;

pub struct StatementParser;

impl Parser for StatementParser {
    type Output = Statement;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Statement> {
        ctx.include(
            &EmptyStatementParser
                .or(ReturnStatementParser)
                .or(BlockParser.map(Statement::Block))
                .or(VariableDeclarationParser
                    .map(|variable| Statement::Declaration(Declaration::Variable(variable))))
                .or(FunctionDeclarationParser
                    .map(|function| Statement::Declaration(Declaration::Function(function))))
                .or(ExpressionStatementParser),
        )
    }
}

/// `{ statement* }`
pub struct BlockParser;

impl Parser for BlockParser {
    type Output = Vec<Statement>;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Vec<Statement>> {
        ctx.include(&ListParser::new(
            StatementParser,
            Some("{"),
            Some("}"),
            None,
        ))
    }
}

struct EmptyStatementParser;

impl Parser for EmptyStatementParser {
    type Output = Statement;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Statement> {
        ctx.punctuation(';')?;
        Ok(Statement::Empty)
    }
}

/// `return;` or `return expression;`
struct ReturnStatementParser;

impl Parser for ReturnStatementParser {
    type Output = Statement;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Statement> {
        ctx.keyword("return")?;
        ctx.mark();
        if ctx.try_symbol(";") {
            return Ok(Statement::Return(None));
        }
        let value = ctx.include(&ExpressionParser)?;
        ctx.punctuation(';')?;
        Ok(Statement::Return(Some(value)))
    }
}

struct ExpressionStatementParser;

impl Parser for ExpressionStatementParser {
    type Output = Statement;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Statement> {
        let expression = ctx.include(&ExpressionParser)?;
        ctx.punctuation(';')?;
        Ok(Statement::Expression(expression))
    }
}
