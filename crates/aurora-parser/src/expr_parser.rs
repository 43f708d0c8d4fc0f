//! Expression parser for Aurora.
//!
//! Assignment is right-associative and sits on top of the binary operators,
//! which are parsed by precedence climbing over postfix chains
//! (member access, calls, `++`/`--`, `as`, `is`) applied to a primary
//! expression.

use aurora_lexer::{Span, TokenKind};
use tracing::trace;

use crate::ast::{AssignOp, BinaryOp, Expression, Identifier, Literal, Type, UnaryOp, UpdateOp};
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::parser::{ListParser, Parser, ParserExt};
use crate::type_parser::{IdentifierParser, TypeParser};
use crate::ParseResult;

/// Lowest binary precedence; see [`BinaryOp::precedence`].
const MIN_PRECEDENCE: u8 = 1;

/// A full expression, assignments included.
pub struct ExpressionParser;

impl Parser for ExpressionParser {
    type Output = Expression;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Expression> {
        let start = ctx.peek().map(|token| token.span);
        let target = parse_binary(ctx, MIN_PRECEDENCE)?;

        let Some(op) = assignment_operator(ctx) else {
            return Ok(target);
        };
        ctx.mark();
        if !target.is_assignable() {
            return Err(invalid_target(ctx, start, "assignment"));
        }

        let value = ctx.include(self)?;
        Ok(Expression::Assignment {
            target: Box::new(target),
            op,
            value: Box::new(value),
        })
    }
}

fn assignment_operator(ctx: &mut Context) -> Option<AssignOp> {
    AssignOp::ALL
        .into_iter()
        .find(|op| ctx.try_symbol(op.as_str()))
}

fn invalid_target(ctx: &Context, start: Option<Span>, what: &str) -> ParseError {
    let message = format!("Invalid left-hand side in {what}");
    match start {
        Some(span) => ctx.error_at(span, ErrorKind::InvalidAssignmentTarget, message),
        None => ctx.error(ErrorKind::InvalidAssignmentTarget, message),
    }
}

// =============================================================================
// Binary operators
// =============================================================================

fn parse_binary(ctx: &mut Context, min_precedence: u8) -> ParseResult<Expression> {
    let mut left = ctx.include(&PostfixParser)?;
    loop {
        let before = ctx.position();
        let Some(op) = binary_operator(ctx) else {
            break;
        };
        if op.precedence() < min_precedence {
            ctx.set_position(before);
            break;
        }
        ctx.mark();
        trace!(operator = op.as_str(), "binary operator");
        let right = parse_binary(ctx, op.precedence() + 1)?;
        left = Expression::binary(left, op, right);
    }
    Ok(left)
}

/// Consume the binary operator at the cursor, if there is one.
///
/// `+=`, `-=`, `*=` and `/=` are assignments, and `++`/`--` are updates,
/// so an arithmetic operator immediately followed by `=` or by itself is
/// left alone.
fn binary_operator(ctx: &mut Context) -> Option<BinaryOp> {
    let before = ctx.position();
    let op = BinaryOp::ALL
        .into_iter()
        .find(|op| ctx.try_symbol(op.as_str()))?;

    let next = ctx.peek_raw().map(|token| &token.kind);
    let clashes = match op {
        BinaryOp::Add => matches!(next, Some(TokenKind::Punctuation('=' | '+'))),
        BinaryOp::Sub => matches!(next, Some(TokenKind::Punctuation('=' | '-'))),
        BinaryOp::Mul | BinaryOp::Div => matches!(next, Some(TokenKind::Punctuation('='))),
        _ => false,
    };
    if clashes {
        ctx.set_position(before);
        return None;
    }
    Some(op)
}

// =============================================================================
// Postfix chains
// =============================================================================

/// What a postfix part adds to the expression before it.
enum Suffix {
    Member(Identifier),
    Call(Vec<Expression>),
    Update(UpdateOp),
    As { target: Type, soft: bool },
    Is { target: Type, negated: bool },
}

/// A primary expression followed by any number of postfix parts.
pub struct PostfixParser;

impl Parser for PostfixParser {
    type Output = Expression;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Expression> {
        let start = ctx.peek().map(|token| token.span);
        let mut base = ctx.include(&PrimaryParser)?;

        let suffix = MemberSuffixParser
            .or(CallSuffixParser)
            .or(UpdateSuffixParser)
            .or(AsSuffixParser)
            .or(IsSuffixParser)
            .optional();

        while let Some(part) = ctx.include(&suffix)? {
            base = match part {
                Suffix::Member(property) => Expression::Member {
                    object: Box::new(base),
                    property,
                },
                Suffix::Call(arguments) => Expression::Call {
                    callee: Box::new(base),
                    arguments,
                },
                Suffix::Update(op) => {
                    if !base.is_assignable() {
                        return Err(invalid_target(ctx, start, "update"));
                    }
                    Expression::Update {
                        operand: Box::new(base),
                        op,
                    }
                }
                Suffix::As { target, soft } => Expression::As {
                    expression: Box::new(base),
                    target,
                    soft,
                },
                Suffix::Is { target, negated } => Expression::Is {
                    expression: Box::new(base),
                    target,
                    negated,
                },
            };
        }
        Ok(base)
    }
}

/// `.name`
struct MemberSuffixParser;

impl Parser for MemberSuffixParser {
    type Output = Suffix;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Suffix> {
        ctx.punctuation('.')?;
        ctx.mark();
        Ok(Suffix::Member(ctx.include(&IdentifierParser)?))
    }
}

/// `(arguments)`
struct CallSuffixParser;

impl Parser for CallSuffixParser {
    type Output = Suffix;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Suffix> {
        let arguments = ctx.include(&ListParser::parenthesized(ExpressionParser))?;
        Ok(Suffix::Call(arguments))
    }
}

/// `++` or `--`
struct UpdateSuffixParser;

impl Parser for UpdateSuffixParser {
    type Output = Suffix;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Suffix> {
        match UpdateOp::ALL
            .into_iter()
            .find(|op| ctx.try_symbol(op.as_str()))
        {
            Some(op) => {
                ctx.mark();
                Ok(Suffix::Update(op))
            }
            None => Err(ctx.unexpected("'++' or '--'")),
        }
    }
}

/// `as Type` or `as? Type`
struct AsSuffixParser;

impl Parser for AsSuffixParser {
    type Output = Suffix;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Suffix> {
        ctx.keyword("as")?;
        ctx.mark();
        let soft = ctx.try_symbol("?");
        let target = ctx.include(&TypeParser)?;
        Ok(Suffix::As { target, soft })
    }
}

/// `is Type` or `!is Type`
struct IsSuffixParser;

impl Parser for IsSuffixParser {
    type Output = Suffix;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Suffix> {
        let negated = ctx.try_symbol("!is");
        if !negated {
            ctx.keyword("is")?;
        }
        ctx.mark();
        let target = ctx.include(&TypeParser)?;
        Ok(Suffix::Is { target, negated })
    }
}

// =============================================================================
// Primary expressions
// =============================================================================

/// Literal, name, parenthesized expression, or unary operation.
pub struct PrimaryParser;

impl Parser for PrimaryParser {
    type Output = Expression;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Expression> {
        ctx.include(
            &LiteralParser
                .or(IdentifierParser.map(Expression::Identifier))
                .or(ParenthesizedParser)
                .or(UnaryParser),
        )
    }
}

pub struct LiteralParser;

impl Parser for LiteralParser {
    type Output = Expression;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Expression> {
        let literal = match ctx.peek().map(|token| &token.kind) {
            Some(TokenKind::String(value)) => Literal::String(value.clone()),
            Some(TokenKind::Numeric(value)) => Literal::Number(value.clone()),
            Some(TokenKind::Boolean(value)) => Literal::Boolean(*value),
            Some(TokenKind::Null) => Literal::Null,
            _ => return Err(ctx.unexpected("literal")),
        };
        ctx.skip_whitespace();
        ctx.next_token()?;
        Ok(Expression::Literal(literal))
    }
}

/// `( expression )`
pub struct ParenthesizedParser;

impl Parser for ParenthesizedParser {
    type Output = Expression;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Expression> {
        ctx.punctuation('(')?;
        ctx.mark();
        let inner = ctx.include(&ExpressionParser)?;
        ctx.punctuation(')')?;
        Ok(Expression::Parenthesized(Box::new(inner)))
    }
}

/// `!x`, `-x`, `+x`
pub struct UnaryParser;

impl Parser for UnaryParser {
    type Output = Expression;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Expression> {
        let Some(op) = UnaryOp::ALL
            .into_iter()
            .find(|op| ctx.try_symbol(op.as_str()))
        else {
            return Err(ctx.unexpected("expression"));
        };
        ctx.mark();
        let operand = ctx.include(&PostfixParser)?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }
}
