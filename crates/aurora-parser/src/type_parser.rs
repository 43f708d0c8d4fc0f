//! Type syntax: qualified names with type arguments, function types, and
//! the nullable `?` suffix.

use aurora_lexer::TokenKind;

use crate::ast::{FunctionType, Identifier, Parameter, SimpleType, Type};
use crate::context::Context;
use crate::parser::{ListParser, Parser, ParserExt};
use crate::ParseResult;

/// A single identifier as an [`Identifier`] node.
pub struct IdentifierParser;

impl Parser for IdentifierParser {
    type Output = Identifier;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Identifier> {
        let token = ctx.identifier()?;
        match token.kind {
            TokenKind::Identifier { name, .. } => Ok(Identifier::new(name)),
            _ => Ok(Identifier::new(token.raw)),
        }
    }
}

/// Dot-separated identifiers, `aurora.lang.String`.
pub struct QualifiedNameParser;

impl Parser for QualifiedNameParser {
    type Output = String;

    fn parse(&self, ctx: &mut Context) -> ParseResult<String> {
        let parts = ctx.include(&ListParser::new(IdentifierParser, None, None, Some(".")))?;
        if parts.is_empty() {
            return Err(ctx.unexpected("identifier"));
        }
        Ok(parts
            .into_iter()
            .map(|part| part.name)
            .collect::<Vec<_>>()
            .join("."))
    }
}

pub struct TypeParser;

impl Parser for TypeParser {
    type Output = Type;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Type> {
        let mut ty = ctx.include(
            &FunctionTypeParser
                .map(Type::Function)
                .or(SimpleTypeParser.map(Type::Simple)),
        )?;
        // `T?:` is an elvis operator after the type, not a nullable marker.
        while ctx.at_symbol("?") && !ctx.at_symbol("?:") {
            ctx.symbol("?")?;
            ty = Type::Nullable(Box::new(ty));
        }
        Ok(ty)
    }
}

pub struct SimpleTypeParser;

impl Parser for SimpleTypeParser {
    type Output = SimpleType;

    fn parse(&self, ctx: &mut Context) -> ParseResult<SimpleType> {
        let name = ctx.include(&QualifiedNameParser)?;
        let type_arguments = ctx
            .include(&ListParser::delimited(TypeParser, "<", ">").optional())?
            .unwrap_or_default();
        Ok(SimpleType::new(name, type_arguments))
    }
}

/// `(a: A, b: B) -> R`
pub struct FunctionTypeParser;

impl Parser for FunctionTypeParser {
    type Output = FunctionType;

    fn parse(&self, ctx: &mut Context) -> ParseResult<FunctionType> {
        let parameters = ctx.include(&ListParser::parenthesized(ParameterParser))?;
        ctx.symbol("->")?;
        let return_type = ctx.include(&TypeParser)?;
        Ok(FunctionType {
            parameters,
            return_type: Box::new(return_type),
        })
    }
}

/// `name: Type`
pub struct ParameterParser;

impl Parser for ParameterParser {
    type Output = Parameter;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Parameter> {
        let name = ctx.include(&IdentifierParser)?;
        ctx.punctuation(':')?;
        let parameter_type = ctx.include(&TypeParser)?;
        Ok(Parameter {
            name,
            parameter_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{run, ParseOptions};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Type {
        run(&TypeParser, source, &ParseOptions::default()).unwrap()
    }

    fn simple(name: &str) -> Type {
        Type::Simple(SimpleType::new(name.to_string(), Vec::new()))
    }

    // =========================================================================
    // Simple types
    // =========================================================================

    #[test]
    fn test_simple_type() {
        assert_eq!(parse("Int"), simple("Int"));
    }

    #[test]
    fn test_qualified_type() {
        assert_eq!(parse("aurora.lang.String"), simple("aurora.lang.String"));
    }

    #[test]
    fn test_generic_type() {
        assert_eq!(
            parse("Map<String, List<Int>>"),
            Type::Simple(SimpleType::new(
                "Map",
                vec![
                    simple("String"),
                    Type::Simple(SimpleType::new("List", vec![simple("Int")])),
                ]
            ))
        );
    }

    #[test]
    fn test_unclosed_type_arguments() {
        let err = run(&TypeParser, "List<Int", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.rule, "SimpleType");
    }

    // =========================================================================
    // Nullable and function types
    // =========================================================================

    #[test]
    fn test_nullable_type() {
        assert_eq!(parse("String?"), Type::Nullable(Box::new(simple("String"))));
        assert_eq!(
            parse("String??"),
            Type::Nullable(Box::new(Type::Nullable(Box::new(simple("String")))))
        );
    }

    #[test]
    fn test_function_type() {
        assert_eq!(
            parse("(x: Int, y: Int) -> Bool"),
            Type::Function(FunctionType {
                parameters: vec![
                    Parameter {
                        name: Identifier::new("x"),
                        parameter_type: simple("Int"),
                    },
                    Parameter {
                        name: Identifier::new("y"),
                        parameter_type: simple("Int"),
                    },
                ],
                return_type: Box::new(simple("Bool")),
            })
        );
    }

    #[test]
    fn test_nullable_function_type() {
        let ty = parse("() -> None?");
        // The `?` binds to the return type.
        match ty {
            Type::Function(function) => {
                assert_eq!(*function.return_type, Type::Nullable(Box::new(simple("None"))));
            }
            other => panic!("expected function type, got {other:?}"),
        }
    }

    #[test]
    fn test_function_type_requires_arrow() {
        let err = run(&TypeParser, "(x: Int)", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.rule, "FunctionType");
    }

    #[test]
    fn test_parameter_missing_type() {
        let err = run(&TypeParser, "(x) -> Int", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.rule, "Parameter");
        assert_eq!(err.rule_chain, vec!["FunctionType", "Type"]);
    }
}
