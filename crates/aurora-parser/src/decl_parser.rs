//! Program structure and declarations: package, imports, annotations,
//! functions and variables.

use tracing::debug;

use crate::ast::{
    AnnotationUsing, Declaration, FunctionBody, FunctionDeclaration, FunctionMode,
    ImportDeclaration, PackageDeclaration, Program, SimpleType, Type, TypeParameter,
    VariableDeclaration, Visibility,
};
use crate::context::Context;
use crate::expr_parser::ExpressionParser;
use crate::parser::{ListParser, Parser, ParserExt};
use crate::stmt_parser::BlockParser;
use crate::type_parser::{
    IdentifierParser, ParameterParser, QualifiedNameParser, SimpleTypeParser, TypeParser,
};
use crate::ParseResult;

/// A whole source file.
pub struct ProgramParser;

impl Parser for ProgramParser {
    type Output = Program;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Program> {
        let annotations = ctx
            .include(&AnnotationsParser.optional())?
            .unwrap_or_default();
        let package = ctx.include(&PackageDeclarationParser)?;
        let imports = ctx.include(&ListParser::bare(ImportDeclarationParser))?;

        let mut declarations = Vec::new();
        while ctx.has_next() {
            match ctx.include(&DeclarationParser)? {
                Declaration::Empty => {}
                declaration => declarations.push(declaration),
            }
        }
        debug!(
            package = %package.name,
            imports = imports.len(),
            declarations = declarations.len(),
            "parsed program"
        );

        Ok(Program {
            annotations,
            package,
            imports,
            declarations,
        })
    }
}

/// `package a.b.c;`
pub struct PackageDeclarationParser;

impl Parser for PackageDeclarationParser {
    type Output = PackageDeclaration;

    fn parse(&self, ctx: &mut Context) -> ParseResult<PackageDeclaration> {
        ctx.keyword("package")?;
        ctx.mark();
        let name = ctx.include(&QualifiedNameParser)?;
        ctx.punctuation(';')?;
        Ok(PackageDeclaration { name })
    }
}

/// `import a.b.C;` or `import a.b.C as D;`
pub struct ImportDeclarationParser;

impl Parser for ImportDeclarationParser {
    type Output = ImportDeclaration;

    fn parse(&self, ctx: &mut Context) -> ParseResult<ImportDeclaration> {
        ctx.keyword("import")?;
        ctx.mark();
        let name = ctx.include(&QualifiedNameParser)?;
        let alias = if ctx.try_symbol("as") {
            Some(ctx.include(&IdentifierParser)?)
        } else {
            None
        };
        ctx.punctuation(';')?;
        Ok(ImportDeclaration { name, alias })
    }
}

/// `@[A, B(1, 2)]`
pub struct AnnotationsParser;

impl Parser for AnnotationsParser {
    type Output = Vec<AnnotationUsing>;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Vec<AnnotationUsing>> {
        ctx.include(&ListParser::delimited(AnnotationUsingParser, "@[", "]"))
    }
}

pub struct AnnotationUsingParser;

impl Parser for AnnotationUsingParser {
    type Output = AnnotationUsing;

    fn parse(&self, ctx: &mut Context) -> ParseResult<AnnotationUsing> {
        let annotation = ctx.include(&SimpleTypeParser)?;
        let arguments = ctx
            .include(&ListParser::parenthesized(ExpressionParser).optional())?
            .unwrap_or_default();
        Ok(AnnotationUsing {
            annotation,
            arguments,
        })
    }
}

/// A top-level declaration, or a stray `;`.
pub struct DeclarationParser;

impl Parser for DeclarationParser {
    type Output = Declaration;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Declaration> {
        ctx.include(
            &EmptyDeclarationParser
                .or(FunctionDeclarationParser.map(Declaration::Function))
                .or(VariableDeclarationParser.map(Declaration::Variable)),
        )
    }
}

struct EmptyDeclarationParser;

impl Parser for EmptyDeclarationParser {
    type Output = Declaration;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Declaration> {
        ctx.punctuation(';')?;
        Ok(Declaration::Empty)
    }
}

// =============================================================================
// Modifiers
// =============================================================================

pub struct VisibilityParser;

impl Parser for VisibilityParser {
    type Output = Visibility;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Visibility> {
        match Visibility::ALL
            .into_iter()
            .find(|visibility| ctx.try_symbol(visibility.as_str()))
        {
            Some(visibility) => Ok(visibility),
            None => Err(ctx.unexpected("visibility modifier")),
        }
    }
}

pub struct FunctionModeParser;

impl Parser for FunctionModeParser {
    type Output = FunctionMode;

    fn parse(&self, ctx: &mut Context) -> ParseResult<FunctionMode> {
        match FunctionMode::ALL
            .into_iter()
            .find(|mode| ctx.try_symbol(mode.as_str()))
        {
            Some(mode) => Ok(mode),
            None => Err(ctx.unexpected("function mode")),
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

/// `@[A] private inline function <T> name(x: T): R = body;`
pub struct FunctionDeclarationParser;

impl Parser for FunctionDeclarationParser {
    type Output = FunctionDeclaration;

    fn parse(&self, ctx: &mut Context) -> ParseResult<FunctionDeclaration> {
        let annotations = ctx
            .include(&AnnotationsParser.optional())?
            .unwrap_or_default();
        let visibility = ctx
            .include(&VisibilityParser.optional())?
            .unwrap_or_default();
        let mode = ctx.include(&FunctionModeParser.optional())?;
        ctx.keyword("function")?;
        ctx.mark();

        let type_parameters = ctx
            .include(&ListParser::delimited(TypeParameterParser, "<", ">").optional())?
            .unwrap_or_default();
        let name = ctx.include(&IdentifierParser)?;
        let parameters = ctx.include(&ListParser::parenthesized(ParameterParser))?;
        let return_type = if ctx.try_symbol(":") {
            ctx.include(&TypeParser)?
        } else {
            Type::Simple(SimpleType::NONE)
        };
        let body = ctx.include(
            &ExpressionBodyParser
                .or(BlockParser.map(FunctionBody::Block))
                .or(EmptyBodyParser)
                .named("FunctionBody"),
        )?;

        Ok(FunctionDeclaration {
            annotations,
            visibility,
            mode,
            type_parameters,
            name,
            parameters,
            return_type,
            body,
        })
    }
}

/// `T` or `T: Bound`
pub struct TypeParameterParser;

impl Parser for TypeParameterParser {
    type Output = TypeParameter;

    fn parse(&self, ctx: &mut Context) -> ParseResult<TypeParameter> {
        let name = ctx.include(&IdentifierParser)?;
        let bound = if ctx.try_symbol(":") {
            Some(ctx.include(&TypeParser)?)
        } else {
            None
        };
        Ok(TypeParameter { name, bound })
    }
}

/// `= expression;`
struct ExpressionBodyParser;

impl Parser for ExpressionBodyParser {
    type Output = FunctionBody;

    fn parse(&self, ctx: &mut Context) -> ParseResult<FunctionBody> {
        ctx.punctuation('=')?;
        ctx.mark();
        let expression = ctx.include(&ExpressionParser)?;
        ctx.punctuation(';')?;
        Ok(FunctionBody::Expression(expression))
    }
}

struct EmptyBodyParser;

impl Parser for EmptyBodyParser {
    type Output = FunctionBody;

    fn parse(&self, ctx: &mut Context) -> ParseResult<FunctionBody> {
        ctx.punctuation(';')?;
        Ok(FunctionBody::Empty)
    }
}

// =============================================================================
// Variables
// =============================================================================

/// `val x: T = e;` or `var x = e;`
pub struct VariableDeclarationParser;

impl Parser for VariableDeclarationParser {
    type Output = VariableDeclaration;

    fn parse(&self, ctx: &mut Context) -> ParseResult<VariableDeclaration> {
        let visibility = ctx
            .include(&VisibilityParser.optional())?
            .unwrap_or_default();
        let mutable = if ctx.try_symbol("val") {
            false
        } else {
            ctx.keyword("var")?;
            true
        };
        ctx.mark();

        let name = ctx.include(&IdentifierParser)?;
        let type_annotation = if ctx.try_symbol(":") {
            Some(ctx.include(&TypeParser)?)
        } else {
            None
        };
        let initializer = if ctx.try_symbol("=") {
            Some(ctx.include(&ExpressionParser)?)
        } else {
            None
        };
        ctx.punctuation(';')?;

        Ok(VariableDeclaration {
            visibility,
            mutable,
            name,
            type_annotation,
            initializer,
        })
    }
}
