//! Abstract Syntax Tree for Aurora.
//!
//! Nodes own their children and are immutable once built. Every type
//! implements [`Node`] by hand; enums report the kind and properties of the
//! variant they hold.

use std::borrow::Cow;

use bigdecimal::BigDecimal;

use crate::node::{Node, Property};

// ---------------------------------------------------------------------------
// Program structure
// ---------------------------------------------------------------------------

/// A complete Aurora source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// File-level `@[...]` annotations preceding the package declaration.
    pub annotations: Vec<AnnotationUsing>,
    pub package: PackageDeclaration,
    pub imports: Vec<ImportDeclaration>,
    /// Top-level declarations; empty declarations (`;`) are dropped.
    pub declarations: Vec<Declaration>,
}

/// `package a.b.c;`
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDeclaration {
    pub name: String,
}

/// `import a.b.C as D;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub name: String,
    pub alias: Option<Identifier>,
}

/// An annotation use: `@[Override]`, `@[Deprecated("use g")]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationUsing {
    pub annotation: SimpleType,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// `name: Type`
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub parameter_type: Type,
}

/// `T` or `T: Bound` in a type parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: Identifier,
    pub bound: Option<Type>,
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
    /// A stray `;`.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::Public,
        Visibility::Private,
        Visibility::Protected,
        Visibility::Internal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
        }
    }
}

/// Function modifier written before `function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionMode {
    Abstract,
    Open,
    Override,
    Native,
    Inline,
}

impl FunctionMode {
    pub const ALL: [FunctionMode; 5] = [
        FunctionMode::Abstract,
        FunctionMode::Open,
        FunctionMode::Override,
        FunctionMode::Native,
        FunctionMode::Inline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionMode::Abstract => "abstract",
            FunctionMode::Open => "open",
            FunctionMode::Override => "override",
            FunctionMode::Native => "native",
            FunctionMode::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub annotations: Vec<AnnotationUsing>,
    pub visibility: Visibility,
    pub mode: Option<FunctionMode>,
    pub type_parameters: Vec<TypeParameter>,
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    /// [`SimpleType::NONE`] when not written.
    pub return_type: Type,
    pub body: FunctionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    /// `= expression;`
    Expression(Expression),
    /// `{ statements }`
    Block(Vec<Statement>),
    /// `;`, a declaration without a body.
    Empty,
}

/// `val x: T = e;` (immutable) or `var x = e;` (mutable).
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub visibility: Visibility,
    pub mutable: bool,
    pub name: Identifier,
    pub type_annotation: Option<Type>,
    pub initializer: Option<Expression>,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Return(Option<Expression>),
    Empty,
    Declaration(Declaration),
    Block(Vec<Statement>),
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    String(String),
    Number(BigDecimal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `42`, `"text"`, `true`, `null`
    Literal(Literal),

    /// `count`
    Identifier(Identifier),

    /// `a + b`, `x in xs`
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },

    /// `!done`, `-x`
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// `f(a, b)`
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// `user.name`
    Member {
        object: Box<Expression>,
        property: Identifier,
    },

    /// `x := 1`, `total += n`
    Assignment {
        target: Box<Expression>,
        op: AssignOp,
        value: Box<Expression>,
    },

    /// `count++`
    Update {
        operand: Box<Expression>,
        op: UpdateOp,
    },

    /// `x is T`, `x !is T`
    Is {
        expression: Box<Expression>,
        target: Type,
        negated: bool,
    },

    /// `x as T`, `x as? T`
    As {
        expression: Box<Expression>,
        target: Type,
        soft: bool,
    },

    /// `(expression)`
    Parenthesized(Box<Expression>),
}

impl Expression {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(Identifier::new(name))
    }

    pub fn binary(left: Expression, op: BinaryOp, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Only names and member accesses can be assigned to or updated.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expression::Identifier(_) | Expression::Member { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Elvis,
    Or,
    And,
    BitOr,
    BitAnd,
    Eq,
    Neq,
    StrictEq,
    StrictNeq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// Matching order: every operator comes before any operator that is a prefix of it.
    pub const ALL: [BinaryOp; 20] = [
        BinaryOp::StrictEq,
        BinaryOp::StrictNeq,
        BinaryOp::Eq,
        BinaryOp::Neq,
        BinaryOp::Lte,
        BinaryOp::Gte,
        BinaryOp::Or,
        BinaryOp::And,
        BinaryOp::Elvis,
        BinaryOp::NotIn,
        BinaryOp::In,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::BitOr,
        BinaryOp::BitAnd,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Elvis => "?:",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNeq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "!in",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    /// Binding strength; all binary operators are left-associative.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Elvis => 1,
            BinaryOp::Or => 2,
            BinaryOp::And => 3,
            BinaryOp::BitOr => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::StrictEq | BinaryOp::StrictNeq => 6,
            BinaryOp::Lt
            | BinaryOp::Lte
            | BinaryOp::Gt
            | BinaryOp::Gte
            | BinaryOp::In
            | BinaryOp::NotIn => 7,
            BinaryOp::Add | BinaryOp::Sub => 8,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 3] = [UnaryOp::Not, UnaryOp::Neg, UnaryOp::Plus];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub const ALL: [UpdateOp; 2] = [UpdateOp::Increment, UpdateOp::Decrement];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    pub const ALL: [AssignOp; 5] = [
        AssignOp::Assign,
        AssignOp::AddAssign,
        AssignOp::SubAssign,
        AssignOp::MulAssign,
        AssignOp::DivAssign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => ":=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Simple(SimpleType),
    /// `T?`
    Nullable(Box<Type>),
    /// `(a: A, b: B) -> R`
    Function(FunctionType),
}

/// A possibly generic named type: `aurora.List<T>`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleType {
    pub name: Cow<'static, str>,
    pub type_arguments: Vec<Type>,
}

impl SimpleType {
    /// Return type of functions that declare none.
    pub const NONE: SimpleType = SimpleType::builtin("aurora.lang.None");
    /// Top of the type hierarchy.
    pub const ANY: SimpleType = SimpleType::builtin("aurora.lang.Any");

    const fn builtin(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            type_arguments: Vec::new(),
        }
    }

    pub fn new(name: impl Into<Cow<'static, str>>, type_arguments: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            type_arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub parameters: Vec<Parameter>,
    pub return_type: Box<Type>,
}

// ---------------------------------------------------------------------------
// Node implementations
// ---------------------------------------------------------------------------

impl Node for Program {
    fn kind(&self) -> &'static str {
        "Program"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("annotations", Property::nodes(&self.annotations)),
            ("package", Property::node(&self.package)),
            ("imports", Property::nodes(&self.imports)),
            ("declarations", Property::nodes(&self.declarations)),
        ]
    }
}

impl Node for PackageDeclaration {
    fn kind(&self) -> &'static str {
        "PackageDeclaration"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![("name", Property::str(&self.name))]
    }
}

impl Node for ImportDeclaration {
    fn kind(&self) -> &'static str {
        "ImportDeclaration"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("name", Property::str(&self.name)),
            ("alias", Property::optional(self.alias.as_ref())),
        ]
    }
}

impl Node for AnnotationUsing {
    fn kind(&self) -> &'static str {
        "AnnotationUsing"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("annotation", Property::node(&self.annotation)),
            ("arguments", Property::nodes(&self.arguments)),
        ]
    }
}

impl Node for Identifier {
    fn kind(&self) -> &'static str {
        "Identifier"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![("name", Property::str(&self.name))]
    }
}

impl Node for Parameter {
    fn kind(&self) -> &'static str {
        "Parameter"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("name", Property::node(&self.name)),
            ("type", Property::node(&self.parameter_type)),
        ]
    }
}

impl Node for TypeParameter {
    fn kind(&self) -> &'static str {
        "TypeParameter"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("name", Property::node(&self.name)),
            ("bound", Property::optional(self.bound.as_ref())),
        ]
    }
}

impl Node for Declaration {
    fn kind(&self) -> &'static str {
        match self {
            Declaration::Function(function) => function.kind(),
            Declaration::Variable(variable) => variable.kind(),
            Declaration::Empty => "EmptyDeclaration",
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        match self {
            Declaration::Function(function) => function.properties(),
            Declaration::Variable(variable) => variable.properties(),
            Declaration::Empty => Vec::new(),
        }
    }
}

impl Node for FunctionDeclaration {
    fn kind(&self) -> &'static str {
        match self.body {
            FunctionBody::Expression(_) => "ExpressionFunctionDeclaration",
            FunctionBody::Block(_) => "BlockFunctionDeclaration",
            FunctionBody::Empty => "EmptyFunctionDeclaration",
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let mut properties = vec![
            ("annotations", Property::nodes(&self.annotations)),
            ("visibility", self.visibility.as_str().into()),
            (
                "mode",
                self.mode.map_or(Property::Null, |mode| mode.as_str().into()),
            ),
            ("typeParameters", Property::nodes(&self.type_parameters)),
            ("name", Property::node(&self.name)),
            ("parameters", Property::nodes(&self.parameters)),
            ("returnType", Property::node(&self.return_type)),
        ];
        match &self.body {
            FunctionBody::Expression(expression) => {
                properties.push(("expression", Property::node(expression)));
            }
            FunctionBody::Block(statements) => {
                properties.push(("body", Property::nodes(statements)));
            }
            FunctionBody::Empty => {}
        }
        properties
    }
}

impl Node for VariableDeclaration {
    fn kind(&self) -> &'static str {
        "VariableDeclaration"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("visibility", self.visibility.as_str().into()),
            ("mutable", self.mutable.into()),
            ("name", Property::node(&self.name)),
            ("type", Property::optional(self.type_annotation.as_ref())),
            ("initializer", Property::optional(self.initializer.as_ref())),
        ]
    }
}

impl Node for Statement {
    fn kind(&self) -> &'static str {
        match self {
            Statement::Expression(_) => "ExpressionStatement",
            Statement::Return(_) => "ReturnStatement",
            Statement::Empty => "EmptyStatement",
            Statement::Declaration(_) => "DeclarationStatement",
            Statement::Block(_) => "BlockStatement",
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        match self {
            Statement::Expression(expression) => vec![("expression", Property::node(expression))],
            Statement::Return(expression) => {
                vec![("expression", Property::optional(expression.as_ref()))]
            }
            Statement::Empty => Vec::new(),
            Statement::Declaration(declaration) => {
                vec![("declaration", Property::node(declaration))]
            }
            Statement::Block(statements) => vec![("body", Property::nodes(statements))],
        }
    }
}

impl Node for Literal {
    fn kind(&self) -> &'static str {
        match self {
            Literal::Null => "NullLiteral",
            Literal::Boolean(_) => "BooleanLiteral",
            Literal::String(_) => "StringLiteral",
            Literal::Number(_) => "NumericLiteral",
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        let value = match self {
            Literal::Null => Property::Null,
            Literal::Boolean(value) => Property::Bool(*value),
            Literal::String(value) => Property::str(value),
            Literal::Number(value) => Property::Number(value),
        };
        vec![("value", value)]
    }
}

impl Node for Expression {
    fn kind(&self) -> &'static str {
        match self {
            Expression::Literal(literal) => literal.kind(),
            Expression::Identifier(identifier) => identifier.kind(),
            Expression::Binary { .. } => "BinaryExpression",
            Expression::Unary { .. } => "UnaryExpression",
            Expression::Call { .. } => "CallExpression",
            Expression::Member { .. } => "MemberExpression",
            Expression::Assignment { .. } => "AssignmentExpression",
            Expression::Update { .. } => "UpdateExpression",
            Expression::Is { .. } => "IsExpression",
            Expression::As { .. } => "AsExpression",
            Expression::Parenthesized(_) => "ParenthesizedExpression",
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        match self {
            Expression::Literal(literal) => literal.properties(),
            Expression::Identifier(identifier) => identifier.properties(),
            Expression::Binary { left, op, right } => vec![
                ("left", Property::node(left.as_ref())),
                ("operator", op.as_str().into()),
                ("right", Property::node(right.as_ref())),
            ],
            Expression::Unary { op, operand } => vec![
                ("operator", op.as_str().into()),
                ("operand", Property::node(operand.as_ref())),
            ],
            Expression::Call { callee, arguments } => vec![
                ("callee", Property::node(callee.as_ref())),
                ("arguments", Property::nodes(arguments)),
            ],
            Expression::Member { object, property } => vec![
                ("object", Property::node(object.as_ref())),
                ("property", Property::node(property)),
            ],
            Expression::Assignment { target, op, value } => vec![
                ("target", Property::node(target.as_ref())),
                ("operator", op.as_str().into()),
                ("value", Property::node(value.as_ref())),
            ],
            Expression::Update { operand, op } => vec![
                ("operand", Property::node(operand.as_ref())),
                ("operator", op.as_str().into()),
            ],
            Expression::Is {
                expression,
                target,
                negated,
            } => vec![
                ("expression", Property::node(expression.as_ref())),
                ("type", Property::node(target)),
                ("negated", (*negated).into()),
            ],
            Expression::As {
                expression,
                target,
                soft,
            } => vec![
                ("expression", Property::node(expression.as_ref())),
                ("type", Property::node(target)),
                ("soft", (*soft).into()),
            ],
            Expression::Parenthesized(expression) => {
                vec![("expression", Property::node(expression.as_ref()))]
            }
        }
    }
}

impl Node for Type {
    fn kind(&self) -> &'static str {
        match self {
            Type::Simple(simple) => simple.kind(),
            Type::Nullable(_) => "NullableType",
            Type::Function(function) => function.kind(),
        }
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        match self {
            Type::Simple(simple) => simple.properties(),
            Type::Nullable(inner) => vec![("type", Property::node(inner.as_ref()))],
            Type::Function(function) => function.properties(),
        }
    }
}

impl Node for SimpleType {
    fn kind(&self) -> &'static str {
        "SimpleType"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("name", Property::str(&self.name)),
            ("typeArguments", Property::nodes(&self.type_arguments)),
        ]
    }
}

impl Node for FunctionType {
    fn kind(&self) -> &'static str {
        "FunctionType"
    }

    fn properties(&self) -> Vec<(&'static str, Property<'_>)> {
        vec![
            ("parameters", Property::nodes(&self.parameters)),
            ("returnType", Property::node(self.return_type.as_ref())),
        ]
    }
}
