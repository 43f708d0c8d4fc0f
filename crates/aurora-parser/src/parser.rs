//! The parser abstraction and the generic combinators built on it.
//!
//! A [`Parser`] consumes tokens from a [`Context`] and yields a typed value.
//! Grammar rules are ordinary parsers: either a type implementing the trait
//! or a closure wrapped with [`rule`]. Combinators ([`Optional`], [`Choice`],
//! [`Map`], [`ListParser`]) compose them and handle backtracking: an
//! uncommitted failure rewinds the cursor, a committed one propagates.

use std::borrow::Cow;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::context::Context;
use crate::error::ErrorKind;
use crate::ParseResult;

/// A unit of grammar.
pub trait Parser {
    type Output;

    /// Consume tokens from `ctx` and produce a value, or fail.
    ///
    /// Implementations call [`Context::mark`] once the input can only be
    /// this construct; from then on failures are not backtracked.
    fn parse(&self, ctx: &mut Context) -> ParseResult<Self::Output>;

    /// Rule name reported in diagnostics. Defaults to the type's simple
    /// name, minus a trailing `Parser`.
    fn name(&self) -> Cow<'_, str> {
        let name = simple_type_name::<Self>();
        Cow::Borrowed(match name.strip_suffix("Parser") {
            Some(stem) if !stem.is_empty() => stem,
            _ => name,
        })
    }

    /// Combinators are left out of rule chains.
    fn is_combinator(&self) -> bool {
        false
    }
}

impl<P: Parser + ?Sized> Parser for &P {
    type Output = P::Output;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Self::Output> {
        (**self).parse(ctx)
    }

    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }

    fn is_combinator(&self) -> bool {
        (**self).is_combinator()
    }
}

impl<P: Parser + ?Sized> Parser for Box<P> {
    type Output = P::Output;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Self::Output> {
        (**self).parse(ctx)
    }

    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }

    fn is_combinator(&self) -> bool {
        (**self).is_combinator()
    }
}

/// `a::b::Thing<c::D>` becomes `Thing`.
pub fn simple_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Fluent combinator constructors for every parser.
pub trait ParserExt: Parser + Sized {
    fn optional(self) -> Optional<Self> {
        Optional::new(self)
    }

    fn or<'a, Q>(self, other: Q) -> Choice<'a, Self::Output>
    where
        Self: 'a,
        Q: Parser<Output = Self::Output> + 'a,
    {
        let first: Box<dyn Parser<Output = Self::Output> + 'a> = Box::new(self);
        Choice::new(vec![first]).or(other)
    }

    fn map<U, F>(self, f: F) -> Map<Self, F, U>
    where
        F: Fn(Self::Output) -> U,
    {
        Map::new(self, f)
    }
}

impl<P: Parser> ParserExt for P {}

// =============================================================================
// Rule
// =============================================================================

/// A named grammar rule backed by a closure.
pub struct Rule<F, T> {
    name: Cow<'static, str>,
    body: F,
    output: PhantomData<fn() -> T>,
}

/// Wrap a closure as a named rule.
pub fn rule<T, F>(name: impl Into<Cow<'static, str>>, body: F) -> Rule<F, T>
where
    F: Fn(&mut Context) -> ParseResult<T>,
{
    Rule {
        name: name.into(),
        body,
        output: PhantomData,
    }
}

impl<T, F> Parser for Rule<F, T>
where
    F: Fn(&mut Context) -> ParseResult<T>,
{
    type Output = T;

    fn parse(&self, ctx: &mut Context) -> ParseResult<T> {
        (self.body)(ctx)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name.as_ref())
    }
}

// =============================================================================
// Optional
// =============================================================================

/// Succeeds with `None` when the inner parser fails without committing,
/// restoring the cursor to where it started.
pub struct Optional<P> {
    parser: P,
}

impl<P: Parser> Optional<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P: Parser> Parser for Optional<P> {
    type Output = Option<P::Output>;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Self::Output> {
        let attempt = ctx.attempt(&self.parser);
        match attempt.result {
            Ok(value) => Ok(Some(value)),
            Err(err) if attempt.committed => Err(err),
            Err(err) => {
                trace!(
                    rule = %self.parser.name(),
                    reason = %err.message,
                    "optional rule absent"
                );
                ctx.set_position(attempt.start);
                Ok(None)
            }
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{}?", self.parser.name()))
    }

    fn is_combinator(&self) -> bool {
        true
    }
}

// =============================================================================
// Choice
// =============================================================================

/// Ordered alternatives. The first success wins; a committed failure stops
/// the search and is reported as-is.
pub struct Choice<'a, T> {
    name: Option<Cow<'static, str>>,
    alternatives: Vec<Box<dyn Parser<Output = T> + 'a>>,
}

/// Build a choice from boxed alternatives.
pub fn choice<'a, T>(alternatives: Vec<Box<dyn Parser<Output = T> + 'a>>) -> Choice<'a, T> {
    Choice::new(alternatives)
}

impl<'a, T> Choice<'a, T> {
    pub fn new(alternatives: Vec<Box<dyn Parser<Output = T> + 'a>>) -> Self {
        Self {
            name: None,
            alternatives,
        }
    }

    /// Append another alternative.
    pub fn or<Q>(mut self, other: Q) -> Self
    where
        Q: Parser<Output = T> + 'a,
    {
        self.alternatives.push(Box::new(other));
        self
    }

    /// Give the choice a rule name, which also makes it visible in rule chains.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn alternative_names(&self) -> Vec<String> {
        self.alternatives
            .iter()
            .map(|alternative| alternative.name().into_owned())
            .collect()
    }
}

impl<T> Parser for Choice<'_, T> {
    type Output = T;

    fn parse(&self, ctx: &mut Context) -> ParseResult<T> {
        let start = ctx.position();

        for alternative in &self.alternatives {
            let attempt = ctx.attempt(alternative.as_ref());
            match attempt.result {
                Ok(value) => return Ok(value),
                Err(err) if attempt.committed => {
                    debug!(
                        rule = %alternative.name(),
                        "committed alternative failed"
                    );
                    return Err(err);
                }
                Err(err) => {
                    trace!(
                        rule = %alternative.name(),
                        reason = %err.message,
                        "alternative rejected"
                    );
                    ctx.set_position(start);
                }
            }
        }

        let alternatives = self.alternative_names();
        let mut err = ctx.error(
            ErrorKind::ExhaustedAlternatives,
            format!(
                "Expected {} but found {}",
                alternatives.join(" or "),
                ctx.describe_next()
            ),
        );
        err.alternatives = alternatives;
        Err(err)
    }

    fn name(&self) -> Cow<'_, str> {
        match &self.name {
            Some(name) => Cow::Borrowed(name.as_ref()),
            None => Cow::Owned(self.alternative_names().join(" | ")),
        }
    }

    fn is_combinator(&self) -> bool {
        self.name.is_none()
    }
}

// =============================================================================
// Map
// =============================================================================

/// Transforms the output of a parser. Runs it in the current frame.
pub struct Map<P, F, U> {
    parser: P,
    f: F,
    output: PhantomData<fn() -> U>,
}

impl<P, F, U> Map<P, F, U>
where
    P: Parser,
    F: Fn(P::Output) -> U,
{
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            output: PhantomData,
        }
    }
}

impl<P, F, U> Parser for Map<P, F, U>
where
    P: Parser,
    F: Fn(P::Output) -> U,
{
    type Output = U;

    fn parse(&self, ctx: &mut Context) -> ParseResult<U> {
        self.parser.parse(ctx).map(&self.f)
    }

    fn name(&self) -> Cow<'_, str> {
        self.parser.name()
    }

    fn is_combinator(&self) -> bool {
        self.parser.is_combinator()
    }
}

// =============================================================================
// Lists
// =============================================================================

/// A delimited, separated sequence of elements.
///
/// Once the opening delimiter is consumed the list is committed. With a
/// closing delimiter, every element is required and a separator directly
/// before the close is accepted. Without one, elements are optional and
/// the list ends at the first element that does not start.
pub struct ListParser<P> {
    element: P,
    open: Option<&'static str>,
    close: Option<&'static str>,
    separator: Option<&'static str>,
}

impl<P: Parser> ListParser<P> {
    pub fn new(
        element: P,
        open: Option<&'static str>,
        close: Option<&'static str>,
        separator: Option<&'static str>,
    ) -> Self {
        Self {
            element,
            open,
            close,
            separator,
        }
    }

    /// `( a, b, c )`
    pub fn parenthesized(element: P) -> Self {
        Self::new(element, Some("("), Some(")"), Some(","))
    }

    /// `open a, b, c close` with arbitrary delimiters.
    pub fn delimited(element: P, open: &'static str, close: &'static str) -> Self {
        Self::new(element, Some(open), Some(close), Some(","))
    }

    /// Elements one after another with no delimiters or separators.
    pub fn bare(element: P) -> Self {
        Self::new(element, None, None, None)
    }

    fn parse_closed(&self, ctx: &mut Context, close: &str) -> ParseResult<Vec<P::Output>> {
        let mut items = Vec::new();
        loop {
            if ctx.try_symbol(close) {
                return Ok(items);
            }
            items.push(ctx.include(&self.element)?);
            if let Some(separator) = self.separator {
                if !ctx.try_symbol(separator) {
                    ctx.symbol(close)?;
                    return Ok(items);
                }
            }
        }
    }

    fn parse_open_ended(&self, ctx: &mut Context) -> ParseResult<Vec<P::Output>> {
        let element = Optional::new(&self.element);
        let mut items = Vec::new();

        let Some(first) = ctx.include(&element)? else {
            return Ok(items);
        };
        items.push(first);

        loop {
            match self.separator {
                Some(separator) => {
                    if !ctx.try_symbol(separator) {
                        return Ok(items);
                    }
                    items.push(ctx.include(&self.element)?);
                }
                None => match ctx.include(&element)? {
                    Some(item) => items.push(item),
                    None => return Ok(items),
                },
            }
        }
    }
}

impl<P: Parser> Parser for ListParser<P> {
    type Output = Vec<P::Output>;

    fn parse(&self, ctx: &mut Context) -> ParseResult<Self::Output> {
        if let Some(open) = self.open {
            ctx.symbol(open)?;
            ctx.mark();
        }
        match self.close {
            Some(close) => self.parse_closed(ctx, close),
            None => self.parse_open_ended(ctx),
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!("List<{}>", self.element.name()))
    }

    fn is_combinator(&self) -> bool {
        true
    }
}
