//! The contract every syntax tree node fulfils for generic serialization.

use std::borrow::Cow;

use bigdecimal::BigDecimal;

/// A syntax tree node: a stable kind name plus an ordered property list.
pub trait Node {
    fn kind(&self) -> &'static str;

    /// Properties in serialization order. `kind` is not repeated here.
    fn properties(&self) -> Vec<(&'static str, Property<'_>)>;
}

/// A property value borrowed from a node.
pub enum Property<'a> {
    /// Absent optional value.
    Null,
    Bool(bool),
    String(Cow<'a, str>),
    Number(&'a BigDecimal),
    Node(&'a dyn Node),
    Nodes(Vec<&'a dyn Node>),
}

impl<'a> Property<'a> {
    pub fn node(node: &'a dyn Node) -> Self {
        Property::Node(node)
    }

    pub fn nodes<T: Node>(nodes: &'a [T]) -> Self {
        Property::Nodes(nodes.iter().map(|node| node as &dyn Node).collect())
    }

    /// `Null` when absent.
    pub fn optional<T: Node>(node: Option<&'a T>) -> Self {
        match node {
            Some(node) => Property::Node(node),
            None => Property::Null,
        }
    }

    pub fn str(value: &'a str) -> Self {
        Property::String(Cow::Borrowed(value))
    }
}

impl From<bool> for Property<'_> {
    fn from(value: bool) -> Self {
        Property::Bool(value)
    }
}

impl<'a> From<&'a str> for Property<'a> {
    fn from(value: &'a str) -> Self {
        Property::str(value)
    }
}

impl std::fmt::Debug for Property<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Null => f.write_str("Null"),
            Property::Bool(value) => write!(f, "Bool({value})"),
            Property::String(value) => write!(f, "String({value:?})"),
            Property::Number(value) => write!(f, "Number({value})"),
            Property::Node(node) => write!(f, "Node({})", node.kind()),
            Property::Nodes(nodes) => f
                .debug_list()
                .entries(nodes.iter().map(|node| node.kind()))
                .finish(),
        }
    }
}
