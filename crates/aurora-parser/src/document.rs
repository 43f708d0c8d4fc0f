//! Generic tree serializer.
//!
//! Any [`Node`] renders as a map whose first entry is `"kind"`, followed by
//! the node's properties in order. Nested nodes recurse, node sequences
//! become arrays, absent values become `null`, and numbers are written as
//! JSON numbers carrying every digit of the decimal value.

use std::str::FromStr;

use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};

use crate::node::{Node, Property};

/// Serializable view of a node tree.
#[derive(Clone, Copy)]
pub struct Document<'a>(pub &'a dyn Node);

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let properties = self.0.properties();
        let mut map = serializer.serialize_map(Some(properties.len() + 1))?;
        map.serialize_entry("kind", self.0.kind())?;
        for (name, value) in &properties {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Property<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Property::Null => serializer.serialize_none(),
            Property::Bool(value) => serializer.serialize_bool(*value),
            Property::String(value) => serializer.serialize_str(value),
            Property::Number(value) => Number::from_str(&value.to_string())
                .map_err(S::Error::custom)?
                .serialize(serializer),
            Property::Node(node) => Document(*node).serialize(serializer),
            Property::Nodes(nodes) => serializer.collect_seq(nodes.iter().map(|node| Document(*node))),
        }
    }
}

pub fn to_value(node: &dyn Node) -> serde_json::Result<Value> {
    serde_json::to_value(Document(node))
}

pub fn to_json_string(node: &dyn Node, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(&Document(node))
    } else {
        serde_json::to_string(&Document(node))
    }
}
