//! Parse tree view handed to the field tables.

use crate::location::pointer_from_segments;
use serde_json::{Map, Value};

/// A node of the parsed input together with its JSON pointer.
#[derive(Debug, Clone)]
pub struct ParseNode<'a> {
    value: &'a Value,
    segments: Vec<String>,
}

impl<'a> ParseNode<'a> {
    /// The root of a parsed document
    pub fn root(value: &'a Value) -> Self {
        Self {
            value,
            segments: Vec::new(),
        }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Pointer of this node, e.g. `#/info/license`
    pub fn pointer(&self) -> String {
        pointer_from_segments(self.segments.iter().map(String::as_str))
    }

    /// Pointer of the field `key` under this node
    pub fn pointer_to(&self, key: &str) -> String {
        pointer_from_segments(
            self.segments
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(key)),
        )
    }

    fn descend(&self, segment: String, value: &'a Value) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { value, segments }
    }

    pub fn as_map(&self) -> Option<&'a Map<String, Value>> {
        self.value.as_object()
    }

    pub fn is_map(&self) -> bool {
        self.value.is_object()
    }

    /// Child node under `key`, if this is a map holding it
    pub fn get(&self, key: &str) -> Option<ParseNode<'a>> {
        let value = self.as_map()?.get(key)?;
        Some(self.descend(key.to_string(), value))
    }

    /// Children of a map node with their keys, in document order
    pub fn entries(&self) -> Vec<(&'a str, ParseNode<'a>)> {
        self.as_map()
            .map(|map| {
                map.iter()
                    .map(|(key, value)| (key.as_str(), self.descend(key.clone(), value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Items of a sequence node
    pub fn items(&self) -> Option<Vec<ParseNode<'a>>> {
        let items = self.value.as_array()?;
        Some(
            items
                .iter()
                .enumerate()
                .map(|(index, value)| self.descend(index.to_string(), value))
                .collect(),
        )
    }

    /// Scalar value rendered as a string; `None` for maps, sequences and null
    pub fn as_string(&self) -> Option<String> {
        match self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The `$ref` string of a reference node
    pub fn reference(&self) -> Option<&'a str> {
        self.as_map()?.get("$ref")?.as_str()
    }
}
