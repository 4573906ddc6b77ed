//! Property values attached to graph nodes and edges
//!
//! The backend stores properties as JSON and, depending on the endpoint and
//! version, ships them either as an object or as a JSON-encoded string. Both
//! forms decode here; anything malformed degrades to an empty map rather than
//! failing the whole payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered property map; insertion order is the backend's column order and is
/// preserved for tooltips and detail panes
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert an arbitrary JSON value, flattening non-scalars to their
    /// compact JSON text so nothing is lost from display
    pub fn from_json(value: Value) -> PropertyValue {
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Integer(i)
                } else {
                    PropertyValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => PropertyValue::String(s),
            other => PropertyValue::String(other.to_string()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

/// Decode a `properties` payload that may be an object, a JSON-encoded
/// string, null, or absent. Parse failures yield an empty map.
pub fn decode_properties(raw: Option<Value>) -> PropertyMap {
    let value = match raw {
        None | Some(Value::Null) => return PropertyMap::new(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(&encoded) {
            Ok(decoded) => decoded,
            Err(_) => return PropertyMap::new(),
        },
        Some(other) => other,
    };

    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (k, PropertyValue::from_json(v)))
            .collect(),
        _ => PropertyMap::new(),
    }
}
