//! Attribute values attached to fields and datasets.
//!
//! Attributes carry descriptive metadata (human-readable names, units)
//! and run metadata (grid sizes, guard-cell counts) as string-keyed values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute key holding the human-readable name of a quantity.
pub const LONG_NAME: &str = "long_name";

/// String-keyed attribute map with deterministic iteration order.
pub type Attrs = IndexMap<String, AttrValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Text attribute (e.g., a long name or a unit string).
    Text(String),
    /// Integer attribute (e.g., a grid size or separatrix index).
    Int(i64),
    /// Floating-point attribute (e.g., a normalisation constant).
    Float(f64),
}

impl AttrValue {
    /// Convenience constructor for text attributes.
    pub fn text(s: impl Into<String>) -> Self {
        AttrValue::Text(s.into())
    }

    /// Attempt to get the value as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempt to get the value as an integer.
    ///
    /// Floats are truncated toward zero; run metadata stored as 0-d field
    /// data arrives as floats even when it is logically integral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) => Some(*v as i64),
            AttrValue::Text(_) => None,
        }
    }

    /// Attempt to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Text(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_owned())
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text() {
        let v = AttrValue::text("radial velocity");
        assert_eq!(v.as_text(), Some("radial velocity"));
        assert_eq!(v.as_int(), None);
    }

    #[test]
    fn test_as_int_from_float() {
        assert_eq!(AttrValue::Float(4.0).as_int(), Some(4));
        assert_eq!(AttrValue::Int(7).as_int(), Some(7));
    }

    #[test]
    fn test_as_float_from_int() {
        assert_eq!(AttrValue::Int(3).as_float(), Some(3.0));
    }

    #[test]
    fn test_serde_untagged() {
        let json = serde_json::to_string(&AttrValue::text("core")).unwrap();
        assert_eq!(json, "\"core\"");
        let back: AttrValue = serde_json::from_str("42").unwrap();
        assert_eq!(back, AttrValue::Int(42));
    }
}
