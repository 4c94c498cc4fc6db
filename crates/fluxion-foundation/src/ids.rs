//! Unique identifiers for dataset entities
//!
//! Fields and coordinates are identified by typed string wrappers.
//! These ensure type safety and provide consistent serialization.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a physical field (e.g., "phi", "Bxy")
    FieldId
);

define_id!(
    /// Unique identifier for a coordinate (e.g., "x", "z")
    CoordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let id = FieldId::from("phi");
        assert_eq!(id.as_str(), "phi");
        assert_eq!(id, "phi");
    }

    #[test]
    fn test_display() {
        let id = CoordId::from("z");
        assert_eq!(format!("{}", id), "z");
    }

    #[test]
    fn test_borrow_lookup() {
        use indexmap::IndexMap;
        let mut map: IndexMap<FieldId, i32> = IndexMap::new();
        map.insert(FieldId::from("n"), 1);
        // Borrow<str> allows lookup without allocating a FieldId
        assert_eq!(map.get("n"), Some(&1));
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = FieldId::from("v_radial");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"v_radial\"");
        let back: FieldId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
