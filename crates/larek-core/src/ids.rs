//! String-backed identifiers.
//!
//! Both ids are assigned by the server; the client only carries them around.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Catalog product id.
    ProductId
);

string_id!(
    /// Id of a confirmed order, as returned by `POST /order`.
    OrderId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("854cef69-976d-4c2a-a18c-2aa45046c390");
        assert_eq!(id.as_str(), "854cef69-976d-4c2a-a18c-2aa45046c390");
    }

    #[test]
    fn test_id_from_string() {
        let id: ProductId = "prod-456".into();
        assert_eq!(id.as_str(), "prod-456");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("o1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"o1\"");

        let parsed: ProductId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(parsed, ProductId::new("42"));
    }
}
