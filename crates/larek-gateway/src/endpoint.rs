//! API endpoints and their defaults.

use std::fmt;

/// Endpoints of the storefront API.
///
/// Each endpoint carries its own retry default. Reads are safe to repeat;
/// order submission is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /product`
    Catalog,
    /// `GET /product/{id}`
    Item,
    /// `POST /order`
    Order,
}

impl Endpoint {
    /// Get the default max retries for this endpoint.
    pub fn default_max_retries(&self) -> u32 {
        match self {
            Self::Catalog => 2,
            Self::Item => 1,
            Self::Order => 0,
        }
    }

    /// Check if a request to this endpoint may be sent more than once.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Order)
    }

    /// Get the name of this endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Item => "item",
            Self::Order => "order",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
