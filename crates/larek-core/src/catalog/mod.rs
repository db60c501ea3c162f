//! Product catalog module.
//!
//! Contains catalog entries, product details, and categories.

mod category;
mod product;

pub use category::Category;
pub use product::{CatalogEntry, CatalogPage, ProductDetail, NO_DESCRIPTION};
