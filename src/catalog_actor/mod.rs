//! Catalog records: categories, products with their stock, and crafting recipes.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
