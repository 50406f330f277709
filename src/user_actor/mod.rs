//! Account records and their uniqueness rules.

pub mod entity;
pub mod error;

pub use error::*;
