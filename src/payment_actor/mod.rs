//! Card transactions and saved payment methods.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
