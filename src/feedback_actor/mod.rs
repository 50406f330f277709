//! Delivery orders with their rating state machine, ratings and order comments.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
