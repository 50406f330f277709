//! Couriers and the orders they carry.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
