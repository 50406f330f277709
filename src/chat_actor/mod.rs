//! Support chat sessions and their message history.

pub mod entity;
pub mod error;

pub use entity::SessionAction;
pub use error::*;
