//! Support tickets and their status lifecycle.

pub mod entity;
pub mod error;

pub use entity::TicketAction;
pub use error::*;
