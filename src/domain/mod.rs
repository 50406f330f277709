pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod feedback;
pub mod payment;
pub mod ticket;
pub mod tracking;
pub mod user;

pub use catalog::*;
pub use chat::*;
pub use checkout::*;
pub use feedback::*;
pub use payment::*;
pub use ticket::*;
pub use tracking::*;
pub use user::*;
