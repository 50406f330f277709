//! Collaborators the clients depend on: hashing, tokens, mail, gateways and chat routing.

pub mod gateway;
pub mod mailer;
pub mod password;
pub mod reset_token;
pub mod routing;

pub use gateway::*;
pub use mailer::*;
pub use password::*;
pub use reset_token::*;
pub use routing::*;
