//! System orchestration, configuration, startup, and shutdown logic.

pub mod config;
pub mod error;
pub mod seed;
pub mod store_system;
pub mod tracing;

pub use self::config::*;
pub use self::error::*;
pub use self::seed::*;
pub use self::store_system::*;
pub use self::tracing::*;
