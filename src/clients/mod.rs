//! Typed clients in front of the resource actors.
//!
//! Each client validates input, talks to one or more actors and publishes
//! domain events. Cross-actor rules live here, never inside an actor.

mod macros;

pub mod catalog_client;
pub mod chat_client;
pub mod checkout_client;
pub mod feedback_client;
pub mod payment_client;
pub mod payment_method_client;
pub mod reset_client;
pub mod ticket_client;
pub mod tracking_client;
pub mod user_client;

pub use catalog_client::CatalogClient;
pub use chat_client::ChatClient;
pub use checkout_client::CheckoutClient;
pub use feedback_client::FeedbackClient;
pub use payment_client::PaymentClient;
pub use payment_method_client::PaymentMethodClient;
pub use reset_client::PasswordResetClient;
pub use ticket_client::TicketClient;
pub use tracking_client::TrackingClient;
pub use user_client::UserClient;
