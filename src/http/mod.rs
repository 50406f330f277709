//! JSON HTTP surface over the clients.

mod accounts;
mod catalog;
mod checkout;
pub mod error;
mod extract;
mod feedback;
mod health;
mod payment_methods;
mod payments;
mod support;
mod tickets;
mod tracking;

use std::ops::Deref;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app_system::StoreSystem;
use crate::clients::{
    CatalogClient, ChatClient, CheckoutClient, FeedbackClient, PasswordResetClient, PaymentClient,
    PaymentMethodClient, TicketClient, TrackingClient, UserClient,
};
pub use error::{ApiError, ApiResult};
pub use extract::{Json, Path, Query};

/// Header carrying the caller's user id. Authentication happens upstream.
pub const USER_ID_HEADER: &str = "x-user-id";

pub struct AppStateInner {
    pub users: UserClient,
    pub password_reset: PasswordResetClient,
    pub catalog: CatalogClient,
    pub checkout: CheckoutClient,
    pub payments: PaymentClient,
    pub payment_methods: PaymentMethodClient,
    pub feedback: FeedbackClient,
    pub tickets: TicketClient,
    pub tracking: TrackingClient,
    pub support: ChatClient,
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(system: &StoreSystem) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users: system.users.clone(),
                password_reset: system.password_reset.clone(),
                catalog: system.catalog.clone(),
                checkout: system.checkout.clone(),
                payments: system.payments.clone(),
                payment_methods: system.payment_methods.clone(),
                feedback: system.feedback.clone(),
                tickets: system.tickets.clone(),
                tracking: system.tracking.clone(),
                support: system.support.clone(),
            }),
        }
    }
}

impl Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(catalog::routes())
        .merge(checkout::routes())
        .merge(payments::routes())
        .merge(payment_methods::routes())
        .merge(feedback::routes())
        .merge(tickets::routes())
        .merge(tracking::routes())
        .merge(support::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reads the caller id from [`USER_ID_HEADER`].
fn caller_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized("Missing X-User-ID header"))
}
