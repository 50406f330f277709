use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use super::{AppState, Json};

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    version: &'static str,
    /// Seconds since the router was built.
    uptime: u64,
    /// Whether each area's actors still accept requests.
    actors: BTreeMap<&'static str, bool>,
}

impl HealthReport {
    fn new(actors: BTreeMap<&'static str, bool>) -> Self {
        let status = if actors.values().all(|alive| *alive) {
            "up"
        } else {
            "degraded"
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            uptime: START_TIME.elapsed().as_secs(),
            actors,
        }
    }

    fn status_code(&self) -> StatusCode {
        if self.status == "up" {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub(super) fn routes() -> Router<AppState> {
    LazyLock::force(&START_TIME);
    Router::new().route("/health", get(health_handler))
}

fn actor_liveness(state: &AppState) -> BTreeMap<&'static str, bool> {
    BTreeMap::from([
        ("accounts", state.users.is_alive()),
        ("catalog", state.catalog.is_alive()),
        ("checkout", state.checkout.is_alive()),
        ("payments", state.payments.is_alive()),
        ("payment_methods", state.payment_methods.is_alive()),
        ("feedback", state.feedback.is_alive()),
        ("tickets", state.tickets.is_alive()),
        ("tracking", state.tracking.is_alive()),
        ("support", state.support.is_alive()),
    ])
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = HealthReport::new(actor_liveness(&state));

    (
        report.status_code(),
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(report),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_stopped_actor_degrades_the_report() {
        let healthy = HealthReport::new(BTreeMap::from([("catalog", true), ("tickets", true)]));
        assert_eq!((healthy.status, healthy.status_code()), ("up", StatusCode::OK));

        let degraded = HealthReport::new(BTreeMap::from([("catalog", true), ("tickets", false)]));
        assert_eq!(degraded.status, "degraded");
        assert_eq!(degraded.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
