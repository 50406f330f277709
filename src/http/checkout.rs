use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use super::{ApiResult, AppState, Json, Path, Query};
use crate::domain::{AttemptStatus, CheckoutRequest, GatewayCallback, PaymentAttempt};

/// Query string the gateway appends when redirecting back.
#[derive(Debug, Default, Deserialize)]
struct CallbackQuery {
    status: Option<String>,
    session_id: Option<String>,
    error_message: Option<String>,
}

impl From<CallbackQuery> for GatewayCallback {
    fn from(query: CallbackQuery) -> Self {
        Self {
            succeeded: query.status.as_deref() == Some("success"),
            external_id: query.session_id,
            error: query.error_message,
        }
    }
}

#[derive(Debug, Serialize)]
struct CallbackResponse {
    attempt: PaymentAttempt,
    redirect_to: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout/initiate/", post(initiate))
        .route("/checkout/callback/{id}/", get(callback))
        .route("/checkout/success/{id}/", get(success))
        .route("/checkout/failed/{id}/", get(failed))
        .route("/checkout/{id}/cancel/", post(cancel))
}

async fn initiate(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<PaymentAttempt>)> {
    let attempt = state.checkout.initiate(request).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

async fn callback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Json<CallbackResponse>> {
    let attempt = state.checkout.handle_callback(id, query.into()).await?;
    let page = if attempt.status == AttemptStatus::Success {
        "success"
    } else {
        "failed"
    };
    let redirect_to = format!("/checkout/{page}/{}/", attempt.id);
    Ok(Json(CallbackResponse {
        attempt,
        redirect_to,
    }))
}

async fn success(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PaymentAttempt>> {
    Ok(Json(state.checkout.success_view(id).await?))
}

async fn failed(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PaymentAttempt>> {
    Ok(Json(state.checkout.failed_view(id).await?))
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PaymentAttempt>> {
    Ok(Json(state.checkout.cancel(id).await?))
}
