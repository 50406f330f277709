use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{caller_id, ApiResult, AppState, Json, Path};
use crate::domain::{PaymentMethod, PaymentRequest, PaymentTransaction, TransactionStatus};

#[derive(Debug, Serialize)]
struct InitiateResponse {
    transaction_id: String,
    status: TransactionStatus,
    message: &'static str,
    gateway_id: Option<String>,
}

/// Body the gateway posts to the confirmation webhook.
#[derive(Debug, Deserialize)]
struct GatewayNotification {
    transaction_id: String,
    status: String,
    #[serde(default)]
    gateway_response: Value,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/initiate/", post(initiate))
        .route("/payments/confirm/", post(gateway_callback))
        .route("/payments/{id}/verify/", post(verify))
        .route("/payments/{id}/refund/", post(refund))
        // GET takes a user id, DELETE a method id.
        .route(
            "/payments/saved_methods/{id}/",
            get(saved_methods).delete(delete_saved_method),
        )
}

async fn initiate(
    State(state): State<AppState>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<InitiateResponse>)> {
    let transaction = state.payments.initiate(request).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(InitiateResponse {
            transaction_id: transaction.id,
            status: transaction.status,
            message: "Payment processed successfully",
            gateway_id: transaction.gateway_id,
        }),
    ))
}

async fn gateway_callback(
    State(state): State<AppState>,
    Json(notification): Json<GatewayNotification>,
) -> ApiResult<Json<PaymentTransaction>> {
    let transaction = state
        .payments
        .handle_callback(
            notification.transaction_id,
            &notification.status,
            notification.gateway_response,
        )
        .await?;
    Ok(Json(transaction))
}

async fn verify(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentTransaction>> {
    Ok(Json(state.payments.confirm(id).await?))
}

async fn refund(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentTransaction>> {
    Ok(Json(state.payments.refund(id).await?))
}

async fn saved_methods(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    Ok(Json(state.payments.saved_methods(&user_id).await?))
}

async fn delete_saved_method(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(method_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller_id(&headers)?;
    state.payments.delete_saved_method(&user_id, method_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
