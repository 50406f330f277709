use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::Router;

use super::{caller_id, ApiError, ApiResult, AppState, Json, Path};
use crate::domain::{PaymentMethod, PaymentMethodCreate};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-methods/", get(list).post(create))
        .route("/payment-methods/{id}/", delete(remove))
        .route("/payment-methods/{id}/default/", post(set_default))
}

async fn list(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Vec<PaymentMethod>>> {
    let user_id = caller_id(&headers)?;
    Ok(Json(state.payment_methods.list(&user_id).await?))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut params): Json<PaymentMethodCreate>,
) -> ApiResult<(StatusCode, Json<PaymentMethod>)> {
    params.user_id = caller_id(&headers)?;
    state
        .payment_methods
        .create(params)
        .await?
        .map(|method| (StatusCode::CREATED, Json(method)))
        .ok_or_else(|| ApiError::bad_request("Consent is required to store a payment method"))
}

async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = caller_id(&headers)?;
    state.payment_methods.remove(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_default(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentMethod>> {
    let user_id = caller_id(&headers)?;
    Ok(Json(state.payment_methods.set_default(&user_id, id).await?))
}
