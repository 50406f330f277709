use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::{ApiResult, AppState, Json, Path, Query};
use crate::domain::{
    CommentRequest, DeliveryOrder, DeliveryOrderCreate, OrderComment, RatingOutcome, RatingRequest,
    RatingSummary,
};

#[derive(Debug, Default, Deserialize)]
struct OrderFilter {
    customer_id: Option<String>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/feedback/orders/", get(list_orders).post(create_order))
        .route("/feedback/orders/{id}/delivered/", post(mark_delivered))
        .route("/feedback/orders/{id}/cancel/", post(cancel_order))
        .route("/feedback/orders/{id}/rating/", post(rate).get(summary))
        .route("/feedback/orders/{id}/rating/skip/", post(skip))
        .route("/feedback/orders/{id}/comments/", get(list_comments).post(add_comment))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Vec<DeliveryOrder>>> {
    Ok(Json(state.feedback.list_orders(filter.customer_id.as_deref()).await?))
}

async fn create_order(
    State(state): State<AppState>,
    Json(params): Json<DeliveryOrderCreate>,
) -> ApiResult<(StatusCode, Json<DeliveryOrder>)> {
    let order = state.feedback.create_order(params).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn mark_delivered(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeliveryOrder>> {
    Ok(Json(state.feedback.mark_delivered(id).await?))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeliveryOrder>> {
    Ok(Json(state.feedback.cancel_order(id).await?))
}

/// Failures come back as an outcome with `success: false` and status 400.
async fn rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RatingRequest>,
) -> (StatusCode, Json<RatingOutcome>) {
    outcome(state.feedback.rate(id, request).await)
}

async fn skip(State(state): State<AppState>, Path(id): Path<String>) -> (StatusCode, Json<RatingOutcome>) {
    outcome(state.feedback.skip(id).await)
}

fn outcome(outcome: RatingOutcome) -> (StatusCode, Json<RatingOutcome>) {
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(outcome))
}

async fn summary(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<RatingSummary>> {
    Ok(Json(state.feedback.rating_summary(id).await?))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<OrderComment>>> {
    Ok(Json(state.feedback.list_comments(id).await?))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<OrderComment>)> {
    let comment = state.feedback.add_comment(id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
