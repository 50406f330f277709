use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use super::{caller_id, ApiResult, AppState, Json, Path};
use crate::domain::{
    AssignCourierRequest, Courier, CourierContact, CourierCreate, LocationFix, TrackedOrder,
    TrackedOrderCreate, TrackingInfo, TrackingSnapshot,
};

#[derive(Debug, Deserialize)]
struct LocationUpdate {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct LocationUpdated {
    message: &'static str,
    location: Option<LocationFix>,
}

#[derive(Debug, Serialize)]
struct DeliveryResponse {
    order: TrackedOrder,
    changed: bool,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/tracking/couriers/", post(register_courier))
        .route("/tracking/couriers/{id}/location/", post(courier_location))
        .route("/tracking/orders/", post(create_order))
        .route("/tracking/orders/{order_ref}/", get(tracking_info))
        .route("/tracking/orders/{order_ref}/update/", post(order_location))
        .route("/tracking/orders/{order_ref}/assign/", post(assign_courier))
        .route("/tracking/orders/{order_ref}/delivered/", post(mark_delivered))
        .route("/tracking/orders/{order_ref}/locate/", get(locate))
        .route("/tracking/orders/{order_ref}/contact/", get(contact))
}

async fn register_courier(
    State(state): State<AppState>,
    Json(params): Json<CourierCreate>,
) -> ApiResult<(StatusCode, Json<Courier>)> {
    let courier = state.tracking.register_courier(params).await?;
    Ok((StatusCode::CREATED, Json(courier)))
}

async fn courier_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<LocationUpdate>,
) -> ApiResult<Json<LocationUpdated>> {
    let courier = state
        .tracking
        .update_courier_location(id, update.latitude, update.longitude)
        .await?;
    Ok(Json(LocationUpdated {
        message: "Courier location updated",
        location: courier.location,
    }))
}

async fn create_order(
    State(state): State<AppState>,
    Json(params): Json<TrackedOrderCreate>,
) -> ApiResult<(StatusCode, Json<TrackedOrder>)> {
    let order = state.tracking.create_order(params).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn tracking_info(
    State(state): State<AppState>,
    Path(order_ref): Path<String>,
) -> ApiResult<Json<TrackingInfo>> {
    Ok(Json(state.tracking.tracking_info(&order_ref).await?))
}

async fn order_location(
    State(state): State<AppState>,
    Path(order_ref): Path<String>,
    Json(update): Json<LocationUpdate>,
) -> ApiResult<Json<LocationUpdated>> {
    let order = state
        .tracking
        .update_order_location(&order_ref, update.latitude, update.longitude)
        .await?;
    Ok(Json(LocationUpdated {
        message: "Location updated successfully",
        location: order.location,
    }))
}

async fn assign_courier(
    State(state): State<AppState>,
    Path(order_ref): Path<String>,
    Json(request): Json<AssignCourierRequest>,
) -> ApiResult<Json<TrackedOrder>> {
    Ok(Json(state.tracking.assign_courier(&order_ref, request.courier_id).await?))
}

async fn mark_delivered(
    State(state): State<AppState>,
    Path(order_ref): Path<String>,
) -> ApiResult<Json<DeliveryResponse>> {
    let transition = state.tracking.mark_delivered(&order_ref).await?;
    Ok(Json(DeliveryResponse {
        order: transition.order,
        changed: transition.changed,
    }))
}

async fn locate(
    State(state): State<AppState>,
    Path(order_ref): Path<String>,
) -> ApiResult<Json<TrackingSnapshot>> {
    Ok(Json(state.tracking.locate(&order_ref).await?))
}

async fn contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_ref): Path<String>,
) -> ApiResult<Json<CourierContact>> {
    let requester = caller_id(&headers)?;
    Ok(Json(state.tracking.delivery_contact(&order_ref, &requester).await?))
}
