use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;
use serde::Serialize;

use super::{ApiResult, AppState, Json, Path};
use crate::domain::{StatusUpdate, Ticket, TicketCreate};

#[derive(Debug, Serialize)]
struct StatusResponse {
    ticket: Ticket,
    changed: bool,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets/", get(list).post(create))
        .route("/tickets/{id}/", get(detail))
        .route("/tickets/{id}/estado/", put(update_status).patch(update_status))
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Ticket>>> {
    Ok(Json(state.tickets.list().await?))
}

async fn create(
    State(state): State<AppState>,
    Json(params): Json<TicketCreate>,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    let ticket = state.tickets.create(params).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Ticket>> {
    Ok(Json(state.tickets.get_ticket(id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Json<StatusResponse>> {
    let transition = state.tickets.update_status(id, &update.status).await?;
    Ok(Json(StatusResponse {
        ticket: transition.ticket,
        changed: transition.changed,
    }))
}
