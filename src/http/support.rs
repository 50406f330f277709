use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use super::{ApiResult, AppState, Json, Path};
use crate::domain::{ChatMessage, ChatSession, ChatStart, MessageRequest};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/support/chat/", post(start_chat))
        .route("/support/chat/{id}/", get(session))
        .route("/support/chat/{id}/messages/", post(send_message))
        .route("/support/chat/{id}/close/", post(end_chat))
}

async fn start_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatStart>,
) -> ApiResult<Json<ChatSession>> {
    Ok(Json(state.support.start_chat(request.user_id).await?))
}

async fn session(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ChatSession>> {
    Ok(Json(state.support.get_session(id).await?))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let reply = state.support.send_message(id, &request.content).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn end_chat(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ChatSession>> {
    Ok(Json(state.support.end_chat(id).await?))
}
