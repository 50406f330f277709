use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, ApiResult, AppState, Json, Path};
use crate::domain::{LoginForm, RegistrationForm, UserProfile};
use crate::user_actor::UserError;

#[derive(Debug, Deserialize)]
struct ResetRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct SetPasswordForm {
    new_password: String,
    new_password_confirm: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/register/", post(register))
        .route("/accounts/login/", post(login))
        .route("/authentication/password-reset/", post(request_reset))
        .route(
            "/authentication/password-reset/confirm/{uid}/{token}/",
            post(confirm_reset).get(check_link),
        )
}

async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.users.register(form).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .users
        .authenticate(&form.email, &form.password)
        .await?
        .ok_or(UserError::InvalidCredentials)?;
    Ok(Json(user.profile()))
}

async fn request_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> ApiResult<Json<Value>> {
    state.password_reset.request_reset(&request.email).await?;
    Ok(Json(json!({
        "message": "We have emailed you instructions for setting your password."
    })))
}

async fn check_link(
    State(state): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let valid = state.password_reset.validate_link(&uid, &token).await?;
    Ok(Json(json!({ "valid": valid })))
}

async fn confirm_reset(
    State(state): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
    Json(form): Json<SetPasswordForm>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .password_reset
        .confirm_reset(&uid, &token, &form.new_password, &form.new_password_confirm)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(profile))
}
