use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartSession {
    pub user_id: Uuid,
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// POST /api/v1/sessions
pub async fn handle_start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSession>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = state.sessions.start(req.user_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/current
pub async fn handle_current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Session>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(state.sessions.validate(token).await?))
}

/// DELETE /api/v1/sessions/current
pub async fn handle_end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers)?;
    state.sessions.end(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
