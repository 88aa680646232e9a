//! Presence route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mdc_core::{
    presence::{self, OnlineUser},
    user,
};
use serde::Deserialize;

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub user_id: String,
}

pub async fn list_online_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<OnlineUser>>, ApiError> {
    let online = presence::list_online_users(&state.console).await.map_err(api_error)?;
    Ok(Json(online))
}

/// Heartbeat for a known user.
pub async fn heartbeat(
    State(state): State<AppState>,
    Json(req): Json<HeartbeatRequest>,
) -> Result<StatusCode, ApiError> {
    let user = user::get_user(&state.console, &req.user_id).await.map_err(api_error)?;
    presence::heartbeat(&state.console, &user).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_online_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    presence::remove_online_user(&state.console, &id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
