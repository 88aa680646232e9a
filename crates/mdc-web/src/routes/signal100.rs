//! Signal 100 route handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use mdc_core::emergency::{self, model::Signal100};
use serde::Deserialize;

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    pub crew_id: Option<u32>,
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetQuery {
    pub user_id: String,
}

/// The live Signal 100, or `null`.
pub async fn get_signal100(
    State(state): State<AppState>,
) -> Result<Json<Option<Signal100>>, ApiError> {
    let signal = emergency::active_signal100(&state.console).await.map_err(api_error)?;
    Ok(Json(signal))
}

pub async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<Signal100>, ApiError> {
    let signal = emergency::activate_signal100(&state.console, req.crew_id, &req.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(signal))
}

pub async fn reset(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<Option<Signal100>>, ApiError> {
    let signal = emergency::reset_signal100(&state.console, &query.user_id)
        .await
        .map_err(api_error)?;
    Ok(Json(signal))
}
