//! Call route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mdc_core::call::{
    self,
    model::{Call, CallStatus, NewCall},
};
use serde::Deserialize;

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub crew_id: u32,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: CallStatus,
}

pub async fn list_calls(State(state): State<AppState>) -> Result<Json<Vec<Call>>, ApiError> {
    let calls = call::list_calls(&state.console).await.map_err(api_error)?;
    Ok(Json(calls))
}

pub async fn create_call(
    State(state): State<AppState>,
    Json(req): Json<NewCall>,
) -> Result<(StatusCode, Json<Call>), ApiError> {
    let call = call::create_call(&state.console, req).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(call)))
}

pub async fn assign_crew(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Call>, ApiError> {
    let call = call::assign_crew_to_call(&state.console, &id, req.crew_id)
        .await
        .map_err(api_error)?;
    Ok(Json(call))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Call>, ApiError> {
    let call = call::update_call_status(&state.console, &id, req.status)
        .await
        .map_err(api_error)?;
    Ok(Json(call))
}
