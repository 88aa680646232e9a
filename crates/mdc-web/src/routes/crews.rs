//! Crew route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mdc_core::crew::{self, model::Crew, model::CrewStatus};
use serde::Deserialize;

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCrewRequest {
    pub unit_name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCrewRequest {
    pub unit_name: Option<String>,
    pub members: Option<Vec<String>>,
    pub status: Option<CrewStatus>,
    pub location: Option<String>,
}

pub async fn list_crews(State(state): State<AppState>) -> Result<Json<Vec<Crew>>, ApiError> {
    let crews = crew::list_crews(&state.console).await.map_err(api_error)?;
    Ok(Json(crews))
}

pub async fn create_crew(
    State(state): State<AppState>,
    Json(req): Json<CreateCrewRequest>,
) -> Result<(StatusCode, Json<Crew>), ApiError> {
    let crew = crew::create_crew(&state.console, &req.unit_name, req.members)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(crew)))
}

pub async fn update_crew(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<UpdateCrewRequest>,
) -> Result<Json<Crew>, ApiError> {
    let mut updated = crew::get_crew(&state.console, id).await.map_err(api_error)?;

    if req.unit_name.is_some() || req.members.is_some() {
        let unit_name = req.unit_name.unwrap_or(updated.unit_name);
        let members = req.members.unwrap_or(updated.members);
        updated = crew::update_crew(&state.console, id, &unit_name, members)
            .await
            .map_err(api_error)?;
    }
    if let Some(status) = req.status {
        updated = crew::update_crew_status(&state.console, id, status, req.location.as_deref())
            .await
            .map_err(api_error)?;
    }

    Ok(Json(updated))
}

pub async fn delete_crew(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    crew::delete_crew(&state.console, id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
