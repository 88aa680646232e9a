//! Raw key-value access to the shared store.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

#[derive(Deserialize, Serialize)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

pub async fn get_value(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let key = query
        .key
        .filter(|k| !k.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "key is required".to_string()))?;

    let value = state
        .console
        .store()
        .get_value(&key)
        .await
        .map_err(|e| api_error(e.into()))?;

    match value {
        Some(value) => Ok((StatusCode::OK, Json(Entry { key, value }))),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(Entry {
                key,
                value: Value::Null,
            }),
        )),
    }
}

/// Upsert one key. Other tabs learn about it through the storage fallback.
pub async fn set_value(
    State(state): State<AppState>,
    Json(entry): Json<Entry>,
) -> Result<Json<Entry>, ApiError> {
    if entry.key.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "key is required".to_string()));
    }
    debug!(key = %entry.key, "Storage upsert");
    state
        .console
        .store()
        .set(&entry.key, &entry.value)
        .await
        .map_err(|e| api_error(e.into()))?;
    Ok(Json(entry))
}
