use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{Result, WorkbenchError};
use crate::server::state::AppState;
use crate::types::{Integration, NewIntegration};

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// Integration routes (`/api/integrations`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/active", patch(activate))
        .route("/:id", get(fetch).patch(set_active).delete(remove))
}

/// GET /api/integrations
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Integration>>> {
    Ok(Json(state.controller.registry().list().await?))
}

/// POST /api/integrations
async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewIntegration>,
) -> Result<(StatusCode, Json<Integration>)> {
    let integration = state.controller.registry().create(req).await?;
    Ok((StatusCode::CREATED, Json(integration)))
}

/// GET /api/integrations/{id}
async fn fetch(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Integration>> {
    Ok(Json(state.controller.registry().get(&id).await?))
}

/// PATCH /api/integrations/{id}
async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<serde_json::Value>> {
    state.controller.registry().set_active(&id, req.active).await?;
    Ok(super::message("Integration updated"))
}

/// DELETE /api/integrations/{id}
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.controller.registry().delete(&id).await?;
    Ok(super::message("Integration deleted"))
}

/// PATCH /api/integrations/active
async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<serde_json::Value>> {
    let id = req
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| WorkbenchError::Validation("Missing integration id".to_string()))?;
    state.controller.registry().activate_exclusively(&id).await?;
    Ok(super::message("Active integration updated"))
}
