use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::prompts::{IssueType, TicketDraft, TranslationDirection};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub integration_id: String,
    #[serde(default)]
    pub text: String,
    pub direction: TranslationDirection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRequest {
    #[serde(default)]
    pub integration_id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub integration_id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    #[serde(default)]
    pub integration_id: String,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default = "default_urgency")]
    pub urgency: u8,
    #[serde(default)]
    pub description: String,
}

fn default_urgency() -> u8 {
    3
}

/// Text produced by a one-shot task
#[derive(Debug, Serialize)]
pub struct TaskOutput {
    pub output: String,
}

/// One-shot task routes (`/api/tasks`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/translate", post(translate))
        .route("/policy", post(policy))
        .route("/ticket/suggestions", post(suggestions))
        .route("/ticket", post(ticket))
}

/// POST /api/tasks/translate
async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TaskOutput>> {
    let output = state
        .controller
        .translate(&req.integration_id, &req.text, req.direction)
        .await?;
    Ok(Json(TaskOutput { output }))
}

/// POST /api/tasks/policy
async fn policy(
    State(state): State<AppState>,
    Json(req): Json<PolicyRequest>,
) -> Result<Json<TaskOutput>> {
    let output = state
        .controller
        .simplify_policy(&req.integration_id, &req.text)
        .await?;
    Ok(Json(TaskOutput { output }))
}

/// POST /api/tasks/ticket/suggestions
async fn suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestionsRequest>,
) -> Result<Json<TaskOutput>> {
    let output = state
        .controller
        .ticket_suggestions(&req.integration_id, &req.description)
        .await?;
    Ok(Json(TaskOutput { output }))
}

/// POST /api/tasks/ticket
async fn ticket(
    State(state): State<AppState>,
    Json(req): Json<TicketRequest>,
) -> Result<Json<TicketDraft>> {
    let draft = state
        .controller
        .draft_ticket(
            &req.integration_id,
            req.issue_type,
            req.urgency,
            &req.description,
        )
        .await?;
    Ok(Json(draft))
}
