use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::controller::Exchange;
use crate::error::Result;
use crate::server::state::AppState;
use crate::store::SessionUpdate;
use crate::types::{Collection, Session, TokenSize, Turn};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceSessionRequest {
    #[serde(default)]
    pub messages: Vec<Turn>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub integration_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub token_size: TokenSize,
}

/// Session routes for one collection (`/api/chatbot` or `/api/codegen`).
pub fn routes(collection: Collection) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |state: State<AppState>| list(state, collection)).post(
                move |state: State<AppState>, body: Option<Json<CreateSessionRequest>>| {
                    create(state, collection, body)
                },
            ),
        )
        .route(
            "/:id",
            put(
                move |state: State<AppState>, id: Path<String>, body: Json<ReplaceSessionRequest>| {
                    replace(state, collection, id, body)
                },
            )
            .get(move |state: State<AppState>, id: Path<String>| fetch(state, collection, id))
            .delete(move |state: State<AppState>, id: Path<String>| {
                remove(state, collection, id)
            }),
        )
        .route(
            "/:id/messages",
            post(
                move |state: State<AppState>, id: Path<String>, body: Json<SendMessageRequest>| {
                    send_message(state, collection, id, body)
                },
            ),
        )
}

/// GET /api/{collection}
async fn list(
    State(state): State<AppState>,
    collection: Collection,
) -> Result<Json<serde_json::Value>> {
    let sessions = state.controller.sessions(collection).list().await?;
    Ok(Json(serde_json::json!({ "sessions": sessions })))
}

/// POST /api/{collection}
async fn create(
    State(state): State<AppState>,
    collection: Collection,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<Session>)> {
    let title = body.and_then(|Json(req)| req.title);
    let session = state.controller.sessions(collection).create(title).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/{collection}/{id}
async fn fetch(
    State(state): State<AppState>,
    collection: Collection,
    Path(id): Path<String>,
) -> Result<Json<Session>> {
    Ok(Json(state.controller.sessions(collection).get(&id).await?))
}

/// PUT /api/{collection}/{id}
async fn replace(
    State(state): State<AppState>,
    collection: Collection,
    Path(id): Path<String>,
    Json(req): Json<ReplaceSessionRequest>,
) -> Result<Json<Session>> {
    let update = SessionUpdate {
        turns: req.messages,
        title: req.title,
        expected_version: req.version,
    };
    let session = state
        .controller
        .sessions(collection)
        .replace(&id, update)
        .await?;
    Ok(Json(session))
}

/// DELETE /api/{collection}/{id}
async fn remove(
    State(state): State<AppState>,
    collection: Collection,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.controller.sessions(collection).delete(&id).await?;
    Ok(super::message("Session deleted"))
}

/// POST /api/{collection}/{id}/messages
async fn send_message(
    State(state): State<AppState>,
    collection: Collection,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Exchange>> {
    let exchange = state
        .controller
        .send(
            collection,
            &id,
            &req.integration_id,
            &req.text,
            req.token_size,
        )
        .await?;
    Ok(Json(exchange))
}
