use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::error::Result;
use crate::server::state::AppState;

/// Proxy routes (`/api/proxy`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/:backend", post(forward))
}

/// POST /api/proxy/{backend}
///
/// Relays the body to the active integration of that backend and returns the
/// upstream status and body unchanged.
async fn forward(
    State(state): State<AppState>,
    Path(backend): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let reply = state.forwarder.forward(&backend, body).await?;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response())
}
