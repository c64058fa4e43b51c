//! HTTP API
//!
//! All routes are nested under `/api`; errors are returned as
//! `{"error": "<message>"}` with the status mapped by `WorkbenchError`.

pub mod integrations;
pub mod proxy;
pub mod sessions;
pub mod tasks;

use axum::Router;

use crate::server::state::AppState;
use crate::types::Collection;

/// Build the `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/chatbot", sessions::routes(Collection::Chat))
        .nest("/codegen", sessions::routes(Collection::Codegen))
        .nest("/integrations", integrations::routes())
        .nest("/proxy", proxy::routes())
        .nest("/tasks", tasks::routes())
}

/// `{"message": ...}` acknowledgement body
pub(crate) fn message(text: &str) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": text }))
}
