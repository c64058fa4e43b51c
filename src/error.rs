//! Error types for a3s-workbench

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur in the workbench
#[derive(Debug, Error)]
pub enum WorkbenchError {
    /// Missing or invalid required field
    #[error("{0}")]
    Validation(String),

    /// Unknown integration, session, or proxy backend
    #[error("{0}")]
    NotFound(String),

    /// Optimistic concurrency check failed
    #[error("Session '{id}' was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    /// Upstream inference call failed or returned an unusable body
    #[error("{}", inference_message(.backend, .status, .body))]
    Inference {
        backend: String,
        status: Option<u16>,
        body: String,
    },

    /// Proxy could not reach the upstream endpoint
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup or runtime failure
    #[error("Server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML deserialization error
    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

fn inference_message(backend: &str, status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("{} API error: HTTP {}: {}", backend, code, body),
        None => body.to_string(),
    }
}

impl WorkbenchError {
    /// HTTP status this error maps to at the API boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkbenchError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkbenchError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkbenchError::Conflict { .. } => StatusCode::CONFLICT,
            WorkbenchError::Inference { .. } | WorkbenchError::Upstream(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for workbench operations
pub type Result<T> = std::result::Result<T, WorkbenchError>;

impl IntoResponse for WorkbenchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
        }

        let message = match &self {
            // Internal details stay in the server log
            WorkbenchError::Io(_)
            | WorkbenchError::Serialization(_)
            | WorkbenchError::Http(_)
            | WorkbenchError::TomlDe(_)
            | WorkbenchError::TomlSer(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}
