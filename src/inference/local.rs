//! Local (Ollama-style) backend

use super::Backend;
use crate::error::{Result, WorkbenchError};
use crate::types::{Integration, IntegrationKind};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Model requested when none is configured
pub const DEFAULT_LOCAL_MODEL: &str = "mistral";

const NO_RESPONSE: &str = "No response from Ollama API.";

/// `1. `, `12.\t`: numbered-list markers that get their own line
fn list_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+\.\s)").expect("valid regex"))
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
}

/// Calls `<endpoint>/api/generate` directly
pub struct LocalBackend {
    client: reqwest::Client,
    model: String,
}

impl LocalBackend {
    pub fn new(client: reqwest::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        integration: &Integration,
        prompt: &str,
        _max_tokens: Option<u32>,
    ) -> Result<String> {
        let backend = IntegrationKind::Local.backend_name();
        let url = format!("{}/api/generate", integration.base_url());
        let payload = serde_json::json!({ "model": self.model, "prompt": prompt });

        tracing::debug!(url = %url, "POST generate");
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WorkbenchError::Inference {
                backend: backend.to_string(),
                status: None,
                body: format!("Failed to reach {} API: {}", backend, e.without_url()),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| WorkbenchError::Inference {
            backend: backend.to_string(),
            status: None,
            body: format!("Failed to read {} response: {}", backend, e.without_url()),
        })?;
        tracing::debug!(url = %url, status = status.as_u16(), "Generate responded");

        if !status.is_success() {
            return Err(WorkbenchError::Inference {
                backend: backend.to_string(),
                status: Some(status.as_u16()),
                body: text,
            });
        }

        Ok(parse_generate_stream(&text))
    }
}

/// Join the `response` fields of a newline-delimited JSON stream
///
/// Blank lines are ignored and lines that fail to parse are skipped. Numbered
/// list markers are moved onto their own line, and an empty result becomes a
/// fixed fallback message.
pub fn parse_generate_stream(body: &str) -> String {
    let mut reply = String::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<GenerateChunk>(line) {
            Ok(chunk) => reply.push_str(&chunk.response),
            Err(e) => tracing::warn!(error = %e, "Skipping unparseable generate line"),
        }
    }

    let formatted = list_marker_regex().replace_all(&reply, "\n$1");
    let formatted = formatted.trim();
    if formatted.is_empty() {
        NO_RESPONSE.to_string()
    } else {
        formatted.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn test_parse_concatenates_parts() {
        let body = "{\"response\":\"Hel\"}\n{\"response\":\"lo\"}\n";
        assert_eq!(parse_generate_stream(body), "Hello");
    }

    #[test]
    fn test_parse_skips_blank_and_bad_lines() {
        let body = "\n{\"response\":\"a\"}\n\nnot json\n{\"done\":true}\n{\"response\":\"b\"}";
        assert_eq!(parse_generate_stream(body), "ab");
    }

    #[test]
    fn test_parse_formats_numbered_lists() {
        let body = "{\"response\":\"Steps: 1. open 2. close\"}";
        assert_eq!(parse_generate_stream(body), "Steps: \n1. open \n2. close");
    }

    #[test]
    fn test_parse_empty_is_fallback() {
        assert_eq!(parse_generate_stream(""), "No response from Ollama API.");
        assert_eq!(
            parse_generate_stream("{\"response\":\"   \"}"),
            "No response from Ollama API."
        );
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn local(endpoint: String) -> Integration {
        Integration {
            id: "1".to_string(),
            name: "Box".to_string(),
            kind: IntegrationKind::Local,
            endpoint,
            credential: String::new(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_generate_against_upstream() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["model"], "mistral");
                let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                format!(
                    "{}\n{}\n",
                    serde_json::json!({"response": "echo: "}),
                    serde_json::json!({"response": prompt})
                )
            }),
        );
        let endpoint = spawn(app).await;
        let backend = LocalBackend::new(reqwest::Client::new(), DEFAULT_LOCAL_MODEL);

        let reply = backend
            .generate(&local(endpoint), "ping", None)
            .await
            .unwrap();
        assert_eq!(reply, "echo: ping");
    }

    #[tokio::test]
    async fn test_generate_non_success_status() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let endpoint = spawn(app).await;
        let backend = LocalBackend::new(reqwest::Client::new(), DEFAULT_LOCAL_MODEL);

        let err = backend
            .generate(&local(endpoint), "ping", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Ollama API error: HTTP 500: model not loaded");
    }

    #[tokio::test]
    async fn test_generate_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = LocalBackend::new(reqwest::Client::new(), DEFAULT_LOCAL_MODEL);
        let err = backend
            .generate(&local(format!("http://{}", addr)), "ping", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkbenchError::Inference { status: None, .. }
        ));
        assert!(err.to_string().starts_with("Failed to reach Ollama API"));
    }
}
