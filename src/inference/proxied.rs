//! Proxied (hosted chat-completions) backend

use super::Backend;
use crate::error::{Result, WorkbenchError};
use crate::forwarder::ProxyForwarder;
use crate::types::{Integration, IntegrationKind};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;

/// Model requested when none is configured
pub const DEFAULT_PROXIED_MODEL: &str = "vllm-llama-3-1-8b";

const NO_RESPONSE: &str = "No response from Nutanix API.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Sends one chat completion through the proxy forwarder
pub struct ProxiedBackend {
    forwarder: Arc<ProxyForwarder>,
    model: String,
}

impl ProxiedBackend {
    pub fn new(forwarder: Arc<ProxyForwarder>, model: impl Into<String>) -> Self {
        Self {
            forwarder,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Backend for ProxiedBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        integration: &Integration,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let backend = IntegrationKind::Proxied.backend_name();
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            stream: false,
        };
        let body = Bytes::from(serde_json::to_vec(&request)?);

        let reply = match self.forwarder.forward_to(integration, body).await {
            Ok(reply) => reply,
            Err(WorkbenchError::Upstream(reason)) => {
                return Err(WorkbenchError::Inference {
                    backend: backend.to_string(),
                    status: None,
                    body: format!("Failed to reach {} API: {}", backend, reason),
                })
            }
            Err(e) => return Err(e),
        };

        if !reply.is_success() {
            return Err(WorkbenchError::Inference {
                backend: backend.to_string(),
                status: Some(reply.status),
                body: reply.text(),
            });
        }

        extract_completion(reply.status, &reply.body)
    }
}

/// Pull `choices[0].message.content` out of a chat-completion body
///
/// An unparseable body keeps the upstream status and raw text in the error.
pub fn extract_completion(status: u16, body: &[u8]) -> Result<String> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| WorkbenchError::Inference {
            backend: IntegrationKind::Proxied.backend_name().to_string(),
            status: Some(status),
            body: format!(
                "Failed to parse Nutanix JSON: {}: {}",
                e,
                String::from_utf8_lossy(body)
            ),
        })?;

    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    if content.is_empty() {
        Ok(NO_RESPONSE.to_string())
    } else {
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forwarder::{http_client, DEFAULT_PROXY_PATH_SUFFIX};
    use crate::registry::IntegrationRegistry;
    use crate::store::MemoryIntegrationStore;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    #[test]
    fn test_extract_completion() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":"Hi there"}}]}"#;
        assert_eq!(extract_completion(200, body).unwrap(), "Hi there");
    }

    #[test]
    fn test_extract_completion_fallback() {
        assert_eq!(
            extract_completion(200, br#"{"choices":[]}"#).unwrap(),
            "No response from Nutanix API."
        );
        assert_eq!(
            extract_completion(200, br#"{"choices":[{"message":{"content":""}}]}"#).unwrap(),
            "No response from Nutanix API."
        );
    }

    #[test]
    fn test_extract_completion_invalid_json() {
        let err = extract_completion(200, b"<html>").unwrap_err();
        match &err {
            WorkbenchError::Inference { status, body, .. } => {
                assert_eq!(*status, Some(200));
                assert!(body.starts_with("Failed to parse Nutanix JSON: "));
                assert!(body.ends_with(": <html>"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err
            .to_string()
            .starts_with("Nutanix API error: HTTP 200: Failed to parse Nutanix JSON: "));
    }

    #[test]
    fn test_request_omits_absent_max_tokens() {
        let request = ChatCompletionRequest {
            model: "m",
            messages: vec![],
            max_tokens: None,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["stream"], false);
    }

    async fn backend_for(app: Router) -> (ProxiedBackend, Integration) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let integration = Integration {
            id: "1".to_string(),
            name: "Hosted".to_string(),
            kind: IntegrationKind::Proxied,
            endpoint: format!("http://{}", addr),
            credential: "k".to_string(),
            active: false,
        };
        let registry = Arc::new(IntegrationRegistry::new(MemoryIntegrationStore::new()));
        let forwarder = Arc::new(ProxyForwarder::new(
            http_client(5).unwrap(),
            registry,
            DEFAULT_PROXY_PATH_SUFFIX,
        ));
        (
            ProxiedBackend::new(forwarder, DEFAULT_PROXIED_MODEL),
            integration,
        )
    }

    #[tokio::test]
    async fn test_generate_sends_chat_completion() {
        let app = Router::new().route(
            "/api/v1/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                let content = format!(
                    "{}|{}|{}|{}",
                    body["model"].as_str().unwrap_or_default(),
                    body["messages"][0]["content"].as_str().unwrap_or_default(),
                    body["max_tokens"],
                    body["stream"]
                );
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": content}}]
                }))
            }),
        );
        let (backend, integration) = backend_for(app).await;

        // Inactive integrations can still be selected explicitly
        let reply = backend
            .generate(&integration, "hello", Some(256))
            .await
            .unwrap();
        assert_eq!(reply, "vllm-llama-3-1-8b|hello|256|false");
    }

    #[tokio::test]
    async fn test_generate_non_success_status() {
        let app = Router::new().route(
            "/api/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let (backend, integration) = backend_for(app).await;

        let err = backend
            .generate(&integration, "hello", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Nutanix API error: HTTP 401: bad key");
    }

    #[tokio::test]
    async fn test_generate_unparseable_success_body() {
        let app = Router::new().route(
            "/api/v1/chat/completions",
            post(|| async { (StatusCode::OK, "upstream maintenance page") }),
        );
        let (backend, integration) = backend_for(app).await;

        let err = backend
            .generate(&integration, "hello", None)
            .await
            .unwrap_err();
        match err {
            WorkbenchError::Inference { status, body, .. } => {
                assert_eq!(status, Some(200));
                assert!(body.contains("upstream maintenance page"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
