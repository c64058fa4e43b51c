//! Same-origin proxy forwarder
//!
//! Relays an opaque request body to a proxied integration's chat-completions
//! endpoint with the integration's bearer credential attached, and hands the
//! upstream status and body back untouched. No retries and no payload
//! inspection.

use crate::error::{Result, WorkbenchError};
use crate::registry::IntegrationRegistry;
use crate::types::{Integration, IntegrationKind};
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;

/// Default path appended to a proxied integration's endpoint
pub const DEFAULT_PROXY_PATH_SUFFIX: &str = "/api/v1/chat/completions";

/// Raw upstream reply
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ProxiedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build the shared HTTP client; a zero timeout means none
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    Ok(builder.build()?)
}

/// Forwards chat-completion requests to proxied integrations
pub struct ProxyForwarder {
    client: reqwest::Client,
    registry: Arc<IntegrationRegistry>,
    path_suffix: String,
}

impl ProxyForwarder {
    pub fn new(
        client: reqwest::Client,
        registry: Arc<IntegrationRegistry>,
        path_suffix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            registry,
            path_suffix: path_suffix.into(),
        }
    }

    /// Forward to the active integration behind the named backend
    pub async fn forward(&self, backend: &str, body: Bytes) -> Result<ProxiedResponse> {
        let kind = match IntegrationKind::parse(backend) {
            Some(IntegrationKind::Proxied) => IntegrationKind::Proxied,
            _ => {
                return Err(WorkbenchError::NotFound(format!(
                    "Unknown proxy backend: {}",
                    backend
                )))
            }
        };

        let integration = self.registry.active_of_kind(kind).await?;
        self.forward_to(&integration, body).await
    }

    /// Forward to a specific integration
    pub async fn forward_to(
        &self,
        integration: &Integration,
        body: Bytes,
    ) -> Result<ProxiedResponse> {
        let url = self.target_url(integration);
        tracing::debug!(id = %integration.id, url = %url, bytes = body.len(), "Forwarding request");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", integration.credential))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Upstream request failed");
                WorkbenchError::Upstream(e.without_url().to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| WorkbenchError::Upstream(e.without_url().to_string()))?;

        tracing::debug!(url = %url, status, "Upstream responded");
        Ok(ProxiedResponse { status, body })
    }

    fn target_url(&self, integration: &Integration) -> String {
        format!("{}{}", integration.base_url(), self.path_suffix)
    }
}
