//! Inference adapter
//!
//! Turns one prompt into one plain-text reply for a given integration. Each
//! integration kind has its own backend:
//! - `local`: Ollama-style `/api/generate`, line-delimited partial results
//! - `proxied`: OpenAI-style chat completion reached through the forwarder

mod local;
mod proxied;

pub use local::{parse_generate_stream, LocalBackend, DEFAULT_LOCAL_MODEL};
pub use proxied::{extract_completion, ProxiedBackend, DEFAULT_PROXIED_MODEL};

use crate::error::Result;
use crate::types::{Integration, IntegrationKind};
use async_trait::async_trait;
use tracing::Instrument;

/// Produces one reply for a prompt
///
/// The conversation controller depends on this trait so tests can stand in
/// a scripted backend.
#[async_trait]
pub trait Inference: Send + Sync {
    async fn infer(
        &self,
        integration: &Integration,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String>;
}

/// One implementation per integration kind
#[async_trait]
pub trait Backend: Send + Sync {
    /// Model name sent upstream
    fn model(&self) -> &str;

    async fn generate(
        &self,
        integration: &Integration,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String>;
}

/// Dispatches on integration kind
pub struct InferenceAdapter {
    local: Box<dyn Backend>,
    proxied: Box<dyn Backend>,
}

impl InferenceAdapter {
    pub fn new(local: impl Backend + 'static, proxied: impl Backend + 'static) -> Self {
        Self {
            local: Box::new(local),
            proxied: Box::new(proxied),
        }
    }

    fn backend(&self, kind: IntegrationKind) -> &dyn Backend {
        match kind {
            IntegrationKind::Local => self.local.as_ref(),
            IntegrationKind::Proxied => self.proxied.as_ref(),
        }
    }
}

#[async_trait]
impl Inference for InferenceAdapter {
    async fn infer(
        &self,
        integration: &Integration,
        prompt: &str,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let backend = self.backend(integration.kind);
        let span = tracing::info_span!(
            "a3s.workbench.inference",
            "a3s.workbench.kind" = integration.kind.as_str(),
            "a3s.workbench.integration" = %integration.id,
            "a3s.workbench.model" = backend.model(),
            "a3s.workbench.max_tokens" = ?max_tokens,
        );

        async {
            let result = backend.generate(integration, prompt, max_tokens).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Inference failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}
