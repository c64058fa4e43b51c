//! Integration persistence
//!
//! The registry owns the read-modify-write cycle; stores only load and save
//! the whole list.

use super::document::JsonDocument;
use crate::error::Result;
use crate::types::Integration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;

/// File name of the integrations document under the data directory
pub const INTEGRATIONS_FILE: &str = "integrations.json";

/// Trait for persisting the integration list
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Load all integrations in storage order
    async fn load(&self) -> Result<Vec<Integration>>;

    /// Replace the stored list
    async fn save(&self, integrations: &[Integration]) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IntegrationsDocument {
    #[serde(default)]
    integrations: Vec<Integration>,
}

/// JSON file-based integration store
pub struct FileIntegrationStore {
    document: JsonDocument<IntegrationsDocument>,
}

impl FileIntegrationStore {
    /// Store backed by `<data_dir>/integrations.json`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            document: JsonDocument::new(data_dir.as_ref().join(INTEGRATIONS_FILE)),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }
}

#[async_trait]
impl IntegrationStore for FileIntegrationStore {
    async fn load(&self) -> Result<Vec<Integration>> {
        Ok(self.document.load().await.integrations)
    }

    async fn save(&self, integrations: &[Integration]) -> Result<()> {
        let doc = IntegrationsDocument {
            integrations: integrations.to_vec(),
        };
        self.document.save(&doc).await
    }
}

/// In-memory integration store for testing
#[derive(Default)]
pub struct MemoryIntegrationStore {
    integrations: RwLock<Vec<Integration>>,
}

impl MemoryIntegrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing integrations
    pub fn with(integrations: Vec<Integration>) -> Self {
        Self {
            integrations: RwLock::new(integrations),
        }
    }
}

#[async_trait]
impl IntegrationStore for MemoryIntegrationStore {
    async fn load(&self) -> Result<Vec<Integration>> {
        Ok(self.integrations.read().await.clone())
    }

    async fn save(&self, integrations: &[Integration]) -> Result<()> {
        *self.integrations.write().await = integrations.to_vec();
        Ok(())
    }
}
