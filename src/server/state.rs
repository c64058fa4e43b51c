use std::sync::Arc;

use crate::config::WorkbenchConfig;
use crate::controller::ConversationController;
use crate::error::Result;
use crate::forwarder::{http_client, ProxyForwarder};
use crate::inference::{InferenceAdapter, LocalBackend, ProxiedBackend};
use crate::registry::IntegrationRegistry;
use crate::store::{FileIntegrationStore, FileSessionStore};
use crate::types::Collection;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConversationController>,
    pub forwarder: Arc<ProxyForwarder>,
    pub config: Arc<WorkbenchConfig>,
}

impl AppState {
    pub fn new(
        controller: Arc<ConversationController>,
        forwarder: Arc<ProxyForwarder>,
        config: Arc<WorkbenchConfig>,
    ) -> Self {
        Self {
            controller,
            forwarder,
            config,
        }
    }

    /// Wire file-backed stores, the forwarder and both inference backends.
    pub fn from_config(config: WorkbenchConfig) -> Result<Self> {
        let client = http_client(config.inference_timeout_secs)?;
        let data_dir = &config.data_dir;

        let registry = Arc::new(IntegrationRegistry::new(FileIntegrationStore::new(
            data_dir,
        )));
        let forwarder = Arc::new(ProxyForwarder::new(
            client.clone(),
            registry.clone(),
            config.proxy_path_suffix.clone(),
        ));
        let inference = Arc::new(InferenceAdapter::new(
            LocalBackend::new(client, config.local_model.clone()),
            ProxiedBackend::new(forwarder.clone(), config.proxied_model.clone()),
        ));
        let controller = Arc::new(ConversationController::new(
            registry,
            Arc::new(FileSessionStore::new(data_dir, Collection::Chat)),
            Arc::new(FileSessionStore::new(data_dir, Collection::Codegen)),
            inference,
        ));

        Ok(Self::new(controller, forwarder, Arc::new(config)))
    }
}
