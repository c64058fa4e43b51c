//! Integration registry
//!
//! `IntegrationRegistry` is the single source of truth for which backend a
//! conversation talks to. Every mutation is one read-modify-write of the
//! whole list under an async mutex, so concurrent requests served by the
//! same process never lose updates.

use crate::error::{Result, WorkbenchError};
use crate::store::IntegrationStore;
use crate::types::{next_id, Integration, IntegrationKind, NewIntegration};
use tokio::sync::Mutex;

const MISSING_FIELDS: &str = "Missing required fields: name, type, and endpoint are required, \
and apiKey is required for non-ollama integrations.";

/// Registry of configured inference integrations
pub struct IntegrationRegistry {
    store: Box<dyn IntegrationStore>,
    write_lock: Mutex<()>,
}

impl IntegrationRegistry {
    pub fn new(store: impl IntegrationStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            write_lock: Mutex::new(()),
        }
    }

    /// All integrations in storage order
    pub async fn list(&self) -> Result<Vec<Integration>> {
        self.store.load().await
    }

    /// Look up one integration
    pub async fn get(&self, id: &str) -> Result<Integration> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// First active integration of `kind`
    pub async fn active_of_kind(&self, kind: IntegrationKind) -> Result<Integration> {
        self.store
            .load()
            .await?
            .into_iter()
            .find(|i| i.kind == kind && i.active)
            .ok_or_else(|| {
                WorkbenchError::NotFound(format!(
                    "No active {} integration found",
                    kind.backend_name()
                ))
            })
    }

    /// Register a new integration; it always starts inactive
    pub async fn create(&self, request: NewIntegration) -> Result<Integration> {
        let name = request.name.trim();
        let endpoint = request.endpoint.trim();
        if name.is_empty() || request.kind.trim().is_empty() || endpoint.is_empty() {
            return Err(WorkbenchError::Validation(MISSING_FIELDS.to_string()));
        }

        let kind = IntegrationKind::parse(&request.kind).ok_or_else(|| {
            WorkbenchError::Validation(format!("Unknown integration type: {}", request.kind))
        })?;

        let credential = if kind.requires_credential() {
            match request.api_key.as_deref().map(str::trim) {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => return Err(WorkbenchError::Validation(MISSING_FIELDS.to_string())),
            }
        } else {
            String::new()
        };

        let _guard = self.write_lock.lock().await;
        let mut integrations = self.store.load().await?;
        let integration = Integration {
            id: next_id(integrations.iter().map(|i| i.id.as_str())),
            name: name.to_string(),
            kind,
            endpoint: endpoint.to_string(),
            credential,
            active: false,
        };
        integrations.push(integration.clone());
        self.store.save(&integrations).await?;

        tracing::info!(
            id = %integration.id,
            kind = %integration.kind,
            endpoint = %integration.endpoint,
            "Integration created"
        );
        Ok(integration)
    }

    /// Set one integration's active flag, leaving the others alone
    pub async fn set_active(&self, id: &str, active: bool) -> Result<Integration> {
        let _guard = self.write_lock.lock().await;
        let mut integrations = self.store.load().await?;
        let entry = integrations
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found(id))?;
        entry.active = active;
        let updated = entry.clone();
        self.store.save(&integrations).await?;

        tracing::info!(id = %id, active, "Integration updated");
        Ok(updated)
    }

    /// Make `id` the only active integration
    pub async fn activate_exclusively(&self, id: &str) -> Result<Integration> {
        let _guard = self.write_lock.lock().await;
        let mut integrations = self.store.load().await?;
        if !integrations.iter().any(|i| i.id == id) {
            return Err(not_found(id));
        }

        for integration in integrations.iter_mut() {
            integration.active = integration.id == id;
        }
        self.store.save(&integrations).await?;

        tracing::info!(id = %id, "Active integration updated");
        integrations
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found(id))
    }

    /// Remove an integration; sessions referencing it are not touched
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut integrations = self.store.load().await?;
        let before = integrations.len();
        integrations.retain(|i| i.id != id);
        if integrations.len() == before {
            return Err(not_found(id));
        }
        self.store.save(&integrations).await?;

        tracing::info!(id = %id, "Integration deleted");
        Ok(())
    }
}

fn not_found(id: &str) -> WorkbenchError {
    WorkbenchError::NotFound(format!("Integration not found: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileIntegrationStore, MemoryIntegrationStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn request(name: &str, kind: &str, key: Option<&str>) -> NewIntegration {
        NewIntegration {
            name: name.to_string(),
            kind: kind.to_string(),
            endpoint: "http://localhost:11434".to_string(),
            api_key: key.map(String::from),
        }
    }

    fn registry() -> IntegrationRegistry {
        IntegrationRegistry::new(MemoryIntegrationStore::new())
    }

    // ─── Create ───

    #[tokio::test]
    async fn test_create_local_discards_key() {
        let reg = registry();
        let created = reg
            .create(request("Box", "ollama", Some("ignored")))
            .await
            .unwrap();
        assert_eq!(created.kind, IntegrationKind::Local);
        assert_eq!(created.credential, "");
        assert!(!created.active);
        assert_eq!(reg.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_proxied_requires_key() {
        let reg = registry();
        let err = reg.create(request("Hosted", "proxied", None)).await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Validation(_)));

        let err = reg
            .create(request("Hosted", "nutanix", Some("   ")))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Missing required fields"));

        assert!(reg.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields_and_unknown_kind() {
        let reg = registry();
        assert!(reg.create(request("", "local", None)).await.is_err());
        assert!(reg.create(request("Box", "", None)).await.is_err());

        let mut no_endpoint = request("Box", "local", None);
        no_endpoint.endpoint = String::new();
        assert!(reg.create(no_endpoint).await.is_err());

        let err = reg.create(request("Box", "openai", None)).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown integration type: openai");
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let reg = registry();
        let a = reg.create(request("a", "local", None)).await.unwrap();
        let b = reg.create(request("b", "local", None)).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    // ─── Activation ───

    #[tokio::test]
    async fn test_set_active_touches_only_target() {
        let reg = registry();
        let a = reg.create(request("a", "local", None)).await.unwrap();
        let b = reg.create(request("b", "local", None)).await.unwrap();

        reg.set_active(&a.id, true).await.unwrap();
        reg.set_active(&b.id, true).await.unwrap();
        let all = reg.list().await.unwrap();
        assert!(all.iter().all(|i| i.active));

        reg.set_active(&a.id, false).await.unwrap();
        assert!(!reg.get(&a.id).await.unwrap().active);
        assert!(reg.get(&b.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_activate_exclusively() {
        let reg = registry();
        let ids: Vec<String> = create_ids(&reg, 3).await;
        for id in &ids {
            reg.set_active(id, true).await.unwrap();
        }

        reg.activate_exclusively(&ids[1]).await.unwrap();
        let active: Vec<_> = reg
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.active)
            .map(|i| i.id)
            .collect();
        assert_eq!(active, vec![ids[1].clone()]);
    }

    #[tokio::test]
    async fn test_activate_exclusively_unknown_leaves_state() {
        let reg = registry();
        let ids = create_ids(&reg, 2).await;
        reg.set_active(&ids[0], true).await.unwrap();

        let err = reg.activate_exclusively("missing").await.unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound(_)));
        assert!(reg.get(&ids[0]).await.unwrap().active);
        assert!(!reg.get(&ids[1]).await.unwrap().active);
    }

    #[tokio::test]
    async fn test_active_of_kind() {
        let reg = registry();
        let err = reg
            .active_of_kind(IntegrationKind::Proxied)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No active Nutanix integration found");

        let hosted = reg
            .create(request("Hosted", "proxied", Some("k")))
            .await
            .unwrap();
        assert!(reg.active_of_kind(IntegrationKind::Proxied).await.is_err());

        reg.set_active(&hosted.id, true).await.unwrap();
        let found = reg.active_of_kind(IntegrationKind::Proxied).await.unwrap();
        assert_eq!(found.id, hosted.id);
    }

    // ─── Delete ───

    #[tokio::test]
    async fn test_delete() {
        let reg = registry();
        let ids = create_ids(&reg, 2).await;

        let err = reg.delete("missing").await.unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound(_)));
        assert_eq!(reg.list().await.unwrap().len(), 2);

        reg.delete(&ids[0]).await.unwrap();
        let remaining = reg.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
        assert!(matches!(
            reg.get(&ids[0]).await,
            Err(WorkbenchError::NotFound(_))
        ));
    }

    // ─── Persistence ───

    #[tokio::test]
    async fn test_concurrent_mutations_are_serialized() {
        let dir = TempDir::new().unwrap();
        let reg = Arc::new(IntegrationRegistry::new(FileIntegrationStore::new(
            dir.path(),
        )));

        let mut handles = Vec::new();
        for i in 0..10 {
            let reg = reg.clone();
            handles.push(tokio::spawn(async move {
                reg.create(request(&format!("i{}", i), "local", None))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let reloaded = IntegrationRegistry::new(FileIntegrationStore::new(dir.path()));
        assert_eq!(reloaded.list().await.unwrap().len(), 10);
    }

    async fn create_ids(reg: &IntegrationRegistry, n: usize) -> Vec<String> {
        let mut ids = Vec::new();
        for i in 0..n {
            let created = reg
                .create(request(&format!("i{}", i), "local", None))
                .await
                .unwrap();
            ids.push(created.id);
        }
        ids
    }
}
