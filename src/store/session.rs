//! Session persistence
//!
//! Two independent collections (chat and codegen) share one contract. The
//! file-backed store keeps each collection in a single JSON document:
//! ```text
//! <data_dir>/
//!   chatbot.json    # {"sessions": [...]}
//!   codeGen.json    # {"sessions": [...]}
//! ```

use super::document::JsonDocument;
use crate::error::{Result, WorkbenchError};
use crate::types::{next_id, Collection, Session, Turn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::{Mutex, RwLock};

/// Full-transcript replacement request
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    /// New transcript, replacing the stored one wholesale
    pub turns: Vec<Turn>,
    /// New title; `None` or blank keeps the current one
    pub title: Option<String>,
    /// Version the caller last saw; `None` means last writer wins
    pub expected_version: Option<u64>,
}

impl SessionUpdate {
    pub fn turns(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            ..Default::default()
        }
    }
}

/// Session storage trait
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Collection this store serves
    fn collection(&self) -> Collection;

    /// All sessions in storage order
    async fn list(&self) -> Result<Vec<Session>>;

    /// Load one session
    async fn get(&self, id: &str) -> Result<Session>;

    /// Create an empty session
    async fn create(&self, title: Option<String>) -> Result<Session>;

    /// Overwrite turns (and optionally title) and persist
    async fn replace(&self, id: &str, update: SessionUpdate) -> Result<Session>;

    /// Remove a session
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Stored document layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsDocument {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl SessionsDocument {
    fn find(&self, id: &str) -> Result<&Session> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn create(&mut self, collection: Collection, title: Option<String>) -> Session {
        let id = next_id(self.sessions.iter().map(|s| s.id.as_str()));
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| collection.default_title().to_string());
        let session = Session::new(id, title);
        self.sessions.push(session.clone());
        session
    }

    /// Apply a replacement; returns the session and whether anything changed
    fn replace(&mut self, id: &str, update: SessionUpdate) -> Result<(Session, bool)> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(id))?;

        let title = update
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| session.title.clone());
        let unchanged = session.turns == update.turns && session.title == title;

        if unchanged {
            return Ok((session.clone(), false));
        }

        if let Some(expected) = update.expected_version {
            if expected != session.version {
                return Err(WorkbenchError::Conflict {
                    id: id.to_string(),
                    expected,
                    actual: session.version,
                });
            }
        }

        session.turns = update.turns;
        session.title = title;
        session.version += 1;
        Ok((session.clone(), true))
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: &str) -> WorkbenchError {
    WorkbenchError::NotFound(format!("Session not found: {}", id))
}

// ============================================================================
// File-based Store
// ============================================================================

/// File-based session store
///
/// Mutations are serialized within the process; separate processes writing
/// the same file still race and the last writer wins.
pub struct FileSessionStore {
    collection: Collection,
    document: JsonDocument<SessionsDocument>,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store for `collection` under `data_dir`
    pub fn new(data_dir: impl AsRef<Path>, collection: Collection) -> Self {
        Self {
            collection,
            document: JsonDocument::new(data_dir.as_ref().join(collection.file_name())),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn list(&self) -> Result<Vec<Session>> {
        Ok(self.document.load().await.sessions)
    }

    async fn get(&self, id: &str) -> Result<Session> {
        self.document.load().await.find(id).cloned()
    }

    async fn create(&self, title: Option<String>) -> Result<Session> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.document.load().await;
        let session = doc.create(self.collection, title);
        self.document.save(&doc).await?;

        tracing::info!(
            collection = self.collection.as_str(),
            id = %session.id,
            "Session created"
        );
        Ok(session)
    }

    async fn replace(&self, id: &str, update: SessionUpdate) -> Result<Session> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.document.load().await;
        let (session, changed) = doc.replace(id, update)?;
        if changed {
            self.document.save(&doc).await?;
            tracing::debug!(
                collection = self.collection.as_str(),
                id = %id,
                turns = session.turns.len(),
                version = session.version,
                "Session updated"
            );
        }
        Ok(session)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.document.load().await;
        doc.delete(id)?;
        self.document.save(&doc).await?;

        tracing::info!(collection = self.collection.as_str(), id = %id, "Session deleted");
        Ok(())
    }
}

// ============================================================================
// In-memory Store
// ============================================================================

/// In-memory session store for testing
pub struct MemorySessionStore {
    collection: Collection,
    state: RwLock<SessionsDocument>,
}

impl MemorySessionStore {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            state: RwLock::new(SessionsDocument::default()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn collection(&self) -> Collection {
        self.collection
    }

    async fn list(&self) -> Result<Vec<Session>> {
        Ok(self.state.read().await.sessions.clone())
    }

    async fn get(&self, id: &str) -> Result<Session> {
        self.state.read().await.find(id).cloned()
    }

    async fn create(&self, title: Option<String>) -> Result<Session> {
        Ok(self.state.write().await.create(self.collection, title))
    }

    async fn replace(&self, id: &str, update: SessionUpdate) -> Result<Session> {
        self.state
            .write()
            .await
            .replace(id, update)
            .map(|(session, _)| session)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.state.write().await.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn file_store(dir: &TempDir) -> FileSessionStore {
        FileSessionStore::new(dir.path(), Collection::Chat)
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let store = MemorySessionStore::new(Collection::Codegen);
        let session = store.create(None).await.unwrap();
        assert_eq!(session.title, "New CodeGen Session");
        assert!(session.turns.is_empty());
        assert_eq!(session.version, 0);

        let named = store.create(Some("Refactor".to_string())).await.unwrap();
        assert_eq!(named.title, "Refactor");
        assert_ne!(named.id, session.id);
    }

    #[tokio::test]
    async fn test_replace_roundtrip_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        let session = store.create(None).await.unwrap();

        let turns = vec![Turn::user("T1"), Turn::assistant("T2")];
        store
            .replace(&session.id, SessionUpdate::turns(turns.clone()))
            .await
            .unwrap();

        // Fresh store instance reads what the first one wrote
        let reloaded = file_store(&dir).list().await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].turns, turns);
    }

    #[tokio::test]
    async fn test_replace_is_idempotent() {
        let store = MemorySessionStore::new(Collection::Chat);
        let session = store.create(None).await.unwrap();
        let update = SessionUpdate {
            turns: vec![Turn::user("hi")],
            title: Some("Greeting".to_string()),
            expected_version: None,
        };

        let first = store.replace(&session.id, update.clone()).await.unwrap();
        let second = store.replace(&session.id, update).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.version, 1);
        assert_eq!(store.get(&session.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_replace_keeps_title_when_absent() {
        let store = MemorySessionStore::new(Collection::Chat);
        let session = store.create(Some("Keep me".to_string())).await.unwrap();
        let updated = store
            .replace(
                &session.id,
                SessionUpdate {
                    turns: vec![Turn::user("x")],
                    title: Some("  ".to_string()),
                    expected_version: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Keep me");
    }

    #[tokio::test]
    async fn test_replace_stale_version_conflicts() {
        let store = MemorySessionStore::new(Collection::Chat);
        let session = store.create(None).await.unwrap();

        store
            .replace(
                &session.id,
                SessionUpdate {
                    turns: vec![Turn::user("a")],
                    title: None,
                    expected_version: Some(0),
                },
            )
            .await
            .unwrap();

        let err = store
            .replace(
                &session.id,
                SessionUpdate {
                    turns: vec![Turn::user("b")],
                    title: None,
                    expected_version: Some(0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkbenchError::Conflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_replace_unknown_is_not_found() {
        let store = MemorySessionStore::new(Collection::Chat);
        let err = store
            .replace("missing", SessionUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_leaves_collection() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        store.create(None).await.unwrap();
        store.create(None).await.unwrap();

        let err = store.delete("nope").await.unwrap_err();
        assert!(matches!(err, WorkbenchError::NotFound(_)));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        let a = store.create(Some("a".to_string())).await.unwrap();
        let b = store.create(Some("b".to_string())).await.unwrap();

        store.delete(&a.id).await.unwrap();
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        std::fs::write(store.path(), "[[[").unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_codegen_reads_existing_history() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("codeGen.json"),
            r#"{"sessions":[{"id":"1700000000000","title":"Navbar","messages":[{"role":"user","text":"a navbar"}]}]}"#,
        )
        .unwrap();

        let store = FileSessionStore::new(dir.path(), Collection::Codegen);
        assert_eq!(store.path(), dir.path().join("codeGen.json"));

        let sessions = store.list().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title, "Navbar");
        assert_eq!(sessions[0].turns, vec![Turn::user("a navbar")]);
        assert_eq!(sessions[0].version, 0);
    }

    #[tokio::test]
    async fn test_concurrent_creates_do_not_lose_updates() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(file_store(&dir));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(Some(format!("s{}", i))).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let sessions = store.list().await.unwrap();
        assert_eq!(sessions.len(), 8);
        let mut ids: Vec<_> = sessions.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
