//! Whole-document JSON persistence
//!
//! Every collection is one JSON file that is read in full and rewritten in
//! full on each mutation. A missing file is an empty collection (first run);
//! an unparseable file is also treated as empty, with a warning naming it.

use crate::error::{Result, WorkbenchError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// A JSON document on disk holding a value of type `T`
pub struct JsonDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, degrading to `T::default()` when absent or corrupt
    pub async fn load(&self) -> T {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to read document, using empty collection"
                    );
                }
                return T::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Document is not valid JSON, using empty collection"
                );
                T::default()
            }
        }
    }

    /// Write the document atomically: temp file, fsync, rename
    pub async fn save(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                WorkbenchError::Config(format!(
                    "Failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Document saved");
        Ok(())
    }
}
