use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::StoreError;

/// One catalog upload, as shown on the admin history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEntry {
    pub filename: String,
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only JSON log of catalog uploads.
#[derive(Debug, Clone)]
pub struct UploadHistory {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl UploadHistory {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first. A missing file is an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::History`] when the file is not a JSON array of
    /// entries, or [`StoreError::Io`] when it cannot be read.
    pub async fn entries(&self) -> Result<Vec<UploadEntry>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| StoreError::History(e.to_string()))
    }

    /// Appends an entry stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the history cannot be read or written.
    pub async fn record(
        &self,
        filename: &str,
        username: &str,
    ) -> Result<UploadEntry, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.entries().await?;
        let entry = UploadEntry {
            filename: filename.to_string(),
            username: username.to_string(),
            timestamp: Utc::now(),
        };
        entries.push(entry.clone());

        let json =
            serde_json::to_vec_pretty(&entries).map_err(|e| StoreError::History(e.to_string()))?;
        self.write_atomic(&json).await?;

        tracing::info!(filename, username, total = entries.len(), "upload recorded");
        Ok(entry)
    }

    async fn write_atomic(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "history".into(), |n| n.to_string_lossy().into_owned());
        let tmp = self.path.with_file_name(format!(".{name}.tmp"));

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&self.path, e));
        }
        Ok(())
    }
}
