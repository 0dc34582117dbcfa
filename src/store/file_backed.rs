//! File-backed record store.
//!
//! Stores the provisioning record as a single JSON file at a well-known
//! path relative to the invocation directory. Writes go to a temp file in
//! the same directory followed by a rename, so a crash mid-write can
//! never corrupt a previously valid record. The file is process-local;
//! concurrent multi-process access is outside the contract.

use crate::error::ProvisionError;
use crate::store::{ProvisioningRecord, RecordStore};
use async_trait::async_trait;
use std::path::PathBuf;

/// Default record location, relative to the invocation directory.
pub const DEFAULT_RECORD_PATH: &str = ".vnet-provision/record.json";

/// File-backed implementation of [`RecordStore`].
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    /// Create a store at the default relative path.
    pub fn new_default() -> Self {
        Self::new(PathBuf::from(DEFAULT_RECORD_PATH))
    }

    /// Create a store at a custom path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "record.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn load(&self) -> Result<Option<ProvisioningRecord>, ProvisionError> {
        if tokio::fs::metadata(&self.path).await.is_err() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ProvisionError::Storage(format!("failed to read record: {}", e)))?;

        let record = serde_json::from_str(&content)
            .map_err(|e| ProvisionError::Storage(format!("failed to parse record: {}", e)))?;

        Ok(Some(record))
    }

    async fn save(&mut self, record: &ProvisioningRecord) -> Result<(), ProvisionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ProvisionError::Storage(format!("failed to create record dir: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(record)
            .map_err(|e| ProvisionError::Storage(format!("failed to serialize record: {}", e)))?;

        // Temp file lives next to the record so the rename stays on one
        // filesystem and is atomic.
        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| ProvisionError::Storage(format!("failed to write record: {}", e)))?;

        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| ProvisionError::Storage(format!("failed to commit record: {}", e)))?;

        Ok(())
    }

    async fn clear(&mut self) -> Result<(), ProvisionError> {
        if tokio::fs::metadata(&self.path).await.is_ok() {
            tokio::fs::remove_file(&self.path)
                .await
                .map_err(|e| ProvisionError::Storage(format!("failed to delete record: {}", e)))?;
        }
        Ok(())
    }
}
