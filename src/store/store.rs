//! [`RecordStore`] trait definition.

use crate::error::ProvisionError;
use crate::store::ProvisioningRecord;
use async_trait::async_trait;

/// Trait for persisting the provisioning record.
///
/// One record per store — each successful provision overwrites it, and
/// teardown removes it.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the record. Returns `None` (not an error) if none was saved.
    async fn load(&self) -> Result<Option<ProvisioningRecord>, ProvisionError>;

    /// Save the record, overwriting any existing one.
    async fn save(&mut self, record: &ProvisioningRecord) -> Result<(), ProvisionError>;

    /// Delete the record. Idempotent.
    async fn clear(&mut self) -> Result<(), ProvisionError>;
}
