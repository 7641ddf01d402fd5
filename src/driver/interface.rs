//! Audit driver contract.
//!
//! Core trait that all audit drivers must implement.

use crate::core::Result;
use crate::entity::Auditable;
use crate::record::AuditRecord;
use async_trait::async_trait;

/// Contract for pluggable audit drivers.
///
/// A driver knows how to persist one audit record and how to prune old
/// records for an entity. Instances are shared across calls and must be
/// safe for concurrent use.
#[async_trait]
pub trait AuditDriver: Send + Sync {
    /// Persist one audit record for the entity.
    ///
    /// Returns Ok(None) when the entity produced nothing to audit; that
    /// is a normal outcome, not an error. Invoked only after review
    /// passes.
    async fn record(&self, entity: &dyn Auditable) -> Result<Option<AuditRecord>>;

    /// Enforce retention for the entity, deleting the oldest records
    /// beyond its cap. Invoked only when `record` produced a record.
    async fn prune(&self, entity: &dyn Auditable) -> Result<()>;

    /// Backend identifier (e.g. "memory", "file").
    fn kind(&self) -> &str;

    /// Health check for the driver.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
