//! In-memory audit driver.
//!
//! Keeps records in process memory; the reference driver for tests and
//! short-lived tools.

use crate::core::Result;
use crate::driver::config::MemoryConfig;
use crate::driver::interface::AuditDriver;
use crate::entity::Auditable;
use crate::record::{AuditRecord, RecordFilter};
use async_trait::async_trait;
use std::sync::RwLock;

/// Audit driver backed by process memory.
pub struct MemoryDriver {
    /// Records kept per entity; 0 = unbounded
    max_records: usize,
    /// Stored records, oldest first
    entries: RwLock<Vec<AuditRecord>>,
}

impl MemoryDriver {
    /// Create a new memory driver.
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            max_records: config.max_records,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Query stored records.
    pub fn query(&self, filter: &RecordFilter) -> Vec<AuditRecord> {
        let entries = self.entries.read().unwrap();
        let mut results: Vec<AuditRecord> = entries
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }

        results
    }

    /// Records stored for one entity, oldest first.
    pub fn records_for(&self, entity_type: &str, entity_id: &str) -> Vec<AuditRecord> {
        self.query(&RecordFilter::new().by_entity(entity_type, entity_id))
    }

    /// Total stored record count.
    pub fn count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// All stored records.
    pub fn all(&self) -> Vec<AuditRecord> {
        self.entries.read().unwrap().clone()
    }

    /// Remove all stored records.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

#[async_trait]
impl AuditDriver for MemoryDriver {
    async fn record(&self, entity: &dyn Auditable) -> Result<Option<AuditRecord>> {
        let record = match AuditRecord::from_entity(entity) {
            Some(record) => record,
            None => return Ok(None),
        };

        self.entries.write().unwrap().push(record.clone());
        Ok(Some(record))
    }

    async fn prune(&self, entity: &dyn Auditable) -> Result<()> {
        let cap = entity.retention().unwrap_or(self.max_records);
        if cap == 0 {
            return Ok(());
        }

        let entity_type = entity.entity_type().to_string();
        let entity_id = entity.entity_id();

        let mut entries = self.entries.write().unwrap();
        let stored = entries
            .iter()
            .filter(|r| r.entity_type == entity_type && r.entity_id == entity_id)
            .count();
        let excess = stored.saturating_sub(cap);
        if excess == 0 {
            return Ok(());
        }

        // Entries are appended chronologically; retain walks in order,
        // so the first `excess` matches are the oldest.
        let mut removed = 0;
        entries.retain(|r| {
            if removed < excess && r.entity_type == entity_type && r.entity_id == entity_id {
                removed += 1;
                false
            } else {
                true
            }
        });

        tracing::debug!(
            entity_type = %entity_type,
            entity_id = %entity_id,
            removed,
            "pruned audit records"
        );
        Ok(())
    }

    fn kind(&self) -> &str {
        "memory"
    }
}
