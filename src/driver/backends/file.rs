//! File audit driver.
//!
//! Appends records to a JSON-lines file and keeps an in-memory mirror
//! for querying and pruning.

use crate::core::Result;
use crate::driver::config::FileConfig;
use crate::driver::interface::AuditDriver;
use crate::entity::Auditable;
use crate::record::{AuditRecord, RecordFilter};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::RwLock;

/// Audit driver backed by a JSON-lines file.
pub struct FileDriver {
    /// Log file path
    path: PathBuf,
    /// Records kept per entity; 0 = unbounded
    max_records: usize,
    /// Mirror of the file contents, oldest first
    mirror: RwLock<Vec<AuditRecord>>,
}

impl FileDriver {
    /// Create a file driver, loading any records the file already holds.
    pub fn new(config: FileConfig) -> Result<Self> {
        let path = PathBuf::from(&config.path);
        let mut mirror = Vec::new();

        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            for line in contents.lines().filter(|l| !l.trim().is_empty()) {
                mirror.push(AuditRecord::from_json(line)?);
            }
        }

        Ok(Self {
            path,
            max_records: config.max_records,
            mirror: RwLock::new(mirror),
        })
    }

    /// Log file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Query stored records.
    pub fn query(&self, filter: &RecordFilter) -> Vec<AuditRecord> {
        let mirror = self.mirror.read().unwrap();
        let mut results: Vec<AuditRecord> = mirror
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
        self.mirror.read().unwrap().len()
    }

    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_json()?)?;
        Ok(())
    }

    fn rewrite(&self, records: &[AuditRecord]) -> Result<()> {
        let mut lines = String::new();
        for record in records {
            lines.push_str(&record.to_json()?);
            lines.push('\n');
        }
        std::fs::write(&self.path, lines)?;
        Ok(())
    }
}

#[async_trait]
impl AuditDriver for FileDriver {
    async fn record(&self, entity: &dyn Auditable) -> Result<Option<AuditRecord>> {
        let record = match AuditRecord::from_entity(entity) {
            Some(record) => record,
            None => return Ok(None),
        };

        // Hold the write lock across the append so the file and the
        // mirror stay in the same order under concurrent writers.
        let mut mirror = self.mirror.write().unwrap();
        self.append(&record)?;
        mirror.push(record.clone());

        Ok(Some(record))
    }

    async fn prune(&self, entity: &dyn Auditable) -> Result<()> {
        let cap = entity.retention().unwrap_or(self.max_records);
        if cap == 0 {
            return Ok(());
        }

        let entity_type = entity.entity_type().to_string();
        let entity_id = entity.entity_id();

        let mut mirror = self.mirror.write().unwrap();
        let stored = mirror
            .iter()
            .filter(|r| r.entity_type == entity_type && r.entity_id == entity_id)
            .count();
        let excess = stored.saturating_sub(cap);
        if excess == 0 {
            return Ok(());
        }

        let mut removed = 0;
        mirror.retain(|r| {
            if removed < excess && r.entity_type == entity_type && r.entity_id == entity_id {
                removed += 1;
                false
            } else {
                true
            }
        });
        self.rewrite(&mirror)?;

        tracing::debug!(
            entity_type = %entity_type,
            entity_id = %entity_id,
            removed,
            path = %self.path.display(),
            "pruned audit log file"
        );
        Ok(())
    }

    fn kind(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AuditEvent, SnapshotEntity};

    fn change(id: &str, n: u32) -> SnapshotEntity {
        SnapshotEntity::new("users", id, AuditEvent::Updated).with_change("counter", n - 1, n)
    }

    fn driver_in(dir: &tempfile::TempDir, max_records: usize) -> FileDriver {
        let path = dir.path().join("audit.jsonl");
        FileDriver::new(FileConfig {
            path: path.to_string_lossy().to_string(),
            max_records,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_record_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_in(&dir, 0);

        driver.record(&change("1", 1)).await.unwrap();
        driver.record(&change("1", 2)).await.unwrap();

        let contents = std::fs::read_to_string(driver.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_reload_from_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let driver = driver_in(&dir, 0);
            driver.record(&change("1", 1)).await.unwrap();
        }

        let reloaded = driver_in(&dir, 0);
        assert_eq!(reloaded.count(), 1);
        assert_eq!(reloaded.records_for("users", "1").len(), 1);
    }

    #[tokio::test]
    async fn test_record_without_changes_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_in(&dir, 0);
        let entity = SnapshotEntity::new("users", "1", AuditEvent::Updated);

        assert!(driver.record(&entity).await.unwrap().is_none());
        assert!(!driver.path().exists());
    }

    #[tokio::test]
    async fn test_prune_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_in(&dir, 2);

        for n in 1..=4 {
            driver.record(&change("1", n)).await.unwrap();
        }
        driver.prune(&change("1", 4)).await.unwrap();

        assert_eq!(driver.count(), 2);
        let contents = std::fs::read_to_string(driver.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);

        // Survivors are the newest records, in order.
        let kept = driver.records_for("users", "1");
        assert_eq!(kept[0].new_values.get("counter"), Some(&serde_json::json!(3)));
        assert_eq!(kept[1].new_values.get("counter"), Some(&serde_json::json!(4)));
    }

    #[tokio::test]
    async fn test_prune_unbounded_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_in(&dir, 0);

        for n in 1..=3 {
            driver.record(&change("1", n)).await.unwrap();
        }
        driver.prune(&change("1", 3)).await.unwrap();

        assert_eq!(driver.count(), 3);
    }
}
