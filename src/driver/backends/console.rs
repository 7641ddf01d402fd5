//! Console audit driver.
//!
//! Prints each record to stdout as JSON. Retains nothing, so pruning is
//! a no-op.

use crate::core::Result;
use crate::driver::config::ConsoleConfig;
use crate::driver::interface::AuditDriver;
use crate::entity::Auditable;
use crate::record::AuditRecord;
use async_trait::async_trait;

/// Audit driver that writes records to stdout.
pub struct ConsoleDriver {
    /// Pretty-print records
    pretty: bool,
}

impl ConsoleDriver {
    /// Create a new console driver.
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            pretty: config.pretty,
        }
    }
}

impl Default for ConsoleDriver {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

#[async_trait]
impl AuditDriver for ConsoleDriver {
    async fn record(&self, entity: &dyn Auditable) -> Result<Option<AuditRecord>> {
        let record = match AuditRecord::from_entity(entity) {
            Some(record) => record,
            None => return Ok(None),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            record.to_json()?
        };
        println!("{}", json);

        Ok(Some(record))
    }

    async fn prune(&self, _entity: &dyn Auditable) -> Result<()> {
        // Nothing is retained, so there is nothing to prune.
        Ok(())
    }

    fn kind(&self) -> &str {
        "console"
    }
}
