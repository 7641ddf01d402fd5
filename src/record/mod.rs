//! Audit record structure.
//!
//! Backend-agnostic artifact representing one recorded change.

pub mod filter;

pub use filter::RecordFilter;

use crate::core::{now, Timestamp};
use crate::entity::{AttributeMap, AuditEvent, Auditable};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::collections::HashMap;

/// Unique record identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a record ID from a string.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Generate a unique ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the ID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded change to an entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record ID
    pub id: RecordId,
    /// Kind of change
    pub event: AuditEvent,
    /// Entity type name
    pub entity_type: String,
    /// Entity identifier
    pub entity_id: String,
    /// Who performed the change
    pub actor: Option<String>,
    /// Attribute values before the change
    pub old_values: AttributeMap,
    /// Attribute values after the change
    pub new_values: AttributeMap,
    /// Tags for grouping and search
    pub tags: Vec<String>,
    /// Additional metadata
    pub metadata: HashMap<String, serde_json::Value>,
    /// SHA3-256 checksum (hex) of the identifying fields
    pub checksum: Option<String>,
    /// When the record was produced
    pub recorded_at: Timestamp,
}

impl AuditRecord {
    /// Create a new record.
    pub fn new(entity_type: &str, entity_id: &str, event: AuditEvent) -> Self {
        Self {
            id: RecordId::generate(),
            event,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            actor: None,
            old_values: HashMap::new(),
            new_values: HashMap::new(),
            tags: Vec::new(),
            metadata: HashMap::new(),
            checksum: None,
            recorded_at: now(),
        }
    }

    /// Build a record from an auditable entity.
    ///
    /// Returns None when the entity has nothing to record: it is not
    /// ready for auditing, or no attribute changed. This is the single
    /// definition of the "absent" outcome drivers report.
    pub fn from_entity(entity: &dyn Auditable) -> Option<Self> {
        if !entity.ready_for_audit() {
            return None;
        }

        let old_values = entity.old_values();
        let new_values = entity.new_values();
        if old_values.is_empty() && new_values.is_empty() {
            return None;
        }

        let mut record = Self::new(entity.entity_type(), &entity.entity_id(), entity.audit_event());
        record.actor = entity.actor();
        record.old_values = old_values;
        record.new_values = new_values;
        record.tags = entity.audit_tags();
        record.compute_checksum();

        Some(record)
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    /// Add metadata.
    pub fn with_metadata(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.to_string(), v);
        }
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    fn checksum_input(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.id, self.entity_type, self.entity_id, self.event, self.recorded_at
        )
    }

    /// Compute and store the integrity checksum.
    pub fn compute_checksum(&mut self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.checksum_input().as_bytes());
        let digest = hex::encode(hasher.finalize());
        self.checksum = Some(digest.clone());
        digest
    }

    /// Verify the stored checksum against the record's fields.
    pub fn verify_checksum(&self) -> bool {
        match &self.checksum {
            Some(stored) => {
                let mut hasher = Sha3_256::new();
                hasher.update(self.checksum_input().as_bytes());
                &hex::encode(hasher.finalize()) == stored
            }
            None => false,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> crate::core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> crate::core::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
