//! Auditable entity contract.
//!
//! Defines the interface entities must implement to be audited.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of change an entity underwent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEvent {
    /// Entity created
    Created,
    /// Entity updated
    Updated,
    /// Entity deleted
    Deleted,
    /// Entity restored from deletion
    Restored,
    /// Custom event
    Custom(String),
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditEvent::Created => write!(f, "created"),
            AuditEvent::Updated => write!(f, "updated"),
            AuditEvent::Deleted => write!(f, "deleted"),
            AuditEvent::Restored => write!(f, "restored"),
            AuditEvent::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Changed attribute values, keyed by attribute name.
pub type AttributeMap = HashMap<String, serde_json::Value>;

/// Contract entities must satisfy to be audited.
///
/// Owned by the calling application; the orchestrator only reads from it.
pub trait Auditable: Send + Sync {
    /// Entity type name (e.g. table or aggregate name).
    fn entity_type(&self) -> &str;

    /// Entity identifier.
    fn entity_id(&self) -> String;

    /// Kind of change being audited.
    fn audit_event(&self) -> AuditEvent;

    /// Preferred backend name. None means the configured default.
    fn audit_backend(&self) -> Option<&str> {
        None
    }

    /// Maximum records to keep for this entity.
    ///
    /// None defers to the driver's configured cap; Some(0) disables pruning.
    fn retention(&self) -> Option<usize> {
        None
    }

    /// Who performed the change, if known.
    fn actor(&self) -> Option<String> {
        None
    }

    /// Tags attached to records for this entity.
    fn audit_tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether the entity is in a state worth recording.
    fn ready_for_audit(&self) -> bool {
        true
    }

    /// Attribute values before the change.
    fn old_values(&self) -> AttributeMap;

    /// Attribute values after the change.
    fn new_values(&self) -> AttributeMap;
}

/// A self-contained change snapshot implementing [`Auditable`].
///
/// Useful for hosts that assemble changes by hand, and for testing.
#[derive(Clone, Debug)]
pub struct SnapshotEntity {
    entity_type: String,
    entity_id: String,
    event: AuditEvent,
    backend: Option<String>,
    retention: Option<usize>,
    actor: Option<String>,
    tags: Vec<String>,
    ready: bool,
    old_values: AttributeMap,
    new_values: AttributeMap,
}

impl SnapshotEntity {
    /// Create a new snapshot.
    pub fn new(entity_type: &str, entity_id: &str, event: AuditEvent) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event,
            backend: None,
            retention: None,
            actor: None,
            tags: Vec::new(),
            ready: true,
            old_values: HashMap::new(),
            new_values: HashMap::new(),
        }
    }

    /// Route audits to a named backend.
    pub fn with_backend(mut self, backend: &str) -> Self {
        self.backend = Some(backend.to_string());
        self
    }

    /// Cap stored records for this entity.
    pub fn with_retention(mut self, max_records: usize) -> Self {
        self.retention = Some(max_records);
        self
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Mark the snapshot as not ready for auditing.
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    /// Record a changed attribute with its before and after values.
    pub fn with_change(
        mut self,
        attribute: &str,
        old: impl Serialize,
        new: impl Serialize,
    ) -> Self {
        if let Ok(v) = serde_json::to_value(old) {
            self.old_values.insert(attribute.to_string(), v);
        }
        if let Ok(v) = serde_json::to_value(new) {
            self.new_values.insert(attribute.to_string(), v);
        }
        self
    }

    /// Record an attribute that only has a new value (e.g. on create).
    pub fn with_new_value(mut self, attribute: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.new_values.insert(attribute.to_string(), v);
        }
        self
    }

    /// Record an attribute that only has an old value (e.g. on delete).
    pub fn with_old_value(mut self, attribute: &str, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.old_values.insert(attribute.to_string(), v);
        }
        self
    }
}

impl Auditable for SnapshotEntity {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn entity_id(&self) -> String {
        self.entity_id.clone()
    }

    fn audit_event(&self) -> AuditEvent {
        self.event.clone()
    }

    fn audit_backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    fn retention(&self) -> Option<usize> {
        self.retention
    }

    fn actor(&self) -> Option<String> {
        self.actor.clone()
    }

    fn audit_tags(&self) -> Vec<String> {
        self.tags.clone()
    }

    fn ready_for_audit(&self) -> bool {
        self.ready
    }

    fn old_values(&self) -> AttributeMap {
        self.old_values.clone()
    }

    fn new_values(&self) -> AttributeMap {
        self.new_values.clone()
    }
}
