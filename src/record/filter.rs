//! Record filter for queries.

use crate::core::Timestamp;
use crate::entity::AuditEvent;
use crate::record::AuditRecord;

/// Filter for querying stored audit records.
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    /// Filter by entity type
    pub entity_type: Option<String>,
    /// Filter by entity ID
    pub entity_id: Option<String>,
    /// Filter by event kind
    pub event: Option<AuditEvent>,
    /// Filter by actor
    pub actor: Option<String>,
    /// Recorded at or after
    pub from: Option<Timestamp>,
    /// Recorded at or before
    pub to: Option<Timestamp>,
    /// Maximum results
    pub limit: Option<usize>,
}

impl RecordFilter {
    /// Create a new filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by entity type.
    pub fn by_entity_type(mut self, entity_type: &str) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self
    }

    /// Filter by entity type and ID.
    pub fn by_entity(mut self, entity_type: &str, entity_id: &str) -> Self {
        self.entity_type = Some(entity_type.to_string());
        self.entity_id = Some(entity_id.to_string());
        self
    }

    /// Filter by event kind.
    pub fn by_event(mut self, event: AuditEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// Filter by actor.
    pub fn by_actor(mut self, actor: &str) -> Self {
        self.actor = Some(actor.to_string());
        self
    }

    /// Limit the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a record matches this filter.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(entity_type) = &self.entity_type {
            if &record.entity_type != entity_type {
                return false;
            }
        }

        if let Some(entity_id) = &self.entity_id {
            if &record.entity_id != entity_id {
                return false;
            }
        }

        if let Some(event) = &self.event {
            if &record.event != event {
                return false;
            }
        }

        if let Some(actor) = &self.actor {
            if record.actor.as_ref() != Some(actor) {
                return false;
            }
        }

        if let Some(from) = self.from {
            if record.recorded_at < from {
                return false;
            }
        }

        if let Some(to) = self.to {
            if record.recorded_at > to {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entity_type: &str, entity_id: &str, event: AuditEvent) -> AuditRecord {
        AuditRecord::new(entity_type, entity_id, event)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RecordFilter::new();
        assert!(filter.matches(&record("users", "1", AuditEvent::Created)));
        assert!(filter.matches(&record("orders", "9", AuditEvent::Deleted)));
    }

    #[test]
    fn test_filter_by_entity() {
        let filter = RecordFilter::new().by_entity("users", "1");
        assert!(filter.matches(&record("users", "1", AuditEvent::Updated)));
        assert!(!filter.matches(&record("users", "2", AuditEvent::Updated)));
        assert!(!filter.matches(&record("orders", "1", AuditEvent::Updated)));
    }

    #[test]
    fn test_filter_by_event() {
        let filter = RecordFilter::new().by_event(AuditEvent::Deleted);
        assert!(filter.matches(&record("users", "1", AuditEvent::Deleted)));
        assert!(!filter.matches(&record("users", "1", AuditEvent::Created)));
    }

    #[test]
    fn test_filter_by_actor() {
        let filter = RecordFilter::new().by_actor("admin");
        let matching = record("users", "1", AuditEvent::Updated).with_actor("admin");
        let other = record("users", "1", AuditEvent::Updated).with_actor("guest");
        let anonymous = record("users", "1", AuditEvent::Updated);

        assert!(filter.matches(&matching));
        assert!(!filter.matches(&other));
        assert!(!filter.matches(&anonymous));
    }

    #[test]
    fn test_filter_by_time_range() {
        let rec = record("users", "1", AuditEvent::Updated);

        let mut filter = RecordFilter::new();
        filter.from = Some(rec.recorded_at - chrono::Duration::seconds(1));
        filter.to = Some(rec.recorded_at + chrono::Duration::seconds(1));
        assert!(filter.matches(&rec));

        filter.from = Some(rec.recorded_at + chrono::Duration::seconds(1));
        assert!(!filter.matches(&rec));
    }
}
