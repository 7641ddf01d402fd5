//! Report channel.
//!
//! Fire-and-forget post-audit broadcast: one event per completed
//! (non-vetoed) audit, carrying the entity, the driver used, and the
//! record or its absence.

use crate::driver::interface::AuditDriver;
use crate::entity::Auditable;
use crate::record::AuditRecord;
use std::sync::Arc;

/// A party notified after each completed audit.
pub trait ReportSubscriber: Send + Sync {
    /// Receive the outcome of an audit. `record` is None when the
    /// entity produced nothing to record.
    fn on_report(
        &self,
        entity: &dyn Auditable,
        driver: &dyn AuditDriver,
        record: Option<&AuditRecord>,
    );
}

struct FnReportSubscriber<F>(F);

impl<F> ReportSubscriber for FnReportSubscriber<F>
where
    F: Fn(&dyn Auditable, &dyn AuditDriver, Option<&AuditRecord>) + Send + Sync,
{
    fn on_report(
        &self,
        entity: &dyn Auditable,
        driver: &dyn AuditDriver,
        record: Option<&AuditRecord>,
    ) {
        (self.0)(entity, driver, record)
    }
}

/// Ordered list of report subscribers.
#[derive(Default)]
pub struct ReportChannel {
    /// Subscribers, notified in registration order
    subscribers: Vec<Arc<dyn ReportSubscriber>>,
}

impl ReportChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&mut self, subscriber: Arc<dyn ReportSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Add a closure subscriber.
    pub fn subscribe_fn<F>(&mut self, on_report: F)
    where
        F: Fn(&dyn Auditable, &dyn AuditDriver, Option<&AuditRecord>) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnReportSubscriber(on_report)));
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Broadcast an audit outcome to every subscriber.
    ///
    /// Subscribers cannot influence the pipeline; there is no feedback.
    pub fn publish(
        &self,
        entity: &dyn Auditable,
        driver: &dyn AuditDriver,
        record: Option<&AuditRecord>,
    ) {
        tracing::debug!(
            entity_type = entity.entity_type(),
            entity_id = %entity.entity_id(),
            backend = driver.kind(),
            recorded = record.is_some(),
            "audit report published"
        );

        for subscriber in &self.subscribers {
            subscriber.on_report(entity, driver, record);
        }
    }
}
