//! Audit orchestrator.
//!
//! Coordinates one full audit cycle per entity: resolve the driver, run
//! the review gate, execute the write, prune, and publish a report.

use crate::core::Result;
use crate::driver::registry::DriverRegistry;
use crate::entity::Auditable;
use crate::hooks::report::{ReportChannel, ReportSubscriber};
use crate::hooks::review::{ReviewGate, ReviewOutcome, ReviewSubscriber};
use crate::record::AuditRecord;
use std::sync::Arc;

/// Coordinates audit cycles across the registry and hooks.
pub struct AuditOrchestrator {
    /// Driver resolution
    registry: DriverRegistry,
    /// Pre-write review gate
    review: ReviewGate,
    /// Post-write report channel
    report: ReportChannel,
}

impl AuditOrchestrator {
    /// Create an orchestrator over a registry, with no subscribers.
    pub fn new(registry: DriverRegistry) -> Self {
        Self {
            registry,
            review: ReviewGate::new(),
            report: ReportChannel::new(),
        }
    }

    /// Add a review subscriber.
    pub fn with_review_subscriber(mut self, subscriber: Arc<dyn ReviewSubscriber>) -> Self {
        self.review.subscribe(subscriber);
        self
    }

    /// Add a closure review subscriber.
    pub fn with_review_fn<F>(mut self, review: F) -> Self
    where
        F: Fn(&dyn Auditable, &dyn crate::driver::AuditDriver) -> crate::hooks::ReviewDecision
            + Send
            + Sync
            + 'static,
    {
        self.review.subscribe_fn(review);
        self
    }

    /// Add a report subscriber.
    pub fn with_report_subscriber(mut self, subscriber: Arc<dyn ReportSubscriber>) -> Self {
        self.report.subscribe(subscriber);
        self
    }

    /// Add a closure report subscriber.
    pub fn with_report_fn<F>(mut self, on_report: F) -> Self
    where
        F: Fn(&dyn Auditable, &dyn crate::driver::AuditDriver, Option<&AuditRecord>)
            + Send
            + Sync
            + 'static,
    {
        self.report.subscribe_fn(on_report);
        self
    }

    /// The driver registry.
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// The review gate.
    pub fn review_gate(&self) -> &ReviewGate {
        &self.review
    }

    /// The report channel.
    pub fn report_channel(&self) -> &ReportChannel {
        &self.report
    }

    /// Run one audit cycle for an entity.
    ///
    /// Resolves the entity's backend (or the default), polls the review
    /// gate, writes through the driver, prunes when a record was
    /// written, and publishes one report. A veto terminates silently:
    /// no record, no prune, no report. Resolution and driver failures
    /// propagate to the caller; nothing after the failing step runs.
    pub async fn execute(&self, entity: &dyn Auditable) -> Result<()> {
        let backend = entity
            .audit_backend()
            .unwrap_or_else(|| self.registry.default_backend());
        let driver = self.registry.resolve(backend)?;

        if self.review.check(entity, driver.as_ref()) == ReviewOutcome::Vetoed {
            tracing::debug!(
                entity_type = entity.entity_type(),
                entity_id = %entity.entity_id(),
                backend,
                "audit vetoed by review"
            );
            return Ok(());
        }

        let record = driver.record(entity).await?;
        if record.is_some() {
            driver.prune(entity).await?;
        }

        tracing::info!(
            entity_type = entity.entity_type(),
            entity_id = %entity.entity_id(),
            backend,
            recorded = record.is_some(),
            "audit executed"
        );

        self.report.publish(entity, driver.as_ref(), record.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::driver::backends::MemoryDriver;
    use crate::driver::config::{AuditConfig, MemoryConfig};
    use crate::driver::interface::AuditDriver;
    use crate::entity::{AuditEvent, SnapshotEntity};
    use crate::hooks::ReviewDecision;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Driver that counts calls and optionally produces a record.
    struct CountingDriver {
        records: AtomicUsize,
        prunes: AtomicUsize,
        produce: bool,
        fail_record: bool,
    }

    impl CountingDriver {
        fn new(produce: bool) -> Arc<Self> {
            Arc::new(Self {
                records: AtomicUsize::new(0),
                prunes: AtomicUsize::new(0),
                produce,
                fail_record: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                records: AtomicUsize::new(0),
                prunes: AtomicUsize::new(0),
                produce: true,
                fail_record: true,
            })
        }
    }

    #[async_trait]
    impl AuditDriver for CountingDriver {
        async fn record(&self, entity: &dyn Auditable) -> Result<Option<AuditRecord>> {
            self.records.fetch_add(1, Ordering::SeqCst);
            if self.fail_record {
                return Err(Error::Storage("backing store unavailable".to_string()));
            }
            if self.produce {
                Ok(Some(AuditRecord::new(
                    entity.entity_type(),
                    &entity.entity_id(),
                    entity.audit_event(),
                )))
            } else {
                Ok(None)
            }
        }

        async fn prune(&self, _entity: &dyn Auditable) -> Result<()> {
            self.prunes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn kind(&self) -> &str {
            "counting"
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn orchestrator_with(driver: Arc<CountingDriver>) -> AuditOrchestrator {
        let config = AuditConfig::memory().with_default_backend("database");
        let mut registry = DriverRegistry::new(config);
        let handle = driver;
        registry.register("database", move |_config| {
            Ok(handle.clone() as Arc<dyn AuditDriver>)
        });
        AuditOrchestrator::new(registry)
    }

    fn changed_entity() -> SnapshotEntity {
        SnapshotEntity::new("users", "42", AuditEvent::Updated)
            .with_change("email", "a@example.com", "b@example.com")
    }

    #[tokio::test]
    async fn test_scenario_record_and_prune_with_report() {
        init_tracing();
        let driver = CountingDriver::new(true);
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = reports.clone();

        let orchestrator =
            orchestrator_with(driver.clone()).with_report_fn(move |_, _, record| {
                assert!(record.is_some());
                seen.fetch_add(1, Ordering::SeqCst);
            });

        orchestrator.execute(&changed_entity()).await.unwrap();

        assert_eq!(driver.records.load(Ordering::SeqCst), 1);
        assert_eq!(driver.prunes.load(Ordering::SeqCst), 1);
        assert_eq!(reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scenario_absent_record_skips_prune_but_reports() {
        let driver = CountingDriver::new(false);
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = reports.clone();

        let orchestrator =
            orchestrator_with(driver.clone()).with_report_fn(move |_, _, record| {
                assert!(record.is_none());
                seen.fetch_add(1, Ordering::SeqCst);
            });

        orchestrator.execute(&changed_entity()).await.unwrap();

        assert_eq!(driver.records.load(Ordering::SeqCst), 1);
        assert_eq!(driver.prunes.load(Ordering::SeqCst), 0);
        assert_eq!(reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scenario_veto_short_circuits_silently() {
        let driver = CountingDriver::new(true);
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = reports.clone();

        let orchestrator = orchestrator_with(driver.clone())
            .with_review_fn(|_, _| ReviewDecision::Veto)
            .with_report_fn(move |_, _, _| {
                seen.fetch_add(1, Ordering::SeqCst);
            });

        // A veto is a normal outcome, not an error.
        orchestrator.execute(&changed_entity()).await.unwrap();

        assert_eq!(driver.records.load(Ordering::SeqCst), 0);
        assert_eq!(driver.prunes.load(Ordering::SeqCst), 0);
        assert_eq!(reports.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scenario_unknown_backend_fails() {
        let orchestrator = orchestrator_with(CountingDriver::new(true));
        let entity = changed_entity().with_backend("nonexistent");

        let err = orchestrator.execute(&entity).await.unwrap_err();
        match err {
            Error::DriverNotFound(name) => assert_eq!(name, "nonexistent"),
            other => panic!("expected DriverNotFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_contract_violation_surfaces_before_any_write() {
        let driver = CountingDriver::new(true);
        let config = AuditConfig::memory();
        let mut registry = DriverRegistry::new(config);
        let handle = driver.clone();
        registry.register("database", move |_config| {
            Ok(handle.clone() as Arc<dyn AuditDriver>)
        });
        registry.register_external("acme::Broken", |_config| Ok(Box::new("not a driver")));

        let orchestrator = AuditOrchestrator::new(registry);
        let entity = changed_entity().with_backend("acme::Broken");

        let err = orchestrator.execute(&entity).await.unwrap_err();
        assert!(matches!(err, Error::InvalidDriverContract(_)));
        assert_eq!(driver.records.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_driver_failure_propagates_without_report() {
        let driver = CountingDriver::failing();
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = reports.clone();

        let orchestrator =
            orchestrator_with(driver.clone()).with_report_fn(move |_, _, _| {
                seen.fetch_add(1, Ordering::SeqCst);
            });

        let err = orchestrator.execute(&changed_entity()).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(driver.prunes.load(Ordering::SeqCst), 0);
        assert_eq!(reports.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pipeline_ordering() {
        init_tracing();

        // review strictly precedes record precedes prune precedes report
        let trace: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        struct TracingDriver {
            trace: Arc<Mutex<Vec<&'static str>>>,
        }

        #[async_trait]
        impl AuditDriver for TracingDriver {
            async fn record(&self, entity: &dyn Auditable) -> Result<Option<AuditRecord>> {
                self.trace.lock().unwrap().push("record");
                Ok(Some(AuditRecord::new(
                    entity.entity_type(),
                    &entity.entity_id(),
                    entity.audit_event(),
                )))
            }

            async fn prune(&self, _entity: &dyn Auditable) -> Result<()> {
                self.trace.lock().unwrap().push("prune");
                Ok(())
            }

            fn kind(&self) -> &str {
                "tracing"
            }
        }

        let config = AuditConfig::memory().with_default_backend("traced");
        let mut registry = DriverRegistry::new(config);
        let driver_trace = trace.clone();
        registry.register("traced", move |_config| {
            Ok(Arc::new(TracingDriver {
                trace: driver_trace.clone(),
            }) as Arc<dyn AuditDriver>)
        });

        let review_trace = trace.clone();
        let report_trace = trace.clone();
        let orchestrator = AuditOrchestrator::new(registry)
            .with_review_fn(move |_, _| {
                review_trace.lock().unwrap().push("review");
                ReviewDecision::Approve
            })
            .with_report_fn(move |_, _, _| {
                report_trace.lock().unwrap().push("report");
            });

        orchestrator.execute(&changed_entity()).await.unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["review", "record", "prune", "report"]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_with_memory_driver_and_retention() {
        let store = Arc::new(MemoryDriver::new(MemoryConfig { max_records: 0 }));

        let config = AuditConfig::memory().with_default_backend("shared");
        let mut registry = DriverRegistry::new(config);
        let handle = store.clone();
        registry.register("shared", move |_config| {
            Ok(handle.clone() as Arc<dyn AuditDriver>)
        });

        let orchestrator = AuditOrchestrator::new(registry);

        for n in 1..=3u32 {
            let entity = SnapshotEntity::new("users", "42", AuditEvent::Updated)
                .with_retention(2)
                .with_change("counter", n - 1, n);
            orchestrator.execute(&entity).await.unwrap();
        }

        // Retention capped the history at the two newest records.
        let kept = store.records_for("users", "42");
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].new_values.get("counter"), Some(&serde_json::json!(3)));
    }

    #[tokio::test]
    async fn test_execute_reuses_cached_driver() {
        static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

        let config = AuditConfig::memory().with_default_backend("once");
        let mut registry = DriverRegistry::new(config);
        registry.register("once", |_config| {
            CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MemoryDriver::default()) as Arc<dyn AuditDriver>)
        });

        let orchestrator = AuditOrchestrator::new(registry);
        orchestrator.execute(&changed_entity()).await.unwrap();
        orchestrator.execute(&changed_entity()).await.unwrap();

        assert_eq!(CONSTRUCTIONS.load(Ordering::SeqCst), 1);
    }
}
