//! # Chronicle - Audit-Trail Recording Layer
//!
//! A pluggable audit pipeline for entity changes:
//! - **Drivers**: named storage backends resolved through a registry
//! - **Review gate**: cancellable pre-write hook with veto semantics
//! - **Retention**: per-entity pruning of old records
//! - **Reports**: post-write broadcast of every audit outcome
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chronicle::{AuditConfig, AuditEvent, AuditOrchestrator, DriverRegistry, SnapshotEntity};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = DriverRegistry::new(AuditConfig::memory());
//!     let auditor = AuditOrchestrator::new(registry).with_report_fn(|entity, _driver, record| {
//!         println!("audited {}: recorded={}", entity.entity_type(), record.is_some());
//!     });
//!
//!     let change = SnapshotEntity::new("users", "42", AuditEvent::Updated)
//!         .with_actor("admin")
//!         .with_change("email", "old@example.com", "new@example.com");
//!
//!     auditor.execute(&change).await.unwrap();
//! }
//! ```

pub mod core;
pub mod driver;
pub mod entity;
pub mod hooks;
pub mod orchestrator;
pub mod record;

pub use crate::core::error::{Error, Result};
pub use driver::{AuditConfig, AuditDriver, DriverRegistry};
pub use entity::{AuditEvent, Auditable, SnapshotEntity};
pub use hooks::{ReportChannel, ReportSubscriber, ReviewDecision, ReviewGate, ReviewOutcome, ReviewSubscriber};
pub use orchestrator::AuditOrchestrator;
pub use record::{AuditRecord, RecordFilter, RecordId};
