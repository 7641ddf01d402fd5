//! Pre- and post-audit hooks.
//!
//! The cancellable review gate and the fire-and-forget report channel.

pub mod report;
pub mod review;

pub use report::{ReportChannel, ReportSubscriber};
pub use review::{ReviewDecision, ReviewGate, ReviewOutcome, ReviewSubscriber};
