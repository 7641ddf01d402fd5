//! Review gate.
//!
//! Cancellable pre-write hook: subscribers are polled in order and any
//! veto stops the audit before the driver runs.

use crate::driver::interface::AuditDriver;
use crate::entity::Auditable;
use std::sync::Arc;

/// A subscriber's answer to a review request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Let the audit proceed
    Approve,
    /// Stop the audit
    Veto,
    /// No opinion; collapses to proceed
    Abstain,
}

/// Outcome of polling all subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// No subscriber objected
    Proceed,
    /// At least one subscriber vetoed
    Vetoed,
}

/// A party consulted before each audit write.
pub trait ReviewSubscriber: Send + Sync {
    /// Review a pending audit.
    fn review(&self, entity: &dyn Auditable, driver: &dyn AuditDriver) -> ReviewDecision;
}

struct FnReviewSubscriber<F>(F);

impl<F> ReviewSubscriber for FnReviewSubscriber<F>
where
    F: Fn(&dyn Auditable, &dyn AuditDriver) -> ReviewDecision + Send + Sync,
{
    fn review(&self, entity: &dyn Auditable, driver: &dyn AuditDriver) -> ReviewDecision {
        (self.0)(entity, driver)
    }
}

/// Ordered list of review subscribers with veto semantics.
#[derive(Default)]
pub struct ReviewGate {
    /// Subscribers, polled in registration order
    subscribers: Vec<Arc<dyn ReviewSubscriber>>,
}

impl ReviewGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&mut self, subscriber: Arc<dyn ReviewSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Add a closure subscriber.
    pub fn subscribe_fn<F>(&mut self, review: F)
    where
        F: Fn(&dyn Auditable, &dyn AuditDriver) -> ReviewDecision + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnReviewSubscriber(review)));
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Poll subscribers in order, stopping at the first veto.
    ///
    /// With no subscribers, or none objecting, the outcome is Proceed.
    pub fn check(&self, entity: &dyn Auditable, driver: &dyn AuditDriver) -> ReviewOutcome {
        for subscriber in &self.subscribers {
            if subscriber.review(entity, driver) == ReviewDecision::Veto {
                return ReviewOutcome::Vetoed;
            }
        }
        ReviewOutcome::Proceed
    }
}
