//! Payment reconciliation domain: operation records, the payment
//! aggregate that merges them, status taxonomies and the cache-backed
//! provider.

pub mod aggregate;
pub mod operation;
pub mod provider;
pub mod snapshot;
pub mod status;
pub mod transition;

pub use aggregate::{PaymentAggregate, PaymentInfo};
pub use operation::{Money, OperationRecord, OperationStatus, OperationType};
pub use provider::PaymentStore;
pub use status::{PaymentAction, PaymentStatus};

use crate::error::GatewayResult;

/// Extension points fired while a payment status transition is applied.
/// Collaborators hook additional side effects here; implementations must
/// tolerate redelivery since callbacks arrive at least once.
pub trait PaymentHooks: Send + Sync {
    /// Fired before any transition bookkeeping, for the status being entered.
    fn on_status(&self, payment_id: &str, status: PaymentStatus) -> GatewayResult<()> {
        let _ = (payment_id, status);
        Ok(())
    }

    /// Fired for the exact old → new edge.
    fn on_status_edge(
        &self,
        payment_id: &str,
        old: PaymentStatus,
        new: PaymentStatus,
    ) -> GatewayResult<()> {
        let _ = (payment_id, old, new);
        Ok(())
    }

    /// Fired whenever the status changed, regardless of the edge.
    fn on_status_changed(
        &self,
        payment_id: &str,
        old: PaymentStatus,
        new: PaymentStatus,
    ) -> GatewayResult<()> {
        let _ = (payment_id, old, new);
        Ok(())
    }
}

/// Default hook set: no side effects.
pub struct NoopHooks;

impl PaymentHooks for NoopHooks {}
