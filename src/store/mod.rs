//! Order persistence interface.
//!
//! The reconciliation core does not own orders, refunds or subscriptions;
//! it mutates them through these traits. The e-commerce platform supplies
//! the real implementation; [`memory`] supplies a Mutex-based one for
//! tests and cache-less demo deployments.

pub mod memory;

use crate::payment::operation::Money;
use crate::payment::status::PaymentStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Order lifecycle states of the hosting store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    OnHold,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gateway-side status of a refund record. Distinct from the parent
/// payment's status; `None` means the refund has not been submitted yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Initial,
    Completed,
    Failed,
}

/// One order, as far as the reconciliation core is concerned: a mutable
/// record of payment identifiers, gateway status meta and audit notes.
pub trait Order: Send + Sync {
    fn id(&self) -> u64;

    /// False when the backing record could not be loaded; status changes
    /// must then be skipped rather than fail.
    fn object_read(&self) -> bool {
        true
    }

    fn payment_id(&self) -> String;
    fn set_payment_id(&self, payment_id: &str);

    fn gateway_status(&self) -> PaymentStatus;
    fn set_gateway_status(&self, status: PaymentStatus);

    fn payment_system(&self) -> Option<String>;
    fn set_payment_system(&self, method: &str);

    fn set_transaction_id(&self, request_id: &str);
    fn set_transaction_order_id(&self, request_id: &str);

    fn status(&self) -> OrderStatus;
    fn update_status(&self, status: OrderStatus);

    /// Complete the payment lifecycle. Idempotent: returns true only when
    /// this call performed the transition.
    fn payment_complete(&self, request_id: &str) -> bool;

    fn add_note(&self, note: &str);

    /// Order total in minor units.
    fn total(&self) -> Money;
    /// Sum of all refunds already recorded, in minor units.
    fn total_refunded(&self) -> i64;

    /// True when the order was paid through this gateway.
    fn paid_via_gateway(&self) -> bool;

    fn increase_failed_payment_count(&self);

    fn refund_attempts(&self) -> u32;
    fn increase_refund_attempts(&self);

    fn contains_subscription(&self) -> bool;
}

/// A refund record owned by an order. Carries its own gateway payment id
/// and status; a refund without a gateway transaction id is "unprocessed".
pub trait Refund: Send + Sync {
    fn id(&self) -> u64;
    fn order_id(&self) -> u64;
    fn amount(&self) -> Money;

    fn payment_id(&self) -> Option<String>;
    fn set_payment_id(&self, payment_id: &str);

    fn transaction_id(&self) -> Option<String>;
    fn set_transaction_id(&self, request_id: &str);

    fn gateway_status(&self) -> Option<RefundStatus>;
    fn set_gateway_status(&self, status: RefundStatus);

    fn reason(&self) -> Option<String>;
    fn set_reason(&self, reason: &str);

    fn set_test(&self);

    fn is_processed(&self) -> bool {
        self.transaction_id().is_some()
    }
}

/// A subscription attached to an order; renewals need the gateway's
/// recurring (mandate) id.
pub trait Subscription: Send + Sync {
    fn id(&self) -> u64;
    fn set_recurring_id(&self, recurring_id: &str);
    fn cancel(&self);
}

/// Lookup surface over the platform's persistence.
pub trait OrderStore: Send + Sync {
    fn order(&self, order_id: u64) -> Option<Arc<dyn Order>>;
    fn order_by_payment_id(&self, payment_id: &str) -> Option<Arc<dyn Order>>;
    fn refund(&self, refund_id: u64) -> Option<Arc<dyn Refund>>;
    fn refunds(&self, order_id: u64) -> Vec<Arc<dyn Refund>>;
    fn subscriptions(&self, order_id: u64) -> Vec<Arc<dyn Subscription>>;

    /// Empty the shopping cart tied to the order's session, if any.
    fn clear_cart(&self, order_id: u64);
}
