//! Pending payment status transition, applied by
//! [`PaymentAggregate::status_transition`](super::aggregate::PaymentAggregate::status_transition).

use crate::payment::status::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub old: PaymentStatus,
    pub new: PaymentStatus,
    pub note: String,
}

impl StatusTransition {
    pub fn new(old: PaymentStatus, new: PaymentStatus, note: impl Into<String>) -> Self {
        Self {
            old,
            new,
            note: note.into(),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}
