//! Payment-level status taxonomy and the allowed-action matrix.
//!
//! Payment status is distinct from operation status: it describes the
//! payment as a whole ("as of last sync") and drives the mapping onto
//! order lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    #[serde(rename = "initial")]
    Initial,
    #[serde(rename = "awaiting confirmation")]
    AwaitingConfirmation,
    #[serde(rename = "awaiting customer")]
    AwaitingCustomer,
    #[serde(rename = "awaiting capture")]
    AwaitingCapture,
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "decline")]
    Decline,
    #[serde(rename = "decline renewal")]
    DeclineRenewal,
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "internal error")]
    InternalError,
    #[serde(rename = "external error")]
    ExternalError,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "external processing")]
    ExternalProcessing,
    #[serde(rename = "partially refunded")]
    PartiallyRefunded,
    #[serde(rename = "partially reversed")]
    PartiallyReversed,
    #[serde(rename = "refunded")]
    Refunded,
    #[serde(rename = "reversed")]
    Reversed,
}

impl PaymentStatus {
    /// Localizable display name used when composing audit notes.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentStatus::Initial => "Initial",
            PaymentStatus::AwaitingConfirmation => "Awaiting confirmation",
            PaymentStatus::AwaitingCustomer => "Awaiting customer",
            PaymentStatus::AwaitingCapture => "Awaiting capture",
            PaymentStatus::Success => "Success",
            PaymentStatus::Decline => "Decline",
            PaymentStatus::DeclineRenewal => "Decline renewal",
            PaymentStatus::Expired => "Expired",
            PaymentStatus::InternalError => "Internal error",
            PaymentStatus::ExternalError => "External error",
            PaymentStatus::Processing => "Processing",
            PaymentStatus::ExternalProcessing => "External processing",
            PaymentStatus::PartiallyRefunded => "Partially refunded",
            PaymentStatus::PartiallyReversed => "Partially reversed",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::Reversed => "Reversed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Actions whose availability depends on the current payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentAction {
    Refund,
    Renew,
    Cancel,
}

impl PaymentAction {
    /// Payment statuses from which the action is permitted.
    pub fn allowed_states(&self) -> &'static [PaymentStatus] {
        match self {
            PaymentAction::Refund => &[
                PaymentStatus::PartiallyRefunded,
                PaymentStatus::PartiallyReversed,
                PaymentStatus::Success,
            ],
            PaymentAction::Renew => &[PaymentStatus::AwaitingCapture],
            PaymentAction::Cancel => &[PaymentStatus::AwaitingCapture],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_is_only_allowed_from_refundable_states() {
        let allowed = PaymentAction::Refund.allowed_states();
        assert!(allowed.contains(&PaymentStatus::Success));
        assert!(allowed.contains(&PaymentStatus::PartiallyRefunded));
        assert!(!allowed.contains(&PaymentStatus::Processing));
        assert!(!allowed.contains(&PaymentStatus::Refunded));
    }

    #[test]
    fn payment_status_round_trips_wire_strings() {
        let parsed: PaymentStatus =
            serde_json::from_str("\"partially refunded\"").expect("should deserialize");
        assert_eq!(parsed, PaymentStatus::PartiallyRefunded);
        assert_eq!(
            serde_json::to_string(&PaymentStatus::AwaitingCapture).expect("should serialize"),
            "\"awaiting capture\""
        );
    }
}
