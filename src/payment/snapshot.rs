//! Versioned cache snapshot of a payment aggregate.
//!
//! The cached form is an explicit DTO decoupled from the in-memory
//! aggregate, so a code change cannot poison previously cached entries: a
//! snapshot whose version or shape does not match is treated as a cache
//! miss.

use crate::gateway::types::ErrorEntry;
use crate::payment::aggregate::{PaymentAggregate, PaymentInfo};
use crate::payment::operation::OperationRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub version: u32,
    pub order_id: u64,
    pub payment_id: String,
    pub info: PaymentInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs: Option<JsonValue>,
    pub operations: Vec<OperationRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

impl PaymentSnapshot {
    pub fn capture(payment: &PaymentAggregate) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            order_id: payment.order_id(),
            payment_id: payment.payment_id().to_string(),
            info: payment.info().clone(),
            customer: payment.customer().cloned(),
            account: payment.account().cloned(),
            acs: payment.acs().cloned(),
            operations: payment.operations().to_vec(),
            errors: payment.errors().to_vec(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a cached snapshot. Corrupt JSON or a version mismatch is a
    /// cache miss, not an error.
    pub fn decode(raw: &str) -> Option<Self> {
        let snapshot: PaymentSnapshot = match serde_json::from_str(raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "cached payment snapshot corrupted");
                return None;
            }
        };

        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                version = snapshot.version,
                expected = SNAPSHOT_VERSION,
                "cached payment snapshot has unsupported version"
            );
            return None;
        }

        Some(snapshot)
    }

    pub fn restore(self) -> PaymentAggregate {
        PaymentAggregate::from_parts(
            self.order_id,
            self.payment_id,
            self.info,
            self.customer,
            self.account,
            self.acs,
            self.operations,
            self.errors,
        )
    }
}
