//! Wire shapes exchanged with the FLASHPAY API and its callbacks.
//!
//! Customer, account and acs blocks are opaque pass-through JSON: the
//! reconciliation core stores them verbatim and never interprets them.

use crate::payment::aggregate::PaymentInfo;
use crate::payment::operation::OperationRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One error entry reported by the gateway alongside a payment or
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEntry {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorEntry {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            description: None,
        }
    }
}

/// Recurring (mandate) registration data attached to a callback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringInfo {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_thru: Option<String>,
}

/// Body of an inbound gateway callback, after the signature envelope has
/// been verified and stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackInfo {
    pub operation: OperationRecord,
    pub payment: PaymentInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurringInfo>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

impl CallbackInfo {
    /// Gateway payment id the callback refers to. Absent on malformed
    /// callbacks.
    pub fn payment_id(&self) -> Option<&str> {
        self.payment.id.as_deref()
    }
}

/// Response of the payment status endpoint. All blocks are optional: a
/// declined lookup still carries errors and sometimes partial payment
/// info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acs: Option<JsonValue>,
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// Response of the single-operation lookup endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationStatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// Response of the refund endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefundResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// Response of the recurring (renewal) endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}
