//! Operation records: one entry per transaction attempt reported by the
//! gateway. `request_id` is the merge key — two records with the same
//! request id are the same real-world attempt observed at different times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in minor units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Human-readable form for audit notes, assuming a two-digit exponent.
    pub fn formatted(&self) -> String {
        format!(
            "{}.{:02} {}",
            self.amount / 100,
            (self.amount % 100).abs(),
            self.currency
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// Gateway transaction operation types, wire strings included.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperationType {
    #[serde(rename = "sale")]
    Sale,
    #[serde(rename = "auth")]
    Auth,
    #[serde(rename = "capture")]
    Capture,
    #[serde(rename = "cancel")]
    Cancel,
    #[serde(rename = "reversal")]
    Reversal,
    #[serde(rename = "refund")]
    Refund,
    #[serde(rename = "refund reverse")]
    RefundReverse,
    #[serde(rename = "recurring")]
    Recurring,
    #[serde(rename = "recurring update")]
    RecurringUpdate,
    #[serde(rename = "recurring cancel")]
    RecurringCancel,
    #[serde(rename = "manual change")]
    ManualChange,
    #[serde(rename = "account verification")]
    AccountVerification,
    #[serde(rename = "customer action")]
    CustomerAction,
    #[serde(rename = "payment confirmation")]
    PaymentConfirmation,
    #[serde(rename = "capture settlement")]
    CaptureSettlement,
    #[serde(rename = "commission")]
    Commission,
    #[serde(rename = "incremental")]
    Incremental,
    #[serde(rename = "invoice")]
    Invoice,
    #[serde(rename = "create_cash_voucher")]
    CreateCashVoucher,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Sale => "sale",
            OperationType::Auth => "auth",
            OperationType::Capture => "capture",
            OperationType::Cancel => "cancel",
            OperationType::Reversal => "reversal",
            OperationType::Refund => "refund",
            OperationType::RefundReverse => "refund reverse",
            OperationType::Recurring => "recurring",
            OperationType::RecurringUpdate => "recurring update",
            OperationType::RecurringCancel => "recurring cancel",
            OperationType::ManualChange => "manual change",
            OperationType::AccountVerification => "account verification",
            OperationType::CustomerAction => "customer action",
            OperationType::PaymentConfirmation => "payment confirmation",
            OperationType::CaptureSettlement => "capture settlement",
            OperationType::Commission => "commission",
            OperationType::Incremental => "incremental",
            OperationType::Invoice => "invoice",
            OperationType::CreateCashVoucher => "create_cash_voucher",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single operation as reported by the gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperationStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "decline")]
    Decline,
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "internal error")]
    InternalError,
    #[serde(rename = "external error")]
    ExternalError,
    #[serde(rename = "awaiting confirmation")]
    AwaitingConfirmation,
    #[serde(rename = "awaiting customer")]
    AwaitingCustomer,
    #[serde(rename = "external processing")]
    ExternalProcessing,
    #[serde(rename = "processing")]
    Processing,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Success => "success",
            OperationStatus::Decline => "decline",
            OperationStatus::Expired => "expired",
            OperationStatus::InternalError => "internal error",
            OperationStatus::ExternalError => "external error",
            OperationStatus::AwaitingConfirmation => "awaiting confirmation",
            OperationStatus::AwaitingCustomer => "awaiting customer",
            OperationStatus::ExternalProcessing => "external processing",
            OperationStatus::Processing => "processing",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transaction attempt within a payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationRecord {
    pub request_id: String,
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub status: OperationStatus,
    pub sum_initial: Money,
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationRecord {
    pub fn new(
        request_id: impl Into<String>,
        operation_type: OperationType,
        status: OperationStatus,
        sum_initial: Money,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            operation_type,
            status,
            sum_initial,
            created_at,
            code: None,
            message: None,
        }
    }
}
