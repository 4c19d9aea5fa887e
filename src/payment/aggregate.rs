//! The payment aggregate: one order's payment identifier plus the full
//! transaction history accumulated from status fetches and callbacks.
//!
//! Callbacks are delivered at least once and possibly out of order, so
//! [`PaymentAggregate::add_operation`] implements an idempotent,
//! order-insensitive merge keyed by request id with timestamp
//! tie-breaking. The operations list is monotonic: it never shrinks,
//! entries are only updated in place or appended.

use crate::error::GatewayResult;
use crate::gateway::types::ErrorEntry;
use crate::payment::operation::{OperationRecord, OperationStatus, OperationType};
use crate::payment::status::{PaymentAction, PaymentStatus};
use crate::payment::transition::StatusTransition;
use crate::payment::PaymentHooks;
use crate::store::Order;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};

use super::operation::Money;

/// Payment-level information "as of last sync" with the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<Money>,
}

impl PaymentInfo {
    pub fn initial() -> Self {
        Self {
            id: None,
            status: PaymentStatus::Initial,
            method: Some("Not selected".to_string()),
            sum: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentAggregate {
    order_id: u64,
    payment_id: String,
    info: PaymentInfo,
    customer: Option<JsonValue>,
    account: Option<JsonValue>,
    acs: Option<JsonValue>,
    operations: Vec<OperationRecord>,
    errors: Vec<ErrorEntry>,
    pending_transition: Option<StatusTransition>,
}

impl PaymentAggregate {
    pub fn new(order: &dyn Order) -> Self {
        Self {
            order_id: order.id(),
            payment_id: order.payment_id(),
            info: PaymentInfo::initial(),
            customer: None,
            account: None,
            acs: None,
            operations: Vec::new(),
            errors: Vec::new(),
            pending_transition: None,
        }
    }

    /// Blank aggregate for an order that never had a payment attempt.
    pub fn stub(order: &dyn Order) -> Self {
        let mut payment = Self::new(order);
        payment.set_info(PaymentInfo::initial(), order);
        payment
    }

    pub(crate) fn from_parts(
        order_id: u64,
        payment_id: String,
        info: PaymentInfo,
        customer: Option<JsonValue>,
        account: Option<JsonValue>,
        acs: Option<JsonValue>,
        operations: Vec<OperationRecord>,
        errors: Vec<ErrorEntry>,
    ) -> Self {
        Self {
            order_id,
            payment_id,
            info,
            customer,
            account,
            acs,
            operations,
            errors,
            pending_transition: None,
        }
    }

    pub fn order_id(&self) -> u64 {
        self.order_id
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn info(&self) -> &PaymentInfo {
        &self.info
    }

    pub fn customer(&self) -> Option<&JsonValue> {
        self.customer.as_ref()
    }

    pub fn set_customer(&mut self, customer: Option<JsonValue>) {
        self.customer = customer;
    }

    pub fn account(&self) -> Option<&JsonValue> {
        self.account.as_ref()
    }

    pub fn set_account(&mut self, account: Option<JsonValue>) {
        self.account = account;
    }

    pub fn acs(&self) -> Option<&JsonValue> {
        self.acs.as_ref()
    }

    pub fn set_acs(&mut self, acs: Option<JsonValue>) {
        self.acs = acs;
    }

    pub fn operations(&self) -> &[OperationRecord] {
        &self.operations
    }

    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: Vec<ErrorEntry>) {
        self.errors = errors;
    }

    /// Update payment info and stage the matching status transition.
    pub fn set_info(&mut self, info: PaymentInfo, order: &dyn Order) {
        let status = info.status;
        self.info = info;
        self.set_status(order, status, "");
    }

    /// Merge one operation into the history.
    ///
    /// Merge contract, per request id:
    /// - existing record without a timestamp is treated as stale and is
    ///   unconditionally replaced;
    /// - an incoming record without a timestamp never replaces a dated one;
    /// - a strictly newer existing timestamp wins (out-of-order delivery
    ///   is discarded); equal timestamps are last-write-wins;
    /// - unknown request ids are appended.
    pub fn add_operation(&mut self, operation: OperationRecord) {
        for origin in self.operations.iter_mut() {
            if origin.request_id != operation.request_id {
                continue;
            }

            let Some(origin_date) = origin.created_at else {
                debug!(
                    request_id = %operation.request_id,
                    "existing operation has no date, replacing"
                );
                *origin = operation;
                return;
            };

            let Some(incoming_date) = operation.created_at else {
                debug!(
                    request_id = %operation.request_id,
                    "incoming operation has no date, keeping existing record"
                );
                return;
            };

            if origin_date > incoming_date {
                debug!(
                    request_id = %operation.request_id,
                    %origin_date,
                    %incoming_date,
                    "incoming operation is stale, discarding"
                );
                return;
            }

            *origin = operation;
            return;
        }

        debug!(request_id = %operation.request_id, "operation added to payment");
        self.operations.push(operation);
    }

    pub fn merge_operations(&mut self, operations: Vec<OperationRecord>) {
        for operation in operations {
            self.add_operation(operation);
        }
    }

    pub fn operation_by_request(&self, request_id: &str) -> Option<&OperationRecord> {
        self.operations
            .iter()
            .find(|operation| operation.request_id == request_id)
    }

    /// Most recent successful operation; when none succeeded yet, the
    /// earliest operation on record.
    pub fn last_operation(&self) -> Option<&OperationRecord> {
        self.operations
            .iter()
            .rev()
            .find(|operation| operation.status == OperationStatus::Success)
            .or_else(|| self.first_operation())
    }

    /// Operation with the earliest creation date; records without a date
    /// sort first, ties keep list order.
    pub fn first_operation(&self) -> Option<&OperationRecord> {
        self.operations
            .iter()
            .min_by_key(|operation| operation.created_at)
    }

    /// Request id of the payment's defining operation.
    pub fn request_id(&self) -> Option<&str> {
        self.last_operation()
            .map(|operation| operation.request_id.as_str())
    }

    pub fn operation_status(&self) -> Option<OperationStatus> {
        self.last_operation().map(|operation| operation.status)
    }

    /// Current balance from the last synced payment info, minor units.
    pub fn balance(&self) -> Option<i64> {
        self.info.sum.as_ref().map(|sum| sum.amount)
    }

    /// Amount still held on an auth/recurring operation, or `None` when
    /// no hold exists to compute against.
    pub fn remaining_balance(&self) -> Option<i64> {
        let hold = self.operations.iter().find(|operation| {
            matches!(
                operation.operation_type,
                OperationType::Auth | OperationType::Recurring
            )
        })?;

        let initial = hold.sum_initial.amount;
        let balance = self.balance().unwrap_or(0);
        if balance > 0 {
            Some(initial - balance)
        } else {
            Some(initial)
        }
    }

    /// Whether `action` is permitted from the current payment status.
    /// Captures against a partially consumed hold stay allowed even
    /// though "awaiting capture" is not in the action's state table.
    pub fn is_action_allowed(&self, action: PaymentAction) -> bool {
        let state = self.info.status;

        if state == PaymentStatus::AwaitingCapture
            && self.remaining_balance().unwrap_or(0) > 0
            && action != PaymentAction::Cancel
        {
            return true;
        }

        action.allowed_states().contains(&state)
    }

    /// Error codes carried by the payment, falling back to the defining
    /// operation's code.
    pub fn error_codes(&self) -> Vec<i64> {
        if !self.errors.is_empty() {
            return self.errors.iter().map(|entry| entry.code).collect();
        }
        self.last_operation()
            .and_then(|operation| operation.code)
            .into_iter()
            .collect()
    }

    pub fn error_messages(&self) -> Vec<String> {
        if !self.errors.is_empty() {
            return self
                .errors
                .iter()
                .map(|entry| entry.message.clone())
                .collect();
        }
        self.last_operation()
            .and_then(|operation| operation.message.clone())
            .into_iter()
            .collect()
    }

    /// Stage a status transition. Persisting happens in
    /// [`status_transition`](Self::status_transition); this call never fails —
    /// an unreadable order aborts the staging with a log line.
    pub fn set_status(&mut self, order: &dyn Order, new_status: PaymentStatus, note: &str) {
        debug!(payment_id = %self.payment_id, status = %new_status, "setting payment status");

        if !order.object_read() {
            warn!(
                order_id = order.id(),
                "order object could not be read, status change skipped"
            );
            return;
        }

        let old_status = order.gateway_status();
        let transition = StatusTransition::new(old_status, new_status, note);
        let changed = transition.is_changed();
        self.pending_transition = Some(transition);

        if !changed {
            debug!(status = %new_status, "old and new payment status are identical");
            return;
        }

        order.set_gateway_status(new_status);
    }

    /// Apply the staged transition: emit the audit note and fire the
    /// extension hooks. Consumes the pending transition, so repeated
    /// calls are no-ops. Hook failures are downgraded to an order note —
    /// this path runs inside callback handling and must never abort the
    /// HTTP 200 acknowledgment.
    pub fn status_transition(&mut self, order: &dyn Order, hooks: &dyn PaymentHooks) {
        let Some(transition) = self.pending_transition.take() else {
            debug!(payment_id = %self.payment_id, "no pending status transition");
            return;
        };

        let result = self.apply_transition(&transition, order, hooks);

        if let Err(err) = result {
            error!(
                payment_id = %self.payment_id,
                error = %err,
                "payment status transition errored"
            );
            order.add_note(&format!(
                "Error during payment status transition. {err}"
            ));
        }
    }

    fn apply_transition(
        &self,
        transition: &StatusTransition,
        order: &dyn Order,
        hooks: &dyn PaymentHooks,
    ) -> GatewayResult<()> {
        hooks.on_status(&self.payment_id, transition.new)?;

        if !transition.is_changed() {
            return Ok(());
        }

        hooks.on_status_edge(&self.payment_id, transition.old, transition.new)?;
        hooks.on_status_changed(&self.payment_id, transition.old, transition.new)?;

        let message = format!(
            "Payment status changed from {} to {}.",
            transition.old.display_name(),
            transition.new.display_name()
        );
        order.add_note(format!("{} {}", transition.note, message).trim());

        Ok(())
    }
}
