//! Refund orchestration.
//!
//! An admin-initiated refund goes through three phases: `before_create`
//! gates and stamps the refund record, `process` submits it to the
//! gateway and poll-waits for confirmation, and the gateway's own refund
//! callback settles the record through `handle`. The poll is a soft
//! timeout: refunds still pending after the last attempt are reported as
//! accepted and finish via the callback.

use crate::config::{GatewayConfig, RefundSettings};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::client::GatewayApi;
use crate::gateway::types::CallbackInfo;
use crate::payment::operation::{Money, OperationStatus};
use crate::payment::provider::PaymentStore;
use crate::payment::status::{PaymentAction, PaymentStatus};
use crate::store::{Order, OrderStatus, OrderStore, Refund, RefundStatus};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct RefundOrchestrator {
    store: Arc<dyn OrderStore>,
    payments: Arc<PaymentStore>,
    gateway: Arc<dyn GatewayApi>,
    settings: RefundSettings,
    gateway_config: GatewayConfig,
}

impl RefundOrchestrator {
    pub fn new(
        store: Arc<dyn OrderStore>,
        payments: Arc<PaymentStore>,
        gateway: Arc<dyn GatewayApi>,
        settings: RefundSettings,
        gateway_config: GatewayConfig,
    ) -> Self {
        Self {
            store,
            payments,
            gateway,
            settings,
            gateway_config,
        }
    }

    /// Gate and stamp a refund record before it is persisted.
    ///
    /// Refunds that should not go through the gateway (flag unset, order
    /// paid elsewhere) pass silently. Orders outside processing/completed
    /// and payment states that disallow refunds are rejected.
    pub async fn before_create(
        &self,
        refund: &dyn Refund,
        refund_payment: bool,
    ) -> GatewayResult<()> {
        let order = self
            .store
            .order(refund.order_id())
            .ok_or_else(|| GatewayError::OrderNotFound {
                reference: refund.order_id().to_string(),
            })?;

        if !refund_payment || !order.paid_via_gateway() {
            return Ok(());
        }

        if !matches!(
            order.status(),
            OrderStatus::Processing | OrderStatus::Completed
        ) {
            return Err(GatewayError::logic(
                "Only orders with status processing or completed can be refunded.",
            ));
        }

        let payment = self.payments.load(order.as_ref(), false).await?;
        if !payment.is_action_allowed(PaymentAction::Refund) {
            return Err(GatewayError::logic(format!(
                "Refund is not allowed while the payment is {}.",
                payment.info().status
            )));
        }

        let mut payment_id = format!("{}_{}", order.payment_id(), order.refund_attempts() + 1);
        if self.gateway_config.test_mode {
            payment_id = format!(
                "{}&{}&{}",
                self.gateway_config.test_prefix, self.gateway_config.host, payment_id
            );
            refund.set_test();
        }
        refund.set_payment_id(&payment_id);
        refund.set_gateway_status(RefundStatus::Initial);
        order.increase_refund_attempts();

        Ok(())
    }

    /// Submit the order's pending refund to the gateway and wait for the
    /// confirmation, up to the configured poll budget.
    ///
    /// Returns `Ok(true)` when the refund succeeded or is still pending
    /// after the soft timeout; the refund callback settles the latter.
    pub async fn process(
        &self,
        order_id: u64,
        amount: Option<i64>,
        reason: Option<&str>,
    ) -> GatewayResult<bool> {
        let order = self
            .store
            .order(order_id)
            .ok_or_else(|| GatewayError::OrderNotFound {
                reference: order_id.to_string(),
            })?;

        let total = order.total();
        let amount = amount.unwrap_or(total.amount - order.total_refunded());
        if amount <= 0 {
            return Err(GatewayError::logic("Refund amount must be positive."));
        }

        let payment = self.payments.load(order.as_ref(), true).await?;
        let available = payment.balance().unwrap_or(total.amount);
        if amount > available {
            return Err(GatewayError::logic(format!(
                "Refund amount {} exceeds the payment balance {}.",
                Money::new(amount, &total.currency).formatted(),
                Money::new(available, &total.currency).formatted()
            )));
        }

        let refund = self
            .store
            .refunds(order_id)
            .into_iter()
            .find(|refund| !refund.is_processed())
            .ok_or_else(|| {
                GatewayError::logic("No refund awaiting processing was found for the order.")
            })?;

        if let Some(reason) = reason {
            refund.set_reason(reason);
        }

        let response = self
            .gateway
            .refund(refund.as_ref(), order.as_ref())
            .await?;
        let request_id = response.request_id.ok_or_else(|| {
            let message = response
                .errors
                .first()
                .map(|entry| entry.message.clone())
                .unwrap_or_else(|| "Refund request was not accepted by the gateway.".to_string());
            GatewayError::api(message)
        })?;

        refund.set_transaction_id(&request_id);
        refund.set_gateway_status(RefundStatus::Initial);
        info!(order_id, request_id = %request_id, "refund submitted");

        for _ in 0..self.settings.poll_attempts {
            match self
                .gateway
                .operation_status(order.as_ref(), &request_id)
                .await
            {
                Ok(Some(OperationStatus::Success)) => return Ok(true),
                Ok(Some(OperationStatus::Decline)) => {
                    return Err(GatewayError::logic(
                        "Refund was declined by the gateway.",
                    ));
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "refund status poll failed"),
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        info!(
            order_id,
            request_id = %request_id,
            "refund confirmation still pending, the callback will settle it"
        );
        Ok(true)
    }

    /// Sync the order's lifecycle status after a refund went through.
    pub async fn after_success(&self, refund_id: u64) -> GatewayResult<()> {
        let refund = self
            .store
            .refund(refund_id)
            .ok_or_else(|| GatewayError::logic(format!("Refund {refund_id} not found.")))?;
        let order = self
            .store
            .order(refund.order_id())
            .ok_or_else(|| GatewayError::OrderNotFound {
                reference: refund.order_id().to_string(),
            })?;

        let payment = self.payments.load(order.as_ref(), true).await?;
        match payment.info().status {
            PaymentStatus::PartiallyRefunded | PaymentStatus::PartiallyReversed => {
                order.update_status(OrderStatus::Processing);
            }
            PaymentStatus::Refunded | PaymentStatus::Reversed => {
                order.update_status(OrderStatus::Refunded);
            }
            other => {
                warn!(
                    refund_id,
                    status = %other,
                    "refund reported success but the payment is in an unexpected state"
                );
            }
        }
        Ok(())
    }

    /// Settle a refund from a gateway refund/reversal callback.
    pub async fn handle(
        &self,
        callback: &CallbackInfo,
        order: &dyn Order,
    ) -> GatewayResult<String> {
        let request_id = callback.operation.request_id.as_str();
        let refund = self
            .store
            .refunds(order.id())
            .into_iter()
            .find(|refund| refund.transaction_id().as_deref() == Some(request_id))
            .ok_or_else(|| GatewayError::RefundNotFound {
                request_id: request_id.to_string(),
            })?;

        let mut payment = self.payments.load(order, false).await?;
        payment.add_operation(callback.operation.clone());
        payment.set_info(callback.payment.clone(), order);

        match callback.payment.status {
            PaymentStatus::Refunded
            | PaymentStatus::Reversed
            | PaymentStatus::PartiallyRefunded
            | PaymentStatus::PartiallyReversed => {
                let amount = &callback.operation.sum_initial;
                let balance = payment.balance().unwrap_or(0);
                order.add_note(&format!(
                    "Refunded {}. Payment balance: {}.",
                    amount.formatted(),
                    Money::new(balance, &amount.currency).formatted()
                ));
                self.payments.save(&mut payment, order).await;

                refund.set_gateway_status(RefundStatus::Completed);
                append_refund_comment(
                    refund.as_ref(),
                    &format!("Refund completed at {}.", Utc::now().format("%Y-%m-%d %H:%M:%S")),
                );
                Ok("Refund completed".to_string())
            }
            PaymentStatus::Processing | PaymentStatus::ExternalProcessing => {
                self.payments.save(&mut payment, order).await;
                Ok("Refund is in progress".to_string())
            }
            other => {
                self.payments.save(&mut payment, order).await;
                refund.set_gateway_status(RefundStatus::Failed);
                for entry in &callback.errors {
                    error!(
                        code = entry.code,
                        message = %entry.message,
                        "refund rejected by the gateway"
                    );
                }
                order.add_note(&format!(
                    "Refund failed, payment status is {}.",
                    other.display_name()
                ));
                Ok("Refund failed".to_string())
            }
        }
    }
}

/// Append an audit comment to the refund reason, ` | ` separated.
fn append_refund_comment(refund: &dyn Refund, comment: &str) {
    match refund.reason() {
        Some(reason) if !reason.trim().is_empty() => {
            refund.set_reason(&format!("{reason} | {comment}"));
        }
        _ => refund.set_reason(comment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryRefund;

    #[test]
    fn refund_comments_are_appended_with_a_separator() {
        let refund = MemoryRefund::new(1, 1, Money::new(100, "USD"));
        append_refund_comment(&refund, "Refund completed at 2026-01-01 00:00:00.");
        assert_eq!(
            refund.reason().as_deref(),
            Some("Refund completed at 2026-01-01 00:00:00.")
        );

        refund.set_reason("Requested by customer");
        append_refund_comment(&refund, "Refund completed.");
        assert_eq!(
            refund.reason().as_deref(),
            Some("Requested by customer | Refund completed.")
        );
    }
}
