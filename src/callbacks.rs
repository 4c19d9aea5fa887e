//! Reconciliation of inbound gateway callbacks.
//!
//! Callbacks arrive at least once, possibly out of order, and always
//! after the signature gate. The reconciler resolves the order by the
//! callback's payment id, folds the operation into the cached aggregate
//! and drives the order lifecycle from the payment/operation status pair.
//! Unknown orders terminate the request without mutating anything.

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::types::CallbackInfo;
use crate::payment::aggregate::PaymentAggregate;
use crate::payment::operation::{OperationStatus, OperationType};
use crate::payment::provider::PaymentStore;
use crate::payment::status::PaymentStatus;
use crate::refund::RefundOrchestrator;
use crate::store::{Order, OrderStatus, OrderStore};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct CallbackReconciler {
    store: Arc<dyn OrderStore>,
    payments: Arc<PaymentStore>,
    refunds: Arc<RefundOrchestrator>,
}

impl CallbackReconciler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        payments: Arc<PaymentStore>,
        refunds: Arc<RefundOrchestrator>,
    ) -> Self {
        Self {
            store,
            payments,
            refunds,
        }
    }

    /// Process one verified callback; the returned string becomes the
    /// HTTP 200 response body.
    pub async fn process(&self, callback: CallbackInfo) -> GatewayResult<String> {
        let payment_id = callback
            .payment_id()
            .ok_or_else(|| GatewayError::logic("Callback carries no payment id."))?;

        let order = match self.store.order_by_payment_id(payment_id) {
            Some(order) => order,
            None => {
                for entry in &callback.errors {
                    error!(
                        code = entry.code,
                        message = %entry.message,
                        "error entry on a callback for an unknown order"
                    );
                }
                return Err(GatewayError::OrderNotFound {
                    reference: payment_id.to_string(),
                });
            }
        };

        self.store.clear_cart(order.id());
        self.stamp_payment_method(&callback, order.as_ref());

        info!(
            order_id = order.id(),
            operation = %callback.operation.operation_type,
            operation_status = %callback.operation.status,
            payment_status = %callback.payment.status,
            "processing gateway callback"
        );

        match callback.operation.operation_type {
            OperationType::Sale
            | OperationType::Recurring
            | OperationType::PaymentConfirmation => {
                let mut payment = self.update_payment(&callback, order.as_ref()).await?;
                self.update_subscriptions(&callback, order.as_ref());
                self.process_status(&callback, order.as_ref(), &mut payment)
                    .await
            }
            OperationType::AccountVerification => {
                let mut payment = self.update_payment(&callback, order.as_ref()).await?;
                self.update_subscriptions(&callback, order.as_ref());
                order.set_transaction_order_id(&callback.operation.request_id);
                self.process_status(&callback, order.as_ref(), &mut payment)
                    .await
            }
            OperationType::Refund | OperationType::Reversal => {
                self.refunds.handle(&callback, order.as_ref()).await
            }
            OperationType::RecurringCancel => {
                let mut payment = self.update_payment(&callback, order.as_ref()).await?;
                for subscription in self.store.subscriptions(order.id()) {
                    subscription.cancel();
                }
                order.add_note("Recurring profile was cancelled on the gateway side.");
                self.payments.save(&mut payment, order.as_ref()).await;
                Ok("Recurring profile cancelled".to_string())
            }
            other => {
                warn!(operation = %other, "unsupported callback operation type");
                Ok(format!("Not supported operation type: {other}"))
            }
        }
    }

    /// Fold the callback into the cached payment aggregate.
    async fn update_payment(
        &self,
        callback: &CallbackInfo,
        order: &dyn Order,
    ) -> GatewayResult<PaymentAggregate> {
        let mut payment = self.payments.load(order, false).await?;
        payment.add_operation(callback.operation.clone());
        payment.set_info(callback.payment.clone(), order);
        if callback.customer.is_some() {
            payment.set_customer(callback.customer.clone());
        }
        if callback.account.is_some() {
            payment.set_account(callback.account.clone());
        }
        if callback.acs.is_some() {
            payment.set_acs(callback.acs.clone());
        }
        payment.set_errors(callback.errors.clone());
        Ok(payment)
    }

    /// Propagate the recurring (mandate) id onto the order's
    /// subscriptions.
    fn update_subscriptions(&self, callback: &CallbackInfo, order: &dyn Order) {
        if !order.contains_subscription() {
            return;
        }

        match &callback.recurring {
            Some(recurring) => {
                let recurring_id = recurring.id.to_string();
                for subscription in self.store.subscriptions(order.id()) {
                    subscription.set_recurring_id(&recurring_id);
                }
            }
            None => warn!(
                order_id = order.id(),
                "callback for a subscription order carries no recurring block"
            ),
        }
    }

    fn stamp_payment_method(&self, callback: &CallbackInfo, order: &dyn Order) {
        if let Some(method) = &callback.payment.method {
            order.set_payment_system(method);
        }
    }

    /// The two-level status machine: payment-level states that need order
    /// action first, then the operation outcome.
    async fn process_status(
        &self,
        callback: &CallbackInfo,
        order: &dyn Order,
        payment: &mut PaymentAggregate,
    ) -> GatewayResult<String> {
        let request_id = callback.operation.request_id.as_str();

        let response = match callback.payment.status {
            PaymentStatus::AwaitingConfirmation => {
                order.set_transaction_id(request_id);
                order.update_status(OrderStatus::OnHold);
                "Payment is on hold"
            }
            PaymentStatus::AwaitingCustomer => {
                self.decline(order, request_id);
                "Payment failed"
            }
            PaymentStatus::ExternalProcessing => "Waiting for the external processor",
            _ => match callback.operation.status {
                OperationStatus::Success => {
                    self.complete(callback, order, request_id);
                    "Payment completed"
                }
                OperationStatus::Decline
                | OperationStatus::Expired
                | OperationStatus::InternalError
                | OperationStatus::ExternalError => {
                    self.decline(order, request_id);
                    "Payment failed"
                }
                _ => "Callback processed",
            },
        };

        self.payments.save(payment, order).await;
        Ok(response.to_string())
    }

    fn complete(&self, callback: &CallbackInfo, order: &dyn Order, request_id: &str) {
        let transitioned = order.payment_complete(request_id);
        if !transitioned {
            return;
        }

        // The discrepancy note is tied to the actual completion so that
        // redelivered callbacks do not repeat it.
        let total = order.total();
        let sum = &callback.operation.sum_initial;
        if sum.amount != total.amount || sum.currency != total.currency {
            order.add_note(&format!(
                "Callback amount {} does not match the order total {}.",
                sum.formatted(),
                total.formatted()
            ));
        }
    }

    fn decline(&self, order: &dyn Order, request_id: &str) {
        order.set_transaction_id(request_id);
        order.update_status(OrderStatus::Failed);
        order.increase_failed_payment_count();
    }
}
