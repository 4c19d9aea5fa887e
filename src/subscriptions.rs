//! Subscription renewal charges.
//!
//! A renewal order is charged against the recurring (mandate) id that a
//! previous callback registered on the subscription. The charge outcome
//! itself arrives asynchronously as a `recurring` callback and goes
//! through the regular reconciliation path.

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::client::GatewayApi;
use crate::store::OrderStore;
use std::sync::Arc;
use tracing::info;

pub struct SubscriptionRenewer {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn GatewayApi>,
}

impl SubscriptionRenewer {
    pub fn new(store: Arc<dyn OrderStore>, gateway: Arc<dyn GatewayApi>) -> Self {
        Self { store, gateway }
    }

    /// Submit a renewal charge for the order; returns the gateway request
    /// id of the accepted charge.
    pub async fn renew(&self, order_id: u64, recurring_id: i64) -> GatewayResult<String> {
        let order = self
            .store
            .order(order_id)
            .ok_or_else(|| GatewayError::OrderNotFound {
                reference: order_id.to_string(),
            })?;

        let total = order.total();
        let response = self
            .gateway
            .recurring(&order.payment_id(), recurring_id, &total)
            .await?;

        let request_id = response.request_id.ok_or_else(|| {
            let message = response
                .errors
                .first()
                .map(|entry| entry.message.clone())
                .unwrap_or_else(|| {
                    "Renewal charge was not accepted by the gateway.".to_string()
                });
            GatewayError::api(message)
        })?;

        order.set_transaction_id(&request_id);
        order.add_note(&format!("Renewal payment submitted, request {request_id}."));
        info!(order_id, recurring_id, request_id = %request_id, "renewal charge submitted");

        Ok(request_id)
    }
}
