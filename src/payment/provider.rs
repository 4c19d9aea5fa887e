//! Cache-backed access to payment aggregates.
//!
//! `PaymentStore` is the one place that decides where a payment comes
//! from: the snapshot cache when it holds a usable entry, otherwise the
//! gateway status API. Every load ends with a save, so the cache always
//! reflects the freshest state this process has seen.

use crate::cache::keys::payment::{snapshot_pattern, SnapshotKey};
use crate::cache::PaymentCache;
use crate::config::CacheSettings;
use crate::error::GatewayResult;
use crate::gateway::client::GatewayApi;
use crate::payment::aggregate::PaymentAggregate;
use crate::payment::snapshot::PaymentSnapshot;
use crate::payment::status::PaymentStatus;
use crate::payment::{NoopHooks, PaymentHooks};
use crate::store::Order;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct PaymentStore {
    gateway: Arc<dyn GatewayApi>,
    cache: Arc<dyn PaymentCache>,
    settings: CacheSettings,
    hooks: Arc<dyn PaymentHooks>,
}

impl PaymentStore {
    pub fn new(
        gateway: Arc<dyn GatewayApi>,
        cache: Arc<dyn PaymentCache>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            gateway,
            cache,
            settings,
            hooks: Arc::new(NoopHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn PaymentHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Load the payment aggregate for an order.
    ///
    /// `reload` bypasses the cache and forces a gateway round trip. A
    /// corrupt or unreadable cache entry falls through to the gateway as
    /// well. Orders that never left the INITIAL state get a stub without
    /// touching the API.
    pub async fn load(
        &self,
        order: &dyn Order,
        reload: bool,
    ) -> GatewayResult<PaymentAggregate> {
        let payment_id = order.payment_id();
        let key = SnapshotKey::new(&payment_id).to_string();

        if self.settings.enabled && !reload {
            match self.cache.get(&key).await {
                Ok(Some(raw)) => {
                    if let Some(snapshot) = PaymentSnapshot::decode(&raw) {
                        debug!(payment_id = %payment_id, "payment served from cache");
                        return Ok(snapshot.restore());
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(error = %err, "payment cache read failed"),
            }
        }

        let mut payment = if order.gateway_status() == PaymentStatus::Initial {
            PaymentAggregate::stub(order)
        } else {
            self.fetch(order).await?
        };

        self.save(&mut payment, order).await;
        Ok(payment)
    }

    async fn fetch(&self, order: &dyn Order) -> GatewayResult<PaymentAggregate> {
        let response = self.gateway.status(order).await?;
        let mut payment = PaymentAggregate::new(order);

        // A lookup that failed on the gateway side can still carry partial
        // payment info worth keeping next to the errors.
        if let Some(info) = response.payment {
            payment.set_info(info, order);
        }
        payment.set_customer(response.customer);
        payment.set_acs(response.acs);
        payment.set_account(response.account);
        payment.merge_operations(response.operations);
        payment.set_errors(response.errors);

        Ok(payment)
    }

    /// Apply the staged status transition, then persist the snapshot.
    /// Cache failures are logged and noted on the order, never propagated.
    pub async fn save(&self, payment: &mut PaymentAggregate, order: &dyn Order) {
        payment.status_transition(order, self.hooks.as_ref());

        if !self.settings.enabled {
            return;
        }

        let key = SnapshotKey::new(payment.payment_id()).to_string();
        let encoded = match PaymentSnapshot::capture(payment).encode() {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(error = %err, "failed to encode payment snapshot");
                order.add_note("Failed to store payment state.");
                return;
            }
        };

        if let Err(err) = self.cache.set(&key, &encoded, self.settings.ttl).await {
            warn!(error = %err, "payment cache write failed");
            order.add_note("Failed to store payment state.");
        }
    }

    /// Drop every cached snapshot regardless of TTL.
    pub async fn flush(&self) -> GatewayResult<u64> {
        Ok(self.cache.delete_matching(&snapshot_pattern()).await?)
    }
}
