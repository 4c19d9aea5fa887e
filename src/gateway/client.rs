//! HTTP client for the FLASHPAY payment API.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::types::{
    OperationStatusResponse, RecurringResponse, RefundResponse, StatusResponse,
};
use crate::payment::operation::{Money, OperationStatus};
use crate::signature::SignatureVerifier;
use crate::store::{Order, Refund};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::debug;

pub const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operations the reconciliation core needs from the gateway. Behind a
/// trait so tests can substitute a scripted gateway.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Full payment state for the order's payment id.
    async fn status(&self, order: &dyn Order) -> GatewayResult<StatusResponse>;

    /// Status of a single operation, by gateway request id. `None` when
    /// the gateway does not know the operation yet.
    async fn operation_status(
        &self,
        order: &dyn Order,
        request_id: &str,
    ) -> GatewayResult<Option<OperationStatus>>;

    async fn refund(
        &self,
        refund: &dyn Refund,
        order: &dyn Order,
    ) -> GatewayResult<RefundResponse>;

    /// Charge a renewal against a registered recurring (mandate) id.
    async fn recurring(
        &self,
        payment_id: &str,
        recurring_id: i64,
        amount: &Money,
    ) -> GatewayResult<RecurringResponse>;

    async fn recurring_cancel(&self, recurring_id: i64) -> GatewayResult<()>;
}

pub struct FlashpayClient {
    config: GatewayConfig,
    client: Client,
    signer: Arc<dyn SignatureVerifier>,
}

impl FlashpayClient {
    pub fn new(
        config: GatewayConfig,
        signer: Arc<dyn SignatureVerifier>,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| GatewayError::Network {
                message: format!("failed to initialize HTTP client: {err}"),
            })?;

        Ok(Self {
            config,
            client,
            signer,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.payment_base_url(), path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        mut payload: JsonValue,
    ) -> GatewayResult<T> {
        self.signer.sign(&mut payload)?;
        let url = self.endpoint(path);
        debug!(%url, "gateway request");

        let response = self
            .client
            .post(&url)
            .header("X-Client-Name", CLIENT_NAME)
            .header("X-Client-Version", CLIENT_VERSION)
            .json(&payload)
            .send()
            .await
            .map_err(|err| GatewayError::Network {
                message: format!("gateway request failed: {err}"),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GatewayError::api_with_context(
                format!("HTTP {status}"),
                url,
                text,
            ));
        }

        serde_json::from_str::<T>(&text).map_err(|err| {
            GatewayError::api_with_context(
                format!("invalid gateway JSON response: {err}"),
                url,
                text,
            )
        })
    }
}

#[async_trait]
impl GatewayApi for FlashpayClient {
    async fn status(&self, order: &dyn Order) -> GatewayResult<StatusResponse> {
        self.post("status", json!({ "payment_id": order.payment_id() }))
            .await
    }

    async fn operation_status(
        &self,
        order: &dyn Order,
        request_id: &str,
    ) -> GatewayResult<Option<OperationStatus>> {
        let response: OperationStatusResponse = self
            .post(
                "status/request",
                json!({
                    "payment_id": order.payment_id(),
                    "request_id": request_id,
                }),
            )
            .await?;
        Ok(response.operation.map(|operation| operation.status))
    }

    async fn refund(
        &self,
        refund: &dyn Refund,
        order: &dyn Order,
    ) -> GatewayResult<RefundResponse> {
        let amount = refund.amount();
        let payload = json!({
            "payment_id": refund.payment_id().unwrap_or_else(|| order.payment_id()),
            "amount": amount.amount,
            "currency": amount.currency,
            "description": refund.reason(),
        });
        self.post("refund", payload).await
    }

    async fn recurring(
        &self,
        payment_id: &str,
        recurring_id: i64,
        amount: &Money,
    ) -> GatewayResult<RecurringResponse> {
        let payload = json!({
            "payment_id": payment_id,
            "recurring_id": recurring_id,
            "amount": amount.amount,
            "currency": amount.currency,
        });
        self.post("recurring", payload).await
    }

    async fn recurring_cancel(&self, _recurring_id: i64) -> GatewayResult<()> {
        // The gateway only cancels mandates from its own side today; the
        // callback flow handles the bookkeeping when that happens.
        Err(GatewayError::api(
            "recurring cancellation via the API is not supported",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::HmacSigner;
    use std::time::Duration;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            protocol: "https".to_string(),
            host: "api.flashpay.example".to_string(),
            api_version: "v2".to_string(),
            secret_key: "secret".to_string(),
            request_timeout: Duration::from_secs(5),
            test_mode: false,
            test_prefix: "test".to_string(),
        }
    }

    #[test]
    fn endpoints_extend_the_payment_base_url() {
        let client =
            FlashpayClient::new(test_config(), Arc::new(HmacSigner::new("secret")))
                .expect("client should build");
        assert_eq!(
            client.endpoint("status"),
            "https://api.flashpay.example/v2/payment/status"
        );
        assert_eq!(
            client.endpoint("refund"),
            "https://api.flashpay.example/v2/payment/refund"
        );
        assert_eq!(
            client.endpoint("status/request"),
            "https://api.flashpay.example/v2/payment/status/request"
        );
    }

    #[tokio::test]
    async fn recurring_cancel_reports_unsupported() {
        let client =
            FlashpayClient::new(test_config(), Arc::new(HmacSigner::new("secret")))
                .expect("client should build");
        let err = client.recurring_cancel(1).await.expect_err("should fail");
        assert!(matches!(err, GatewayError::Api { .. }));
    }
}
