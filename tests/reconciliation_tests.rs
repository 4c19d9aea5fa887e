//! End-to-end reconciliation scenarios against a scripted gateway and the
//! in-memory order store.

use async_trait::async_trait;
use flashpay_gateway::cache::MemoryCache;
use flashpay_gateway::callbacks::CallbackReconciler;
use flashpay_gateway::config::{CacheSettings, GatewayConfig, RefundSettings};
use flashpay_gateway::error::{GatewayError, GatewayResult};
use flashpay_gateway::gateway::client::GatewayApi;
use flashpay_gateway::gateway::types::{
    CallbackInfo, RecurringResponse, RefundResponse, StatusResponse,
};
use flashpay_gateway::payment::aggregate::PaymentInfo;
use flashpay_gateway::payment::operation::{
    Money, OperationRecord, OperationStatus, OperationType,
};
use flashpay_gateway::payment::provider::PaymentStore;
use flashpay_gateway::payment::status::PaymentStatus;
use flashpay_gateway::refund::RefundOrchestrator;
use flashpay_gateway::store::memory::{MemoryOrder, MemoryOrderStore, MemoryRefund};
use flashpay_gateway::store::{Order, OrderStatus, OrderStore, Refund, RefundStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Default)]
struct MockGateway {
    status_response: Mutex<StatusResponse>,
    refund_response: Mutex<RefundResponse>,
    recurring_response: Mutex<RecurringResponse>,
    operation_statuses: Mutex<VecDeque<Option<OperationStatus>>>,
    status_calls: AtomicU32,
    refund_calls: AtomicU32,
}

impl MockGateway {
    fn set_status_response(&self, response: StatusResponse) {
        *self.status_response.lock().unwrap() = response;
    }

    fn set_refund_response(&self, response: RefundResponse) {
        *self.refund_response.lock().unwrap() = response;
    }

    fn set_recurring_response(&self, response: RecurringResponse) {
        *self.recurring_response.lock().unwrap() = response;
    }

    fn push_operation_status(&self, status: Option<OperationStatus>) {
        self.operation_statuses.lock().unwrap().push_back(status);
    }

    fn refund_calls(&self) -> u32 {
        self.refund_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayApi for MockGateway {
    async fn status(&self, _order: &dyn Order) -> GatewayResult<StatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.status_response.lock().unwrap().clone())
    }

    async fn operation_status(
        &self,
        _order: &dyn Order,
        _request_id: &str,
    ) -> GatewayResult<Option<OperationStatus>> {
        Ok(self
            .operation_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(None))
    }

    async fn refund(
        &self,
        _refund: &dyn Refund,
        _order: &dyn Order,
    ) -> GatewayResult<RefundResponse> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.refund_response.lock().unwrap().clone())
    }

    async fn recurring(
        &self,
        _payment_id: &str,
        _recurring_id: i64,
        _amount: &Money,
    ) -> GatewayResult<RecurringResponse> {
        Ok(self.recurring_response.lock().unwrap().clone())
    }

    async fn recurring_cancel(&self, _recurring_id: i64) -> GatewayResult<()> {
        Err(GatewayError::api("not supported"))
    }
}

struct Fixture {
    store: Arc<MemoryOrderStore>,
    gateway: Arc<MockGateway>,
    refunds: Arc<RefundOrchestrator>,
    reconciler: CallbackReconciler,
}

fn gateway_config(test_mode: bool) -> GatewayConfig {
    GatewayConfig {
        protocol: "https".to_string(),
        host: "api.flashpay.example".to_string(),
        api_version: "v2".to_string(),
        secret_key: "secret".to_string(),
        request_timeout: Duration::from_secs(5),
        test_mode,
        test_prefix: "test".to_string(),
    }
}

fn fixture(test_mode: bool, refund_settings: RefundSettings) -> Fixture {
    let store = Arc::new(MemoryOrderStore::new());
    let gateway = Arc::new(MockGateway::default());
    let cache_settings = CacheSettings {
        enabled: true,
        redis_url: String::new(),
        ttl: Duration::from_secs(60),
        max_connections: 1,
    };

    let payments = Arc::new(PaymentStore::new(
        Arc::clone(&gateway) as Arc<dyn GatewayApi>,
        Arc::new(MemoryCache::new()),
        cache_settings,
    ));
    let refunds = Arc::new(RefundOrchestrator::new(
        Arc::clone(&store) as Arc<dyn OrderStore>,
        Arc::clone(&payments),
        Arc::clone(&gateway) as Arc<dyn GatewayApi>,
        refund_settings,
        gateway_config(test_mode),
    ));
    let reconciler = CallbackReconciler::new(
        Arc::clone(&store) as Arc<dyn OrderStore>,
        Arc::clone(&payments),
        Arc::clone(&refunds),
    );

    Fixture {
        store,
        gateway,
        refunds,
        reconciler,
    }
}

fn fast_poll(attempts: u32, interval_ms: u64) -> RefundSettings {
    RefundSettings {
        poll_attempts: attempts,
        poll_interval: Duration::from_millis(interval_ms),
    }
}

fn callback(
    payment_id: &str,
    request_id: &str,
    operation_type: OperationType,
    operation_status: OperationStatus,
    payment_status: PaymentStatus,
    amount: Money,
) -> CallbackInfo {
    CallbackInfo {
        operation: OperationRecord::new(
            request_id,
            operation_type,
            operation_status,
            amount.clone(),
            None,
        ),
        payment: PaymentInfo {
            id: Some(payment_id.to_string()),
            status: payment_status,
            method: Some("card".to_string()),
            sum: Some(amount),
        },
        customer: None,
        account: None,
        acs: None,
        recurring: None,
        errors: Vec::new(),
    }
}

fn success_status_response(payment_id: &str, amount: i64) -> StatusResponse {
    StatusResponse {
        payment: Some(PaymentInfo {
            id: Some(payment_id.to_string()),
            status: PaymentStatus::Success,
            method: Some("card".to_string()),
            sum: Some(Money::new(amount, "USD")),
        }),
        operations: vec![OperationRecord::new(
            "req-sale",
            OperationType::Sale,
            OperationStatus::Success,
            Money::new(amount, "USD"),
            None,
        )],
        ..StatusResponse::default()
    }
}

#[tokio::test]
async fn redelivered_success_callback_completes_the_order_once() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(1, Money::new(10000, "USD")));
    order.set_payment_id("pay-1");

    let success = callback(
        "pay-1",
        "req-1",
        OperationType::Sale,
        OperationStatus::Success,
        PaymentStatus::Success,
        Money::new(10000, "USD"),
    );

    let first = fx.reconciler.process(success.clone()).await.unwrap();
    let second = fx.reconciler.process(success).await.unwrap();

    assert_eq!(first, "Payment completed");
    assert_eq!(second, "Payment completed");
    assert_eq!(order.payment_completions(), 1);
    assert_eq!(order.status(), OrderStatus::Processing);
    assert_eq!(order.gateway_status(), PaymentStatus::Success);
    assert_eq!(order.payment_system().as_deref(), Some("card"));
    assert_eq!(fx.store.carts_cleared(), 2);
}

#[tokio::test]
async fn amount_mismatch_is_noted_only_on_the_actual_completion() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(2, Money::new(10000, "USD")));
    order.set_payment_id("pay-2");

    let short = callback(
        "pay-2",
        "req-2",
        OperationType::Sale,
        OperationStatus::Success,
        PaymentStatus::Success,
        Money::new(9000, "USD"),
    );

    fx.reconciler.process(short.clone()).await.unwrap();
    fx.reconciler.process(short).await.unwrap();

    let mismatch_notes = order
        .notes()
        .iter()
        .filter(|note| note.contains("does not match the order total"))
        .count();
    assert_eq!(mismatch_notes, 1);
    assert_eq!(order.payment_completions(), 1);
}

#[tokio::test]
async fn awaiting_confirmation_puts_the_order_on_hold() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(3, Money::new(5000, "EUR")));
    order.set_payment_id("pay-3");

    let hold = callback(
        "pay-3",
        "req-3",
        OperationType::Sale,
        OperationStatus::AwaitingConfirmation,
        PaymentStatus::AwaitingConfirmation,
        Money::new(5000, "EUR"),
    );

    let response = fx.reconciler.process(hold).await.unwrap();
    assert_eq!(response, "Payment is on hold");
    assert_eq!(order.status(), OrderStatus::OnHold);
    assert_eq!(order.transaction_id().as_deref(), Some("req-3"));
    assert_eq!(order.gateway_status(), PaymentStatus::AwaitingConfirmation);
}

#[tokio::test]
async fn awaiting_customer_declines_and_counts_the_failure() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(4, Money::new(5000, "EUR")));
    order.set_payment_id("pay-4");

    let declined = callback(
        "pay-4",
        "req-4",
        OperationType::Sale,
        OperationStatus::Decline,
        PaymentStatus::AwaitingCustomer,
        Money::new(5000, "EUR"),
    );

    let response = fx.reconciler.process(declined).await.unwrap();
    assert_eq!(response, "Payment failed");
    assert_eq!(order.status(), OrderStatus::Failed);
    assert_eq!(order.failed_payment_count(), 1);
}

#[tokio::test]
async fn callback_for_an_unknown_order_mutates_nothing() {
    let fx = fixture(false, RefundSettings::default());
    fx.store
        .insert_order(MemoryOrder::new(5, Money::new(5000, "EUR")));

    let ghost = callback(
        "pay-ghost",
        "req-5",
        OperationType::Sale,
        OperationStatus::Success,
        PaymentStatus::Success,
        Money::new(5000, "EUR"),
    );

    let err = fx.reconciler.process(ghost).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert!(matches!(err, GatewayError::OrderNotFound { .. }));
    assert_eq!(fx.store.carts_cleared(), 0);
}

#[tokio::test]
async fn unsupported_operation_types_are_acknowledged() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(6, Money::new(5000, "EUR")));
    order.set_payment_id("pay-6");

    let invoice = callback(
        "pay-6",
        "req-6",
        OperationType::Invoice,
        OperationStatus::Success,
        PaymentStatus::Success,
        Money::new(5000, "EUR"),
    );

    let response = fx.reconciler.process(invoice).await.unwrap();
    assert!(response.contains("Not supported operation type"));
    assert_eq!(order.payment_completions(), 0);
}

#[tokio::test]
async fn refund_exceeding_the_balance_never_reaches_the_gateway() {
    let fx = fixture(false, fast_poll(10, 10));
    let order = fx
        .store
        .insert_order(MemoryOrder::new(10, Money::new(10000, "USD")));
    order.set_payment_id("pay-10");
    order.set_gateway_status(PaymentStatus::PartiallyRefunded);
    fx.gateway
        .set_status_response(success_status_response("pay-10", 5000));
    fx.store
        .insert_refund(MemoryRefund::new(1, 10, Money::new(6000, "USD")));

    let err = fx.refunds.process(10, Some(6000), None).await.unwrap_err();
    assert!(matches!(err, GatewayError::Logic { .. }));
    assert_eq!(fx.gateway.refund_calls(), 0);
}

#[tokio::test]
async fn refund_poll_returns_as_soon_as_the_gateway_confirms() {
    let fx = fixture(false, fast_poll(10, 20));
    let order = fx
        .store
        .insert_order(MemoryOrder::new(11, Money::new(10000, "USD")));
    order.set_payment_id("pay-11");
    order.set_gateway_status(PaymentStatus::Success);
    fx.gateway
        .set_status_response(success_status_response("pay-11", 10000));
    fx.gateway.set_refund_response(RefundResponse {
        request_id: Some("ref-req-11".to_string()),
        payment_id: Some("pay-11".to_string()),
        errors: Vec::new(),
    });
    fx.gateway.push_operation_status(None);
    fx.gateway.push_operation_status(None);
    fx.gateway
        .push_operation_status(Some(OperationStatus::Success));

    let refund = fx
        .store
        .insert_refund(MemoryRefund::new(2, 11, Money::new(5000, "USD")));

    let started = Instant::now();
    let result = fx
        .refunds
        .process(11, Some(5000), Some("customer request"))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(result);
    assert_eq!(refund.transaction_id().as_deref(), Some("ref-req-11"));
    assert_eq!(refund.reason().as_deref(), Some("customer request"));
    assert_eq!(refund.gateway_status(), Some(RefundStatus::Initial));
    assert!(elapsed >= Duration::from_millis(40), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn refund_poll_soft_times_out_after_the_attempt_budget() {
    let fx = fixture(false, fast_poll(5, 20));
    let order = fx
        .store
        .insert_order(MemoryOrder::new(12, Money::new(10000, "USD")));
    order.set_payment_id("pay-12");
    order.set_gateway_status(PaymentStatus::Success);
    fx.gateway
        .set_status_response(success_status_response("pay-12", 10000));
    fx.gateway.set_refund_response(RefundResponse {
        request_id: Some("ref-req-12".to_string()),
        ..RefundResponse::default()
    });

    fx.store
        .insert_refund(MemoryRefund::new(3, 12, Money::new(5000, "USD")));

    let started = Instant::now();
    let result = fx.refunds.process(12, Some(5000), None).await.unwrap();
    let elapsed = started.elapsed();

    assert!(result, "a pending refund is reported as accepted");
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn declined_refund_surfaces_a_logic_error() {
    let fx = fixture(false, fast_poll(10, 10));
    let order = fx
        .store
        .insert_order(MemoryOrder::new(13, Money::new(10000, "USD")));
    order.set_payment_id("pay-13");
    order.set_gateway_status(PaymentStatus::Success);
    fx.gateway
        .set_status_response(success_status_response("pay-13", 10000));
    fx.gateway.set_refund_response(RefundResponse {
        request_id: Some("ref-req-13".to_string()),
        ..RefundResponse::default()
    });
    fx.gateway
        .push_operation_status(Some(OperationStatus::Decline));

    fx.store
        .insert_refund(MemoryRefund::new(4, 13, Money::new(5000, "USD")));

    let err = fx.refunds.process(13, Some(5000), None).await.unwrap_err();
    assert!(matches!(err, GatewayError::Logic { .. }));
}

#[tokio::test]
async fn refund_callback_settles_the_refund_record() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(14, Money::new(10000, "USD")));
    order.set_payment_id("pay-14");
    order.set_gateway_status(PaymentStatus::Success);
    fx.gateway
        .set_status_response(success_status_response("pay-14", 10000));

    let refund = fx
        .store
        .insert_refund(MemoryRefund::new(5, 14, Money::new(4000, "USD")));
    refund.set_transaction_id("ref-req-14");
    refund.set_reason("Requested by customer");

    let settled = callback(
        "pay-14",
        "ref-req-14",
        OperationType::Refund,
        OperationStatus::Success,
        PaymentStatus::PartiallyRefunded,
        Money::new(4000, "USD"),
    );

    let response = fx.reconciler.process(settled).await.unwrap();
    assert_eq!(response, "Refund completed");
    assert_eq!(refund.gateway_status(), Some(RefundStatus::Completed));
    assert!(refund
        .reason()
        .unwrap()
        .starts_with("Requested by customer | Refund completed at "));
    assert_eq!(order.gateway_status(), PaymentStatus::PartiallyRefunded);
    assert!(order
        .notes()
        .iter()
        .any(|note| note.starts_with("Refunded 40.00 USD")));
}

#[tokio::test]
async fn refund_callback_without_a_matching_record_is_rejected() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(15, Money::new(10000, "USD")));
    order.set_payment_id("pay-15");

    let unknown = callback(
        "pay-15",
        "ref-req-unknown",
        OperationType::Refund,
        OperationStatus::Success,
        PaymentStatus::PartiallyRefunded,
        Money::new(4000, "USD"),
    );

    let err = fx.reconciler.process(unknown).await.unwrap_err();
    assert!(matches!(err, GatewayError::RefundNotFound { .. }));
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn before_create_rejects_orders_outside_refundable_statuses() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(16, Money::new(10000, "USD")));
    order.set_payment_id("pay-16");
    order.update_status(OrderStatus::Pending);

    let refund = fx
        .store
        .insert_refund(MemoryRefund::new(6, 16, Money::new(5000, "USD")));

    let err = fx
        .refunds
        .before_create(refund.as_ref(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Logic { .. }));
    assert!(refund.payment_id().is_none());
}

#[tokio::test]
async fn before_create_mints_an_attempt_numbered_payment_id() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(17, Money::new(10000, "USD")));
    order.set_payment_id("pay-17");
    order.set_gateway_status(PaymentStatus::Success);
    order.update_status(OrderStatus::Completed);
    fx.gateway
        .set_status_response(success_status_response("pay-17", 10000));

    let refund = fx
        .store
        .insert_refund(MemoryRefund::new(7, 17, Money::new(5000, "USD")));

    fx.refunds
        .before_create(refund.as_ref(), true)
        .await
        .unwrap();
    assert_eq!(refund.payment_id().as_deref(), Some("pay-17_1"));
    assert_eq!(refund.gateway_status(), Some(RefundStatus::Initial));
    assert_eq!(order.refund_attempts(), 1);
    assert!(!refund.is_test());
}

#[tokio::test]
async fn test_mode_prefixes_the_refund_payment_id() {
    let fx = fixture(true, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(18, Money::new(10000, "USD")));
    order.set_payment_id("pay-18");
    order.set_gateway_status(PaymentStatus::Success);
    order.update_status(OrderStatus::Processing);
    fx.gateway
        .set_status_response(success_status_response("pay-18", 10000));

    let refund = fx
        .store
        .insert_refund(MemoryRefund::new(8, 18, Money::new(5000, "USD")));

    fx.refunds
        .before_create(refund.as_ref(), true)
        .await
        .unwrap();
    assert_eq!(
        refund.payment_id().as_deref(),
        Some("test&api.flashpay.example&pay-18_1")
    );
    assert!(refund.is_test());
}

#[tokio::test]
async fn before_create_skips_refunds_not_paid_through_the_gateway() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(19, Money::new(10000, "USD")).not_via_gateway());
    order.set_payment_id("pay-19");
    order.update_status(OrderStatus::Completed);

    let refund = fx
        .store
        .insert_refund(MemoryRefund::new(9, 19, Money::new(5000, "USD")));

    fx.refunds
        .before_create(refund.as_ref(), true)
        .await
        .unwrap();
    assert!(refund.payment_id().is_none());
    assert_eq!(order.refund_attempts(), 0);
}

#[tokio::test]
async fn after_success_maps_payment_state_onto_the_order() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(20, Money::new(10000, "USD")));
    order.set_payment_id("pay-20");
    order.set_gateway_status(PaymentStatus::Success);
    order.update_status(OrderStatus::Completed);

    let mut refunded = success_status_response("pay-20", 0);
    if let Some(payment) = refunded.payment.as_mut() {
        payment.status = PaymentStatus::Refunded;
    }
    fx.gateway.set_status_response(refunded);

    fx.store
        .insert_refund(MemoryRefund::new(10, 20, Money::new(10000, "USD")));

    fx.refunds.after_success(10).await.unwrap();
    assert_eq!(order.status(), OrderStatus::Refunded);
}

#[tokio::test]
async fn recurring_cancel_callback_cancels_subscriptions() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(21, Money::new(900, "EUR")).with_subscription());
    order.set_payment_id("pay-21");
    let subscription = fx.store.insert_subscription(
        21,
        flashpay_gateway::store::memory::MemorySubscription::new(100),
    );

    let cancel = callback(
        "pay-21",
        "req-21",
        OperationType::RecurringCancel,
        OperationStatus::Success,
        PaymentStatus::Success,
        Money::new(0, "EUR"),
    );

    let response = fx.reconciler.process(cancel).await.unwrap();
    assert_eq!(response, "Recurring profile cancelled");
    assert!(subscription.is_cancelled());
}

#[tokio::test]
async fn renewal_charge_records_the_gateway_request_id() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(30, Money::new(900, "EUR")).with_subscription());
    order.set_payment_id("pay-30");
    fx.gateway.set_recurring_response(RecurringResponse {
        request_id: Some("req-renew-30".to_string()),
        payment_id: Some("pay-30".to_string()),
        errors: Vec::new(),
    });

    let renewer = flashpay_gateway::subscriptions::SubscriptionRenewer::new(
        Arc::clone(&fx.store) as Arc<dyn OrderStore>,
        Arc::clone(&fx.gateway) as Arc<dyn GatewayApi>,
    );

    let request_id = renewer.renew(30, 7788).await.unwrap();
    assert_eq!(request_id, "req-renew-30");
    assert_eq!(order.transaction_id().as_deref(), Some("req-renew-30"));
    assert!(order
        .notes()
        .iter()
        .any(|note| note.contains("Renewal payment submitted")));
}

#[tokio::test]
async fn rejected_renewal_surfaces_the_gateway_message() {
    let fx = fixture(false, RefundSettings::default());
    fx.store
        .insert_order(MemoryOrder::new(31, Money::new(900, "EUR")).with_subscription());
    fx.gateway.set_recurring_response(RecurringResponse {
        request_id: None,
        payment_id: None,
        errors: vec![flashpay_gateway::gateway::types::ErrorEntry::new(
            3124,
            "Recurring profile is not active",
        )],
    });

    let renewer = flashpay_gateway::subscriptions::SubscriptionRenewer::new(
        Arc::clone(&fx.store) as Arc<dyn OrderStore>,
        Arc::clone(&fx.gateway) as Arc<dyn GatewayApi>,
    );

    let err = renewer.renew(31, 7788).await.unwrap_err();
    match err {
        GatewayError::Api { message, .. } => {
            assert_eq!(message, "Recurring profile is not active")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn recurring_callback_propagates_the_mandate_id() {
    let fx = fixture(false, RefundSettings::default());
    let order = fx
        .store
        .insert_order(MemoryOrder::new(22, Money::new(900, "EUR")).with_subscription());
    order.set_payment_id("pay-22");
    let subscription = fx.store.insert_subscription(
        22,
        flashpay_gateway::store::memory::MemorySubscription::new(101),
    );

    let mut sale = callback(
        "pay-22",
        "req-22",
        OperationType::Sale,
        OperationStatus::Success,
        PaymentStatus::Success,
        Money::new(900, "EUR"),
    );
    sale.recurring = Some(flashpay_gateway::gateway::types::RecurringInfo {
        id: 7788,
        currency: Some("EUR".to_string()),
        valid_thru: None,
    });

    fx.reconciler.process(sale).await.unwrap();
    assert_eq!(subscription.recurring_id().as_deref(), Some("7788"));
}
