//! Mutex-based store implementation used by tests and the demo binary.

use super::{Order, OrderStatus, OrderStore, Refund, RefundStatus, Subscription};
use crate::payment::operation::Money;
use crate::payment::status::PaymentStatus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct OrderState {
    payment_id: String,
    gateway_status: Option<PaymentStatus>,
    payment_system: Option<String>,
    transaction_id: Option<String>,
    transaction_order_id: Option<String>,
    status: Option<OrderStatus>,
    notes: Vec<String>,
    date_paid: bool,
}

pub struct MemoryOrder {
    id: u64,
    total: Money,
    paid_via_gateway: bool,
    contains_subscription: bool,
    state: Mutex<OrderState>,
    total_refunded: AtomicU64,
    failed_payments: AtomicU32,
    refund_attempts: AtomicU32,
    payment_completions: AtomicU32,
}

impl MemoryOrder {
    pub fn new(id: u64, total: Money) -> Self {
        Self {
            id,
            total,
            paid_via_gateway: true,
            contains_subscription: false,
            state: Mutex::new(OrderState {
                payment_id: format!("order_{id}"),
                ..OrderState::default()
            }),
            total_refunded: AtomicU64::new(0),
            failed_payments: AtomicU32::new(0),
            refund_attempts: AtomicU32::new(0),
            payment_completions: AtomicU32::new(0),
        }
    }

    pub fn with_subscription(mut self) -> Self {
        self.contains_subscription = true;
        self
    }

    pub fn not_via_gateway(mut self) -> Self {
        self.paid_via_gateway = false;
        self
    }

    pub fn notes(&self) -> Vec<String> {
        self.state.lock().expect("order state lock").notes.clone()
    }

    pub fn transaction_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("order state lock")
            .transaction_id
            .clone()
    }

    pub fn transaction_order_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("order state lock")
            .transaction_order_id
            .clone()
    }

    pub fn failed_payment_count(&self) -> u32 {
        self.failed_payments.load(Ordering::SeqCst)
    }

    pub fn payment_completions(&self) -> u32 {
        self.payment_completions.load(Ordering::SeqCst)
    }

    pub fn record_refunded(&self, amount: u64) {
        self.total_refunded.fetch_add(amount, Ordering::SeqCst);
    }
}

impl Order for MemoryOrder {
    fn id(&self) -> u64 {
        self.id
    }

    fn payment_id(&self) -> String {
        self.state.lock().expect("order state lock").payment_id.clone()
    }

    fn set_payment_id(&self, payment_id: &str) {
        self.state.lock().expect("order state lock").payment_id = payment_id.to_string();
    }

    fn gateway_status(&self) -> PaymentStatus {
        self.state
            .lock()
            .expect("order state lock")
            .gateway_status
            .unwrap_or(PaymentStatus::Initial)
    }

    fn set_gateway_status(&self, status: PaymentStatus) {
        self.state.lock().expect("order state lock").gateway_status = Some(status);
    }

    fn payment_system(&self) -> Option<String> {
        self.state
            .lock()
            .expect("order state lock")
            .payment_system
            .clone()
    }

    fn set_payment_system(&self, method: &str) {
        self.state.lock().expect("order state lock").payment_system = Some(method.to_string());
    }

    fn set_transaction_id(&self, request_id: &str) {
        self.state.lock().expect("order state lock").transaction_id = Some(request_id.to_string());
    }

    fn set_transaction_order_id(&self, request_id: &str) {
        self.state
            .lock()
            .expect("order state lock")
            .transaction_order_id = Some(request_id.to_string());
    }

    fn status(&self) -> OrderStatus {
        self.state
            .lock()
            .expect("order state lock")
            .status
            .unwrap_or(OrderStatus::Pending)
    }

    fn update_status(&self, status: OrderStatus) {
        self.state.lock().expect("order state lock").status = Some(status);
    }

    fn payment_complete(&self, request_id: &str) -> bool {
        let mut state = self.state.lock().expect("order state lock");
        if matches!(
            state.status,
            Some(OrderStatus::Processing) | Some(OrderStatus::Completed)
        ) {
            return false;
        }
        state.transaction_id = Some(request_id.to_string());
        state.status = Some(OrderStatus::Processing);
        state.date_paid = true;
        drop(state);
        self.payment_completions.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn add_note(&self, note: &str) {
        self.state
            .lock()
            .expect("order state lock")
            .notes
            .push(note.to_string());
    }

    fn total(&self) -> Money {
        self.total.clone()
    }

    fn total_refunded(&self) -> i64 {
        self.total_refunded.load(Ordering::SeqCst) as i64
    }

    fn paid_via_gateway(&self) -> bool {
        self.paid_via_gateway
    }

    fn increase_failed_payment_count(&self) {
        self.failed_payments.fetch_add(1, Ordering::SeqCst);
    }

    fn refund_attempts(&self) -> u32 {
        self.refund_attempts.load(Ordering::SeqCst)
    }

    fn increase_refund_attempts(&self) {
        self.refund_attempts.fetch_add(1, Ordering::SeqCst);
    }

    fn contains_subscription(&self) -> bool {
        self.contains_subscription
    }
}

#[derive(Debug, Default)]
struct RefundState {
    payment_id: Option<String>,
    transaction_id: Option<String>,
    gateway_status: Option<RefundStatus>,
    reason: Option<String>,
    is_test: bool,
}

pub struct MemoryRefund {
    id: u64,
    order_id: u64,
    amount: Money,
    state: Mutex<RefundState>,
}

impl MemoryRefund {
    pub fn new(id: u64, order_id: u64, amount: Money) -> Self {
        Self {
            id,
            order_id,
            amount,
            state: Mutex::new(RefundState::default()),
        }
    }

    pub fn is_test(&self) -> bool {
        self.state.lock().expect("refund state lock").is_test
    }
}

impl Refund for MemoryRefund {
    fn id(&self) -> u64 {
        self.id
    }

    fn order_id(&self) -> u64 {
        self.order_id
    }

    fn amount(&self) -> Money {
        self.amount.clone()
    }

    fn payment_id(&self) -> Option<String> {
        self.state.lock().expect("refund state lock").payment_id.clone()
    }

    fn set_payment_id(&self, payment_id: &str) {
        self.state.lock().expect("refund state lock").payment_id = Some(payment_id.to_string());
    }

    fn transaction_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("refund state lock")
            .transaction_id
            .clone()
    }

    fn set_transaction_id(&self, request_id: &str) {
        self.state.lock().expect("refund state lock").transaction_id =
            Some(request_id.to_string());
    }

    fn gateway_status(&self) -> Option<RefundStatus> {
        self.state.lock().expect("refund state lock").gateway_status
    }

    fn set_gateway_status(&self, status: RefundStatus) {
        self.state.lock().expect("refund state lock").gateway_status = Some(status);
    }

    fn reason(&self) -> Option<String> {
        self.state.lock().expect("refund state lock").reason.clone()
    }

    fn set_reason(&self, reason: &str) {
        self.state.lock().expect("refund state lock").reason = Some(reason.to_string());
    }

    fn set_test(&self) {
        self.state.lock().expect("refund state lock").is_test = true;
    }
}

#[derive(Debug, Default)]
struct SubscriptionState {
    recurring_id: Option<String>,
    cancelled: bool,
}

pub struct MemorySubscription {
    id: u64,
    state: Mutex<SubscriptionState>,
}

impl MemorySubscription {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: Mutex::new(SubscriptionState::default()),
        }
    }

    pub fn recurring_id(&self) -> Option<String> {
        self.state
            .lock()
            .expect("subscription state lock")
            .recurring_id
            .clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().expect("subscription state lock").cancelled
    }
}

impl Subscription for MemorySubscription {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_recurring_id(&self, recurring_id: &str) {
        self.state
            .lock()
            .expect("subscription state lock")
            .recurring_id = Some(recurring_id.to_string());
    }

    fn cancel(&self) {
        self.state.lock().expect("subscription state lock").cancelled = true;
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<u64, Arc<MemoryOrder>>>,
    refunds: Mutex<HashMap<u64, Arc<MemoryRefund>>>,
    subscriptions: Mutex<HashMap<u64, Vec<Arc<MemorySubscription>>>>,
    carts_cleared: AtomicU32,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: MemoryOrder) -> Arc<MemoryOrder> {
        let order = Arc::new(order);
        self.orders
            .lock()
            .expect("orders lock")
            .insert(order.id(), Arc::clone(&order));
        order
    }

    pub fn insert_refund(&self, refund: MemoryRefund) -> Arc<MemoryRefund> {
        let refund = Arc::new(refund);
        self.refunds
            .lock()
            .expect("refunds lock")
            .insert(refund.id(), Arc::clone(&refund));
        refund
    }

    pub fn insert_subscription(
        &self,
        order_id: u64,
        subscription: MemorySubscription,
    ) -> Arc<MemorySubscription> {
        let subscription = Arc::new(subscription);
        self.subscriptions
            .lock()
            .expect("subscriptions lock")
            .entry(order_id)
            .or_default()
            .push(Arc::clone(&subscription));
        subscription
    }

    pub fn carts_cleared(&self) -> u32 {
        self.carts_cleared.load(Ordering::SeqCst)
    }
}

impl OrderStore for MemoryOrderStore {
    fn order(&self, order_id: u64) -> Option<Arc<dyn Order>> {
        self.orders
            .lock()
            .expect("orders lock")
            .get(&order_id)
            .map(|order| Arc::clone(order) as Arc<dyn Order>)
    }

    fn order_by_payment_id(&self, payment_id: &str) -> Option<Arc<dyn Order>> {
        self.orders
            .lock()
            .expect("orders lock")
            .values()
            .find(|order| order.payment_id() == payment_id)
            .map(|order| Arc::clone(order) as Arc<dyn Order>)
    }

    fn refund(&self, refund_id: u64) -> Option<Arc<dyn Refund>> {
        self.refunds
            .lock()
            .expect("refunds lock")
            .get(&refund_id)
            .map(|refund| Arc::clone(refund) as Arc<dyn Refund>)
    }

    fn refunds(&self, order_id: u64) -> Vec<Arc<dyn Refund>> {
        self.refunds
            .lock()
            .expect("refunds lock")
            .values()
            .filter(|refund| refund.order_id() == order_id)
            .map(|refund| Arc::clone(refund) as Arc<dyn Refund>)
            .collect()
    }

    fn subscriptions(&self, order_id: u64) -> Vec<Arc<dyn Subscription>> {
        self.subscriptions
            .lock()
            .expect("subscriptions lock")
            .get(&order_id)
            .map(|subs| {
                subs.iter()
                    .map(|sub| Arc::clone(sub) as Arc<dyn Subscription>)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn clear_cart(&self, _order_id: u64) {
        self.carts_cleared.fetch_add(1, Ordering::SeqCst);
    }
}
