//! FLASHPAY gateway reconciliation service.
//!
//! Integrates the FLASHPAY payment gateway with an e-commerce order
//! store: verifies and reconciles asynchronous payment callbacks, keeps a
//! cached payment aggregate per order and orchestrates refunds against
//! the gateway REST API.

pub mod api;
pub mod cache;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod payment;
pub mod refund;
pub mod signature;
pub mod store;
pub mod subscriptions;
