//! FLASHPAY REST API surface: wire types and the HTTP client.

pub mod client;
pub mod types;

pub use client::{FlashpayClient, GatewayApi};
pub use types::{CallbackInfo, ErrorEntry, RefundResponse, StatusResponse};
