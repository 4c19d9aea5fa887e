//! Unified error taxonomy for the gateway integration.
//!
//! The split mirrors how failures are handled at the boundaries: logic
//! errors abort admin-initiated actions, API errors carry request
//! diagnostics for the logs, signature errors are always fatal for the
//! callback request, and not-found conditions terminate a callback
//! without corrupting committed state.

use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// A precondition was violated (disallowed action for the current
    /// payment state, refund amount exceeds balance, and so on).
    #[error("Logic error: {message}")]
    Logic { message: String },

    /// Gateway communication or response problem. Carries the request URL
    /// and raw response for diagnostics; neither is shown to shoppers.
    #[error("API error: {message}")]
    Api {
        message: String,
        url: Option<String>,
        response: Option<String>,
    },

    /// The inbound callback failed the authenticity check in a way that is
    /// not a plain mismatch (malformed signature data, bad encoding).
    #[error("Signature error: {message}")]
    Signature { message: String },

    #[error("Order not found: {reference}")]
    OrderNotFound { reference: String },

    #[error("No refund matches gateway request {request_id}")]
    RefundNotFound { request_id: String },

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::error::CacheError),

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl GatewayError {
    pub fn logic(message: impl Into<String>) -> Self {
        GatewayError::Logic {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        GatewayError::Api {
            message: message.into(),
            url: None,
            response: None,
        }
    }

    pub fn api_with_context(
        message: impl Into<String>,
        url: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        GatewayError::Api {
            message: message.into(),
            url: Some(url.into()),
            response: Some(response.into()),
        }
    }

    /// HTTP status used when the error terminates a callback request.
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Logic { .. } => 400,
            GatewayError::Api { .. } => 502,
            GatewayError::Signature { .. } => 500,
            GatewayError::OrderNotFound { .. } => 404,
            GatewayError::RefundNotFound { .. } => 404,
            GatewayError::Cache(_) => 500,
            GatewayError::Network { .. } => 503,
            GatewayError::Config { .. } => 500,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping_is_correct() {
        assert_eq!(GatewayError::logic("bad").http_status(), 400);
        assert_eq!(
            GatewayError::OrderNotFound {
                reference: "p1".to_string()
            }
            .http_status(),
            404
        );
        assert_eq!(
            GatewayError::Signature {
                message: "corrupt".to_string()
            }
            .http_status(),
            500
        );
        assert_eq!(GatewayError::api("declined").http_status(), 502);
    }

    #[test]
    fn api_error_keeps_request_context() {
        let err = GatewayError::api_with_context("bad response", "https://api/status", "{}");
        match err {
            GatewayError::Api { url, response, .. } => {
                assert_eq!(url.as_deref(), Some("https://api/status"));
                assert_eq!(response.as_deref(), Some("{}"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
