use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::callbacks::CallbackReconciler;
use crate::gateway::types::CallbackInfo;
use crate::signature::SignatureVerifier;

pub struct CallbackState {
    pub reconciler: Arc<CallbackReconciler>,
    pub verifier: Arc<dyn SignatureVerifier>,
}

/// POST /callbacks
pub async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    body: String,
) -> impl IntoResponse {
    info!("Received gateway callback");

    let payload: JsonValue = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(err) => {
            error!(error = %err, "Invalid callback JSON");
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    match state.verifier.check(&payload) {
        Ok(true) => {}
        Ok(false) => {
            warn!("Callback signature missing or invalid");
            return (StatusCode::BAD_REQUEST, "Invalid signature").into_response();
        }
        Err(err) => {
            error!(error = %err, "Callback signature check failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Signature check failed",
            )
                .into_response();
        }
    }

    let callback: CallbackInfo = match serde_json::from_value(payload) {
        Ok(callback) => callback,
        Err(err) => {
            error!(error = %err, "Malformed callback body");
            return (StatusCode::BAD_REQUEST, "Malformed callback").into_response();
        }
    };

    match state.reconciler.process(callback).await {
        Ok(message) => {
            info!(message = %message, "Callback processed");
            (StatusCode::OK, message).into_response()
        }
        Err(err) => {
            error!(error = %err, "Callback processing failed");
            let status = StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, err.to_string()).into_response()
        }
    }
}
