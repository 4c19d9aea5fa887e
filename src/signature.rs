//! Authenticity gate for gateway traffic.
//!
//! Outbound requests and inbound callbacks carry a detached HMAC-SHA512
//! signature over the canonicalized payload: every scalar is flattened to
//! a `path:value` pair, the pairs are sorted and joined with `;`, and the
//! digest is base64 encoded. The `signature` field itself is excluded.

use crate::error::{GatewayError, GatewayResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value as JsonValue;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

pub const SIGNATURE_FIELD: &str = "signature";

pub trait SignatureVerifier: Send + Sync {
    /// Check the detached signature carried by the payload. `Ok(false)`
    /// covers both a missing and a mismatching signature; `Err` means the
    /// payload could not be canonicalized at all.
    fn check(&self, payload: &JsonValue) -> GatewayResult<bool>;

    /// Sign an outbound payload in place, replacing any stale signature.
    fn sign(&self, payload: &mut JsonValue) -> GatewayResult<()>;
}

pub struct HmacSigner {
    secret: String,
}

impl HmacSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn compute(&self, payload: &JsonValue) -> GatewayResult<String> {
        let mut mac = HmacSha512::new_from_slice(self.secret.as_bytes()).map_err(|_| {
            GatewayError::Signature {
                message: "invalid signing key".to_string(),
            }
        })?;
        mac.update(canonicalize(payload).as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

impl SignatureVerifier for HmacSigner {
    fn check(&self, payload: &JsonValue) -> GatewayResult<bool> {
        let signature = match payload.get(SIGNATURE_FIELD).and_then(JsonValue::as_str) {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => return Ok(false),
        };

        let mut body = payload.clone();
        if let Some(map) = body.as_object_mut() {
            map.remove(SIGNATURE_FIELD);
        }

        let expected = self.compute(&body)?;
        Ok(secure_eq(expected.as_bytes(), signature.as_bytes()))
    }

    fn sign(&self, payload: &mut JsonValue) -> GatewayResult<()> {
        let map = payload
            .as_object_mut()
            .ok_or_else(|| GatewayError::Signature {
                message: "payload is not a JSON object".to_string(),
            })?;
        map.remove(SIGNATURE_FIELD);

        let signature = self.compute(payload)?;
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                SIGNATURE_FIELD.to_string(),
                JsonValue::String(signature),
            );
        }
        Ok(())
    }
}

fn canonicalize(payload: &JsonValue) -> String {
    let mut pairs = Vec::new();
    collect("", payload, &mut pairs);
    pairs.sort();
    pairs.join(";")
}

fn collect(path: &str, value: &JsonValue, out: &mut Vec<String>) {
    let prefix = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}:{key}")
        }
    };

    match value {
        JsonValue::Object(map) => {
            for (key, item) in map {
                collect(&prefix(key), item, out);
            }
        }
        JsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect(&prefix(&index.to_string()), item, out);
            }
        }
        JsonValue::Null => {}
        JsonValue::Bool(flag) => out.push(format!("{path}:{}", u8::from(*flag))),
        JsonValue::Number(number) => out.push(format!("{path}:{number}")),
        JsonValue::String(text) => out.push(format!("{path}:{text}")),
    }
}

fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
