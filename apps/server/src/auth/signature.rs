//! Webhook admission gate.
//!
//! Requires the signature and timestamp headers and rejects timestamps more
//! than five minutes away from now. When a shared secret is configured the
//! signature is also verified as HMAC-SHA256 over `"<timestamp>.<body>"`;
//! without a secret only presence and freshness are checked.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-firebase-signature";
pub const TIMESTAMP_HEADER: &str = "x-firebase-timestamp";

/// Largest accepted distance between the request timestamp and now
pub const MAX_TIMESTAMP_SKEW_SECS: u64 = 300;

pub struct SignatureGate {
    enabled: bool,
    secret: Option<String>,
    clock: Arc<dyn Clock>,
}

impl SignatureGate {
    /// `secret` may be empty, in which case signatures are not verified
    pub fn new(enabled: bool, secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            enabled,
            secret: Some(secret.to_string()).filter(|s| !s.is_empty()),
            clock,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True when signature values are checked cryptographically
    pub fn verifies_signatures(&self) -> bool {
        self.enabled && self.secret.is_some()
    }

    /// Computes the hex signature a sender attaches for `body`
    pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
        // HMAC accepts keys of any length
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Admits or rejects a webhook request
    pub fn check(&self, headers: &HeaderMap, body: &[u8]) -> AppResult<()> {
        if !self.enabled {
            log::debug!("Skipping webhook signature validation");
            return Ok(());
        }

        let signature = header_value(headers, SIGNATURE_HEADER);
        let timestamp = header_value(headers, TIMESTAMP_HEADER);

        let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
            log::warn!(
                "Missing required webhook headers: has_signature={} has_timestamp={}",
                signature.is_some(),
                timestamp.is_some()
            );
            return Err(AppError::Unauthorized(
                "Missing webhook signature or timestamp".to_string(),
            ));
        };

        let request_time: i64 = timestamp.parse().map_err(|_| {
            log::warn!("Unparseable webhook timestamp: {:?}", timestamp);
            AppError::Unauthorized("Invalid webhook timestamp".to_string())
        })?;

        let current_time = self.clock.now().timestamp();
        let difference = current_time.abs_diff(request_time);
        if difference > MAX_TIMESTAMP_SKEW_SECS {
            log::warn!(
                "Webhook timestamp too old: request_time={} current_time={} difference={}s",
                request_time,
                current_time,
                difference
            );
            return Err(AppError::Unauthorized(
                "Request timestamp too old".to_string(),
            ));
        }

        if let Some(secret) = &self.secret {
            self.verify(secret, signature, timestamp, body)?;
        }

        log::debug!("Webhook signature validation passed");
        Ok(())
    }

    fn verify(&self, secret: &str, signature: &str, timestamp: &str, body: &[u8]) -> AppResult<()> {
        let invalid = || AppError::Unauthorized("Invalid webhook signature".to_string());

        let provided = signature.strip_prefix("sha256=").unwrap_or(signature);
        let provided = hex::decode(provided).map_err(|_| {
            log::warn!("Webhook signature is not valid hex");
            invalid()
        })?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::Internal(format!("HMAC setup failed: {}", e)))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);

        mac.verify_slice(&provided).map_err(|_| {
            log::warn!("Webhook signature mismatch");
            invalid()
        })
    }
}

/// Trimmed, non-empty header value
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
