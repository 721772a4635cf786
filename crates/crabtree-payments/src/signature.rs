// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook signature verification.
//!
//! The gateway signs each notification with a header of the form
//! `t=<unix seconds>,v1=<hex HMAC-SHA256>` where the MAC covers
//! `"<t>.<raw body>"` under the shared webhook secret. Several `v1` entries
//! may appear while a secret is being rotated; any one matching is enough.

use crabtree_core::ShopError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "Payment-Signature";

/// Checks notification signatures against a shared secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[redacted]")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: i64::try_from(tolerance_secs).unwrap_or(i64::MAX),
        }
    }

    /// Verify `header` over `payload` against the current clock.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), ShopError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `header` over `payload` as if the time were `now` (unix seconds).
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), ShopError> {
        let parsed = ParsedHeader::parse(header)?;

        // The timestamp is sender-controlled; extreme values must not overflow.
        let skew = now.checked_sub(parsed.timestamp).map(i64::unsigned_abs);
        if skew.is_none_or(|skew| skew > self.tolerance_secs.unsigned_abs()) {
            return Err(ShopError::Authenticity(format!(
                "signature timestamp {} is outside the {}s tolerance",
                parsed.timestamp, self.tolerance_secs
            )));
        }

        for candidate in &parsed.signatures {
            let mac = self.mac_for(parsed.timestamp, payload)?;
            if mac.verify_slice(candidate).is_ok() {
                return Ok(());
            }
        }
        Err(ShopError::Authenticity("signature mismatch".into()))
    }

    fn mac_for(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, ShopError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| ShopError::Internal(format!("invalid webhook secret: {e}")))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

impl ParsedHeader {
    fn parse(header: &str) -> Result<Self, ShopError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                "v1" => {
                    if let Ok(bytes) = hex::decode(value) {
                        signatures.push(bytes);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| ShopError::Authenticity("signature header has no timestamp".into()))?;
        if signatures.is_empty() {
            return Err(ShopError::Authenticity(
                "signature header has no v1 signature".into(),
            ));
        }
        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Produce a signature header for `payload`. Used by tests and local tooling
/// that replays notifications.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let verifier = SignatureVerifier::new(secret, 0);
    match verifier.mac_for(timestamp, payload) {
        Ok(mac) => format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes())),
        Err(_) => format!("t={timestamp}"),
    }
}
