//! Svix signature verification for Clerk webhooks.
//!
//! Signed content is `"{svix-id}.{svix-timestamp}.{body}"`, HMAC-SHA256 keyed
//! with the base64 part of the `whsec_...` secret. `svix-signature` carries one
//! or more space-separated `v1,<base64>` entries; any match accepts the message.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook secret is not valid base64")]
    InvalidSecret,

    #[error("invalid svix-timestamp header")]
    InvalidTimestamp,

    #[error("message timestamp too old")]
    TimestampTooOld,

    #[error("message timestamp too new")]
    TimestampTooNew,

    #[error("no matching signature found")]
    InvalidSignature,
}

/// The three Svix headers accompanying every delivery.
#[derive(Debug, Clone, Copy)]
pub struct SvixHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

/// Verifies webhook deliveries against the signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
    tolerance_secs: i64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("key", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookVerifier {
    /// Builds a verifier from a `whsec_`-prefixed (or bare) base64 secret.
    pub fn new(secret: &str, tolerance_secs: i64) -> Result<Self, WebhookError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        if key.is_empty() {
            return Err(WebhookError::InvalidSecret);
        }
        Ok(Self {
            key,
            tolerance_secs,
        })
    }

    /// Verifies `payload` against the headers using the current clock.
    pub fn verify(&self, payload: &[u8], headers: SvixHeaders<'_>) -> Result<(), WebhookError> {
        self.verify_at(payload, headers, Utc::now().timestamp())
    }

    /// Verifies `payload` as if the current time were `now` (Unix seconds).
    pub fn verify_at(
        &self,
        payload: &[u8],
        headers: SvixHeaders<'_>,
        now: i64,
    ) -> Result<(), WebhookError> {
        let timestamp = headers
            .timestamp
            .trim()
            .parse::<i64>()
            .map_err(|_| WebhookError::InvalidTimestamp)?;

        // abs_diff cannot overflow on attacker-chosen timestamps
        if now.abs_diff(timestamp) > self.tolerance_secs.max(0) as u64 {
            return Err(if timestamp < now {
                WebhookError::TimestampTooOld
            } else {
                WebhookError::TimestampTooNew
            });
        }

        for entry in headers.signature.split_whitespace() {
            let Some((version, encoded)) = entry.split_once(',') else {
                continue;
            };
            if version != SIGNATURE_VERSION {
                continue;
            }
            let Ok(expected) = STANDARD.decode(encoded) else {
                continue;
            };
            // verify_slice compares in constant time
            if self
                .mac(headers.id, timestamp, payload)?
                .verify_slice(&expected)
                .is_ok()
            {
                return Ok(());
            }
        }

        Err(WebhookError::InvalidSignature)
    }

    /// Produces a `v1,<base64>` signature for the given message.
    #[cfg(test)]
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> String {
        let digest = self
            .mac(msg_id, timestamp, payload)
            .unwrap()
            .finalize()
            .into_bytes();
        format!("{SIGNATURE_VERSION},{}", STANDARD.encode(digest))
    }

    fn mac(
        &self,
        msg_id: &str,
        timestamp: i64,
        payload: &[u8],
    ) -> Result<HmacSha256, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookError::InvalidSecret)?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET, 300).unwrap()
    }

    fn headers<'a>(timestamp: &'a str, signature: &'a str) -> SvixHeaders<'a> {
        SvixHeaders {
            id: "msg_p5jXN8AQM9LWM0D4loKWxJek",
            timestamp,
            signature,
        }
    }

    #[test]
    fn test_valid_signature_verifies() {
        let v = verifier();
        let body = br#"{"type":"user.created","data":{}}"#;
        let sig = v.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, body);
        let ts = NOW.to_string();
        assert_eq!(v.verify_at(body, headers(&ts, &sig), NOW), Ok(()));
    }

    #[test]
    fn test_any_matching_entry_is_accepted() {
        let v = verifier();
        let body = b"{}";
        let good = v.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, body);
        let header = format!("v1,bm90LXRoZS1zaWduYXR1cmU= v2,ignored {good}");
        let ts = NOW.to_string();
        assert!(v.verify_at(body, headers(&ts, &header), NOW).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let v = verifier();
        let sig = v.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, b"{\"a\":1}");
        let ts = NOW.to_string();
        assert_eq!(
            v.verify_at(b"{\"a\":2}", headers(&ts, &sig), NOW),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = WebhookVerifier::new("whsec_c2VjcmV0LWtleS1mb3ItdGVzdGluZw==", 300).unwrap();
        let sig = other.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", NOW, b"{}");
        let ts = NOW.to_string();
        assert_eq!(
            verifier().verify_at(b"{}", headers(&ts, &sig), NOW),
            Err(WebhookError::InvalidSignature)
        );
    }

    #[test]
    fn test_stale_and_future_timestamps_rejected() {
        let v = verifier();
        let old = NOW - 301;
        let sig = v.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", old, b"{}");
        let ts = old.to_string();
        assert_eq!(
            v.verify_at(b"{}", headers(&ts, &sig), NOW),
            Err(WebhookError::TimestampTooOld)
        );

        let future = NOW + 301;
        let sig = v.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", future, b"{}");
        let ts = future.to_string();
        assert_eq!(
            v.verify_at(b"{}", headers(&ts, &sig), NOW),
            Err(WebhookError::TimestampTooNew)
        );
    }

    #[test]
    fn test_non_numeric_timestamp_rejected() {
        assert_eq!(
            verifier().verify_at(b"{}", headers("yesterday", "v1,abc"), NOW),
            Err(WebhookError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_extreme_timestamps_rejected_without_overflow() {
        let v = verifier();
        let min = i64::MIN.to_string();
        assert_eq!(
            v.verify_at(b"{}", headers(&min, "v1,abc"), NOW),
            Err(WebhookError::TimestampTooOld)
        );
        let max = i64::MAX.to_string();
        assert_eq!(
            v.verify_at(b"{}", headers(&max, "v1,abc"), NOW),
            Err(WebhookError::TimestampTooNew)
        );
    }

    #[test]
    fn test_bare_secret_without_prefix_is_accepted() {
        assert!(WebhookVerifier::new("MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw", 300).is_ok());
        assert_eq!(
            WebhookVerifier::new("whsec_not base64!", 300).unwrap_err(),
            WebhookError::InvalidSecret
        );
    }
}
