//! Webhook signature verification.
//!
//! Implements the Stripe signing scheme: the `Stripe-Signature` header
//! carries `t=<unix>,v1=<hex hmac>` pairs, and the signature is
//! HMAC-SHA256 over `"{t}.{body}"` keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Verify a signed webhook header against the raw body.
///
/// `tolerance_secs` bounds the age of the signed timestamp to prevent
/// replay of captured deliveries.
///
/// # Errors
///
/// Returns `GatewayError::InvalidSignature` on a malformed header, a stale
/// timestamp, or a signature mismatch.
pub fn verify_signature(
    secret: &SecretString,
    header: &str,
    body: &str,
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<(), GatewayError> {
    let (timestamp, provided) = parse_header(header)?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| GatewayError::InvalidSignature("Invalid timestamp".to_string()))?;
    if (now_unix - ts).abs() > tolerance_secs {
        return Err(GatewayError::InvalidSignature(
            "Request timestamp too old".to_string(),
        ));
    }

    let signed_payload = format!("{timestamp}.{body}");
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| GatewayError::InvalidSignature(e.to_string()))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    // Constant-time comparison
    if !constant_time_compare(&expected, provided) {
        return Err(GatewayError::InvalidSignature(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

/// Split the header into its `t` and first `v1` components.
fn parse_header(header: &str) -> Result<(&str, &str), GatewayError> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        if let Some((key, value)) = part.trim().split_once('=') {
            match key {
                "t" => timestamp = Some(value),
                "v1" if signature.is_none() => signature = Some(value),
                _ => {}
            }
        }
    }
    match (timestamp, signature) {
        (Some(t), Some(v1)) => Ok((t, v1)),
        _ => Err(GatewayError::InvalidSignature(
            "Malformed signature header".to_string(),
        )),
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &str = r#"{"type":"checkout.session.completed"}"#;

    fn sign(timestamp: i64, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{body}").as_bytes());
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let now = 1_700_000_000;
        let header = sign(now, BODY);
        let secret = SecretString::from(SECRET);
        assert!(verify_signature(&secret, &header, BODY, now, 300).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let now = 1_700_000_000;
        let header = sign(now, BODY);
        let secret = SecretString::from(SECRET);
        let result = verify_signature(&secret, &header, r#"{"tampered":true}"#, now, 300);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let now = 1_700_000_000;
        let header = sign(now - 301, BODY);
        let secret = SecretString::from(SECRET);
        assert!(verify_signature(&secret, &header, BODY, now, 300).is_err());
    }

    #[test]
    fn rejects_malformed_header() {
        let secret = SecretString::from(SECRET);
        let result = verify_signature(&secret, "v1=deadbeef", BODY, 0, 300);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = 1_700_000_000;
        let header = sign(now, BODY);
        let secret = SecretString::from("whsec_other");
        assert!(verify_signature(&secret, &header, BODY, now, 300).is_err());
    }
}
