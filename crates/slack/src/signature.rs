use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
/// Requests older (or newer) than this are treated as replays.
pub const MAX_CLOCK_SKEW_SECS: i64 = 5 * 60;

const VERSION: &str = "v0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing `{0}` header")]
    MissingHeader(&'static str),
    #[error("request timestamp is not a unix time")]
    InvalidTimestamp,
    #[error("request timestamp is outside the allowed window")]
    Expired,
    #[error("signature is not a `v0=` hex digest")]
    Malformed,
    #[error("signature does not match request body")]
    Mismatch,
}

/// Verifies Slack's `v0` request signature over `v0:{timestamp}:{body}`.
pub fn verify_slack_signature(
    signing_secret: &[u8],
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now_unix: i64,
) -> Result<(), SignatureError> {
    let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
    let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

    let sent_at: i64 = timestamp.trim().parse().map_err(|_| SignatureError::InvalidTimestamp)?;
    if (now_unix - sent_at).abs() > MAX_CLOCK_SKEW_SECS {
        return Err(SignatureError::Expired);
    }

    let digest = signature
        .strip_prefix("v0=")
        .and_then(|encoded| hex::decode(encoded).ok())
        .ok_or(SignatureError::Malformed)?;

    signed_mac(signing_secret, timestamp.trim(), body)?
        .verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}

/// Produces the `v0=` header value for a request; used by tooling and tests.
pub fn sign_request(signing_secret: &[u8], timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_mac(signing_secret, timestamp, body)?;
    Ok(format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes())))
}

fn signed_mac(signing_secret: &[u8], timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret).map_err(|_| SignatureError::Malformed)?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}
