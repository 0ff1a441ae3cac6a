//! Access token payload decoding.
//!
//! Access tokens are JWT-shaped. Only the `exp` claim is read, and the
//! signature is never verified: the backend remains the authority and signals
//! rejection with a 401.

use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),

    #[error("token payload is not valid JSON: {0}")]
    Payload(String),

    #[error("token payload has no exp claim")]
    MissingExpiry,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<serde_json::Number>,
}

/// Decode the `exp` claim (epoch seconds) from an access token.
pub fn decode_expiry(token: &str) -> Result<i64, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(_signature), None)
            if !header.is_empty() && !payload.is_empty() =>
        {
            payload
        }
        _ => return Err(TokenError::Malformed),
    };

    // Some issuers keep the padding even though the JWT format drops it
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    claims
        .exp
        .and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)))
        .ok_or(TokenError::MissingExpiry)
}
