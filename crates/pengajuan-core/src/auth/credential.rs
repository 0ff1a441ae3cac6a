use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::jwt::decode_expiry;

/// Buffer before expiry at which a token is considered due for refresh (5 minutes)
const TOKEN_REFRESH_BUFFER_SECS: i64 = 5 * 60;

/// Access/refresh pair returned by a successful refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expiry: Option<i64>,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        let access_token_expiry = expiry_of(&access_token);
        Self {
            access_token,
            refresh_token,
            access_token_expiry,
        }
    }
}

/// The signed-in identity together with its current token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub subject_id: String,
    pub display_name: String,
    pub role: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Epoch seconds decoded from the access token, `None` for opaque tokens
    pub access_token_expiry: Option<i64>,
}

impl Credential {
    pub fn new(
        subject_id: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        let access_token = access_token.into();
        let access_token_expiry = expiry_of(&access_token);
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            role: role.into(),
            access_token,
            refresh_token: refresh_token.into(),
            access_token_expiry,
        }
    }

    /// Same identity, rotated tokens. Both tokens always change together.
    pub fn with_tokens(&self, pair: TokenPair) -> Self {
        Self {
            subject_id: self.subject_id.clone(),
            display_name: self.display_name.clone(),
            role: self.role.clone(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_token_expiry: pair.access_token_expiry,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.access_token_expiry
            .and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the access token is past its decoded expiry.
    /// Tokens without a readable expiry are never considered expired locally.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.access_token_expiry.is_some_and(|exp| now >= exp)
    }

    /// Check if the token will expire soon and should be refreshed
    pub fn needs_refresh(&self) -> bool {
        let now = Utc::now().timestamp();
        self.access_token_expiry
            .is_some_and(|exp| now >= exp - TOKEN_REFRESH_BUFFER_SECS)
    }

    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at().map(|at| at - Utc::now())
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> Option<i64> {
        self.time_until_expiry().map(|d| d.num_minutes().max(0))
    }
}

fn expiry_of(access_token: &str) -> Option<i64> {
    match decode_expiry(access_token) {
        Ok(exp) => Some(exp),
        Err(e) => {
            debug!(error = %e, "Access token expiry unreadable, relying on server 401");
            None
        }
    }
}
