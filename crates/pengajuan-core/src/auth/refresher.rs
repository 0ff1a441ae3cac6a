use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::credential::TokenPair;

/// Refresh endpoint, relative to the backend base URL
const REFRESH_PATH: &str = "/auth/refresh-token";

/// Why a refresh exchange failed. Callers treat every variant the same way;
/// the detail only ends up in logs.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("refresh token is empty")]
    MissingToken,

    #[error("refresh request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("refresh endpoint returned {0}")]
    Status(StatusCode),

    #[error("refresh rejected by backend: {0}")]
    Rejected(String),

    #[error("malformed refresh payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct RefreshEnvelope {
    #[serde(alias = "Status")]
    status: Option<String>,
    message: Option<String>,
    data: Option<RefreshPayload>,
}

#[derive(Debug, Deserialize)]
struct RefreshPayload {
    #[serde(rename = "accessToken", alias = "token")]
    access_token: String,
    #[serde(rename = "refreshToken", alias = "refresh-token")]
    refresh_token: String,
}

/// Exchanges a refresh token for a new token pair.
///
/// Exactly one network call per `refresh`; no internal retries.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    client: Client,
    endpoint: String,
}

impl TokenRefresher {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH),
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        if refresh_token.is_empty() {
            return Err(RefreshError::MissingToken);
        }

        debug!(endpoint = %self.endpoint, "Refreshing access token");
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(refresh_token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RefreshError::Status(status));
        }

        let body = response.text().await?;
        let envelope: RefreshEnvelope =
            serde_json::from_str(&body).map_err(|e| RefreshError::Malformed(e.to_string()))?;

        let succeeded = envelope
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("success"));
        if !succeeded {
            return Err(RefreshError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "status is not success".to_string()),
            ));
        }

        let payload = envelope
            .data
            .ok_or_else(|| RefreshError::Malformed("missing data".to_string()))?;
        if payload.access_token.is_empty() || payload.refresh_token.is_empty() {
            return Err(RefreshError::Malformed("empty token in payload".to_string()));
        }

        Ok(TokenPair::new(payload.access_token, payload.refresh_token))
    }
}
