//! Authenticated request dispatch with one transparent refresh cycle.
//!
//! Every request follows the same path:
//!
//! 1. Attach the stored access token and send.
//! 2. 2xx is returned to the caller. 403 and every other failure are terminal.
//! 3. 401 triggers one refresh (coalesced across concurrent requests), then
//!    the original request is resent once with the new access token.
//! 4. A failed refresh, or a 401 on the resend, invalidates the session.

use reqwest::{header, Client, Response, StatusCode};
use tracing::{debug, info, warn};

use super::{ApiError, BackendResponse, PendingRequest};
use crate::auth::{
    Credential, CredentialStore, SessionEvent, SessionInvalidator, SignOutReason, TokenRefresher,
};

/// Sends requests for one session. Clone is cheap: the HTTP client, the
/// store and the event channel are all shared.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    client: Client,
    base_url: String,
    store: CredentialStore,
    refresher: TokenRefresher,
    invalidator: SessionInvalidator,
}

impl RequestDispatcher {
    pub fn new(client: Client, base_url: &str, store: CredentialStore) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            refresher: TokenRefresher::new(client.clone(), &base_url),
            invalidator: SessionInvalidator::new(store.clone()),
            client,
            base_url,
            store,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn invalidator(&self) -> &SessionInvalidator {
        &self.invalidator
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.invalidator.subscribe()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send `request` with the current credential, refreshing at most once.
    pub async fn dispatch(&self, mut request: PendingRequest) -> Result<BackendResponse, ApiError> {
        let (credential, generation) = self.store.snapshot();
        let mut credential = credential.ok_or(ApiError::NotAuthenticated)?;
        let mut new_credential = None;

        if credential.is_expired() {
            debug!(path = %request.path, "Access token expired locally, refreshing before send");
            request.mark_retried();
            credential = self.refresh_session(&credential, generation).await?;
            new_credential = Some(credential.clone());
        }

        let response = self.send(&request, &credential.access_token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::finish(response, new_credential).await;
        }

        if request.is_retried() {
            return Err(self.reject_refreshed(&request));
        }

        debug!(path = %request.path, "Received 401, refreshing session");
        request.mark_retried();
        let refreshed = self.refresh_session(&credential, generation).await?;

        let retry = self.send(&request, &refreshed.access_token).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            return Err(self.reject_refreshed(&request));
        }
        Self::finish(retry, Some(refreshed)).await
    }

    /// Obtain a credential newer than `stale`.
    ///
    /// Refreshes are serialized per session. A request that waited on the lock
    /// reuses the credential the previous holder stored instead of spending
    /// the refresh token a second time.
    async fn refresh_session(
        &self,
        stale: &Credential,
        seen_generation: u64,
    ) -> Result<Credential, ApiError> {
        let _guard = self.store.lock_refresh().await;

        let (current, generation) = self.store.snapshot();
        let Some(current) = current else {
            // Another request already gave up on this session
            return Err(ApiError::SessionExpired);
        };

        if generation != seen_generation && current.access_token != stale.access_token {
            debug!("Reusing credential refreshed by a concurrent request");
            return Ok(current);
        }

        if current.refresh_token.is_empty() {
            warn!("No refresh token available, ending session");
            self.invalidator.invalidate(SignOutReason::RefreshTokenMissing);
            return Err(ApiError::SessionExpired);
        }

        match self.refresher.refresh(&current.refresh_token).await {
            Ok(pair) => {
                let renewed = current.with_tokens(pair);
                self.store.set(renewed.clone());
                info!(user = %renewed.subject_id, "Access token refreshed");
                Ok(renewed)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.invalidator.invalidate(SignOutReason::RefreshFailed);
                Err(ApiError::SessionExpired)
            }
        }
    }

    fn reject_refreshed(&self, request: &PendingRequest) -> ApiError {
        warn!(path = %request.path, "Refreshed credential rejected, ending session");
        self.invalidator.invalidate(SignOutReason::CredentialRejected);
        ApiError::SessionExpired
    }

    async fn send(&self, request: &PendingRequest, access_token: &str) -> Result<Response, ApiError> {
        let mut headers = request.headers.clone();
        headers.remove(header::AUTHORIZATION);

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path))
            .headers(headers)
            .bearer_auth(access_token);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, path = %request.path, retried = request.is_retried(), "Sending request");
        Ok(builder.send().await?)
    }

    async fn finish(
        response: Response,
        new_credential: Option<Credential>,
    ) -> Result<BackendResponse, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(BackendResponse {
                status,
                body,
                new_credential,
            })
        } else {
            debug!(%status, "Request failed");
            Err(ApiError::from_status(status, &body))
        }
    }
}
