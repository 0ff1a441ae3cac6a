use tokio::sync::broadcast;
use tracing::info;

use super::CredentialStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// The refresh exchange failed
    RefreshFailed,
    /// No refresh token was available to renew the session
    RefreshTokenMissing,
    /// The backend rejected a freshly refreshed access token
    CredentialRejected,
    /// The user signed out
    SignedOut,
}

impl SignOutReason {
    pub fn message(&self) -> &'static str {
        match self {
            SignOutReason::RefreshFailed | SignOutReason::RefreshTokenMissing => {
                "Session expired. Please log in again."
            }
            SignOutReason::CredentialRejected => {
                "Session was rejected by the server. Please log in again."
            }
            SignOutReason::SignedOut => "Signed out.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were cleared and the front end must return to sign-in
    SignInRequired { reason: SignOutReason },
}

/// Clears the session and tells front ends to return to the sign-in screen.
///
/// Events travel on the store's channel, so every invalidator built over the
/// same store reaches the same subscribers.
#[derive(Debug, Clone)]
pub struct SessionInvalidator {
    store: CredentialStore,
}

impl SessionInvalidator {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.store.subscribe()
    }

    /// Clear the store and emit `SignInRequired`.
    ///
    /// Idempotent: with no credential stored nothing happens and no event is
    /// sent. Returns whether a credential was cleared.
    pub fn invalidate(&self, reason: SignOutReason) -> bool {
        let Some(cleared) = self.store.clear() else {
            return false;
        };

        info!(user = %cleared.subject_id, ?reason, "Session invalidated");
        self.store.notify(SessionEvent::SignInRequired { reason });
        true
    }
}
