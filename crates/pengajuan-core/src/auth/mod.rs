//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `Credential`: the identity plus its access/refresh token pair
//! - `CredentialStore`: the shared, generation-counted holder of the credential
//! - `SessionFile`: on-disk persistence so a session survives restarts
//! - `TokenRefresher`: the refresh-token exchange against the backend
//! - `SessionInvalidator`: clears the session and signals a return to sign-in

pub mod credential;
pub mod invalidator;
pub mod jwt;
pub mod refresher;
pub mod session;
pub mod store;

pub use credential::{Credential, TokenPair};
pub use invalidator::{SessionEvent, SessionInvalidator, SignOutReason};
pub use jwt::{decode_expiry, TokenError};
pub use refresher::{RefreshError, TokenRefresher};
pub use session::SessionFile;
pub use store::CredentialStore;
