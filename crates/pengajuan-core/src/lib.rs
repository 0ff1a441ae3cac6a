//! Core library for the pengajuan product submission backend.
//!
//! - [`auth`]: credentials, the shared credential store, token refresh and
//!   session invalidation
//! - [`api`]: the authenticated request dispatcher and the typed `ApiClient`
//! - [`models`]: backend envelopes and entity types
//! - [`config`]: configuration and directory layout

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, BackendResponse, PendingRequest, RequestDispatcher};
pub use auth::{Credential, CredentialStore, SessionEvent, SessionFile, SignOutReason};
pub use config::Config;
