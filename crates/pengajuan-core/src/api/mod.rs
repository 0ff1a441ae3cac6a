//! REST API client module for the pengajuan backend.
//!
//! `RequestDispatcher` attaches the bearer token to every call and owns the
//! single refresh-and-retry policy. `ApiClient` layers login and the typed
//! resource endpoints on top of it.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod request;

pub use client::ApiClient;
pub use dispatcher::RequestDispatcher;
pub use error::ApiError;
pub use request::{BackendResponse, PendingRequest};
