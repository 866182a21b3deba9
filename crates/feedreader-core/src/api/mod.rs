//! REST API client module for the blog aggregator server.
//!
//! This module provides the `ApiClient` for registering users and fetching
//! feeds and posts, plus the `Registrar` seam the session store acquires
//! credentials through.
//!
//! Authenticated endpoints take the API key as a bearer token.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::auth::Credential;

pub use client::{decode_registration, ApiClient};
pub use error::{ApiError, AuthError};

/// Turns a username into an issued credential.
///
/// `ApiClient` implements this against the real registration endpoint; tests
/// substitute canned implementations that perform no network I/O.
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register(&self, username: &str) -> Result<Credential, AuthError>;
}
