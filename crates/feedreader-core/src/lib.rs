//! Core library for feedreader.
//!
//! Everything a client of the blog aggregator needs apart from the UI: the
//! session store that owns the issued API key, the HTTP client for the
//! registration, feed and post endpoints, the data models, and configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, AuthError, Registrar};
pub use auth::{Credential, Session, SessionState, SessionStore};
pub use config::Config;
