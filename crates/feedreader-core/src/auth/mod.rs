//! Session and credential lifecycle.
//!
//! This module provides:
//! - `Credential`: a validated, redacted API key
//! - `Session`: the client-local login record (credential, last error)
//! - `SessionStore`: the single owner of the session, mediating every write
//!
//! Nothing here is persisted; a session lives as long as the process.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::Credential;
pub use session::{Session, SessionState};
pub use store::SessionStore;
