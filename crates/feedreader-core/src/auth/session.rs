use chrono::{DateTime, Duration, Utc};

use super::Credential;

/// Coarse login state derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// Client-local record of whether a credential is held.
///
/// Fields are private: only [`super::SessionStore`] mutates a session, and
/// consumers read cloned snapshots. Authentication is derived from the
/// credential rather than stored next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credential: Option<Credential>,
    acquired_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Session {
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the credential was issued, if one is held
    pub fn acquired_at(&self) -> Option<DateTime<Utc>> {
        self.acquired_at
    }

    /// Time since the credential was issued (zero when logged out)
    pub fn time_since_acquired(&self) -> Duration {
        self.acquired_at
            .map(|at| Utc::now() - at)
            .unwrap_or_else(Duration::zero)
    }

    pub(super) fn sign_in(&mut self, credential: Credential, at: DateTime<Utc>) {
        self.credential = Some(credential);
        self.acquired_at = Some(at);
        self.last_error = None;
    }

    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(super) fn set_last_error(&mut self, message: Option<String>) {
        self.last_error = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> Credential {
        Credential::parse(raw).expect("test key should parse")
    }

    #[test]
    fn test_default_is_logged_out() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.credential().is_none());
        assert!(session.last_error().is_none());
        assert_eq!(session.time_since_acquired(), Duration::zero());
    }

    #[test]
    fn test_sign_in_clears_error() {
        let mut session = Session::default();
        session.set_last_error(Some("User already exists".to_string()));
        session.sign_in(key("K1"), Utc::now());

        assert!(session.is_authenticated());
        assert_eq!(session.state(), SessionState::LoggedIn);
        assert!(session.last_error().is_none());
        assert!(session.acquired_at().is_some());
    }

    #[test]
    fn test_reset_matches_default() {
        let mut session = Session::default();
        session.sign_in(key("K1"), Utc::now() - Duration::minutes(5));
        assert!(session.time_since_acquired() >= Duration::minutes(5));

        session.reset();
        assert_eq!(session, Session::default());
    }
}
