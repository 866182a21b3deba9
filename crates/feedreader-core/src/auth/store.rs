use std::sync::Arc;

use chrono::Utc;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::api::{AuthError, Registrar};

use super::{Credential, Session};

/// A registration call running on the runtime, owned by the store.
struct PendingAcquisition {
    username: String,
    rx: oneshot::Receiver<Result<Credential, AuthError>>,
}

/// Single source of truth for the session.
///
/// Every write goes through `acquire_credential`, `clear_session` or
/// `set_last_error`. At most one acquisition is in flight at a time; a second
/// one is refused with [`AuthError::AcquisitionInProgress`].
pub struct SessionStore<R: ?Sized> {
    registrar: Arc<R>,
    session: Session,
    pending: Option<PendingAcquisition>,
}

impl<R: Registrar + 'static> SessionStore<R> {
    pub fn new(registrar: R) -> Self {
        Self::with_shared(Arc::new(registrar))
    }
}

impl<R: Registrar + ?Sized + 'static> SessionStore<R> {
    /// Build a store around a registrar that may be shared or type-erased,
    /// e.g. `Arc<dyn Registrar>`.
    pub fn with_shared(registrar: Arc<R>) -> Self {
        Self {
            registrar,
            session: Session::default(),
            pending: None,
        }
    }

    /// Register `username` and wait for the outcome.
    ///
    /// On failure the credential is left untouched and the user-facing message
    /// is stored as the last error.
    pub async fn acquire_credential(&mut self, username: &str) -> Result<(), AuthError> {
        if self.pending.is_some() {
            return Err(Self::refuse(username));
        }

        debug!(username, "Acquiring credential");
        let result = self.registrar.register(username).await;
        self.apply(username, result)
    }

    /// Start a registration on the runtime and return immediately.
    ///
    /// The outcome is applied by [`Self::poll_pending`] (or [`Self::settle`]),
    /// regardless of which view started it. Must be called within a tokio
    /// runtime.
    pub fn begin_acquire(&mut self, username: &str) -> Result<(), AuthError> {
        if self.pending.is_some() {
            return Err(Self::refuse(username));
        }

        debug!(username, "Starting background credential acquisition");
        let (tx, rx) = oneshot::channel();
        let registrar = Arc::clone(&self.registrar);
        let name = username.to_string();

        tokio::spawn(async move {
            let result = registrar.register(&name).await;
            // Receiver is gone only if the store was dropped
            let _ = tx.send(result);
        });

        self.pending = Some(PendingAcquisition {
            username: username.to_string(),
            rx,
        });
        Ok(())
    }

    /// Apply a finished background acquisition, if any. Never blocks.
    ///
    /// Returns `None` while nothing finished, and the outcome exactly once
    /// otherwise.
    pub fn poll_pending(&mut self) -> Option<Result<(), AuthError>> {
        let result = match self.pending.as_mut()?.rx.try_recv() {
            Err(TryRecvError::Empty) => return None,
            Ok(result) => result,
            Err(TryRecvError::Closed) => Err(Self::task_lost()),
        };

        let username = self.pending.take().map(|p| p.username).unwrap_or_default();
        Some(self.apply(&username, result))
    }

    /// Wait for the in-flight acquisition (if any) and apply it.
    pub async fn settle(&mut self) -> Option<Result<(), AuthError>> {
        let pending = self.pending.take()?;
        let result = pending.rx.await.unwrap_or_else(|_| Err(Self::task_lost()));
        Some(self.apply(&pending.username, result))
    }

    pub fn is_acquiring(&self) -> bool {
        self.pending.is_some()
    }
}

impl<R: ?Sized> SessionStore<R> {
    /// Drop the credential. Purely local: the key stays valid on the server.
    ///
    /// An acquisition still in flight is not cancelled and will be applied
    /// when it completes.
    pub fn clear_session(&mut self) {
        if self.session.is_authenticated() {
            info!("Session cleared");
        }
        self.session.reset();
    }

    /// Snapshot of the current session
    pub fn read_session(&self) -> Session {
        self.session.clone()
    }

    /// Borrow the current session without cloning
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.session.credential()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.session.last_error()
    }

    /// Set or clear the last error. Forms clear it as soon as the user edits input.
    pub fn set_last_error(&mut self, message: Option<String>) {
        self.session.set_last_error(message);
    }

    fn apply(&mut self, username: &str, result: Result<Credential, AuthError>) -> Result<(), AuthError> {
        match result {
            Ok(credential) => {
                self.session.sign_in(credential, Utc::now());
                info!(username, "Credential acquired");
                Ok(())
            }
            Err(err) => {
                warn!(username, error = %err, "Credential acquisition failed");
                self.session.set_last_error(Some(err.user_message()));
                Err(err)
            }
        }
    }

    fn refuse(username: &str) -> AuthError {
        debug!(username, "Acquisition refused, another is in flight");
        AuthError::AcquisitionInProgress
    }

    fn task_lost() -> AuthError {
        AuthError::Transport("registration task ended without a response".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use tokio::sync::Notify;

    use crate::api::decode_registration;
    use crate::auth::SessionState;

    /// Answers every registration with a fixed HTTP status and body.
    struct CannedRegistrar {
        status: StatusCode,
        body: &'static str,
    }

    #[async_trait]
    impl Registrar for CannedRegistrar {
        async fn register(&self, _username: &str) -> Result<Credential, AuthError> {
            decode_registration(self.status, self.body)
        }
    }

    /// Fails as if the server were unreachable.
    struct OfflineRegistrar;

    #[async_trait]
    impl Registrar for OfflineRegistrar {
        async fn register(&self, _username: &str) -> Result<Credential, AuthError> {
            Err(AuthError::Transport("connection refused".to_string()))
        }
    }

    /// Plays back a fixed sequence of outcomes.
    struct ScriptedRegistrar {
        outcomes: Mutex<VecDeque<Result<&'static str, AuthError>>>,
    }

    impl ScriptedRegistrar {
        fn new(outcomes: Vec<Result<&'static str, AuthError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }
    }

    #[async_trait]
    impl Registrar for ScriptedRegistrar {
        async fn register(&self, _username: &str) -> Result<Credential, AuthError> {
            let next = self.outcomes.lock().unwrap().pop_front();
            match next.expect("script exhausted") {
                Ok(key) => Ok(Credential::parse(key).expect("key should parse")),
                Err(err) => Err(err),
            }
        }
    }

    /// Holds every registration until released, then issues `K-<username>`.
    struct GatedRegistrar {
        gate: Notify,
    }

    #[async_trait]
    impl Registrar for GatedRegistrar {
        async fn register(&self, username: &str) -> Result<Credential, AuthError> {
            self.gate.notified().await;
            Ok(Credential::parse(&format!("K-{}", username)).expect("key should parse"))
        }
    }

    fn created(body: &'static str) -> SessionStore<CannedRegistrar> {
        SessionStore::new(CannedRegistrar { status: StatusCode::CREATED, body })
    }

    fn assert_consistent<R: ?Sized>(store: &SessionStore<R>) {
        let session = store.read_session();
        assert_eq!(session.is_authenticated(), session.credential().is_some());
        assert_eq!(session.acquired_at().is_some(), session.credential().is_some());
    }

    #[tokio::test]
    async fn test_acquire_success() {
        let mut store = created(r#"{"api_key":"K123"}"#);

        store.acquire_credential("alice").await.expect("acquire should succeed");

        assert!(store.is_authenticated());
        assert_eq!(store.credential().map(Credential::expose), Some("K123"));
        assert!(store.last_error().is_none());
        assert_eq!(store.session().state(), SessionState::LoggedIn);
        assert_consistent(&store);
    }

    #[tokio::test]
    async fn test_acquire_rejected() {
        let mut store = SessionStore::new(CannedRegistrar {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":"User already exists"}"#,
        });

        let err = store.acquire_credential("taken").await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected { status: 400, .. }));
        assert!(!store.is_authenticated());
        assert!(store.credential().is_none());
        let message = store.last_error().expect("last error should be set");
        assert!(message.contains("User already exists"));
        assert_consistent(&store);
    }

    #[tokio::test]
    async fn test_acquire_malformed_body() {
        let mut store = created("{}");

        let err = store.acquire_credential("alice").await.unwrap_err();

        assert!(matches!(err, AuthError::MalformedResponse(_)));
        assert!(!store.is_authenticated());
        assert!(store.last_error().is_some());
        assert_consistent(&store);
    }

    #[tokio::test]
    async fn test_acquire_transport_failure() {
        let mut store = SessionStore::new(OfflineRegistrar);

        let err = store.acquire_credential("alice").await.unwrap_err();

        assert!(matches!(err, AuthError::Transport(_)));
        assert_eq!(store.last_error(), Some(err.user_message().as_str()));
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_failure_keeps_existing_credential() {
        let mut store = SessionStore::new(ScriptedRegistrar::new(vec![
            Ok("K1"),
            Err(AuthError::Transport("connection reset".to_string())),
        ]));
        store.acquire_credential("alice").await.expect("first acquire should succeed");

        assert!(store.acquire_credential("bob").await.is_err());

        assert_eq!(store.credential().map(Credential::expose), Some("K1"));
        assert!(store.is_authenticated());
        assert!(store.last_error().is_some());
        assert_consistent(&store);
    }

    #[tokio::test]
    async fn test_set_last_error_clears_without_touching_credential() {
        let mut store = created("{}");
        let _ = store.acquire_credential("alice").await;
        assert!(store.last_error().is_some());

        store.set_last_error(None);

        assert!(store.last_error().is_none());
        assert!(!store.is_authenticated());
        assert_eq!(store.read_session(), Session::default());
    }

    #[test]
    fn test_clear_session_when_logged_out_is_noop() {
        let mut store = created("{}");
        let before = store.read_session();

        store.clear_session();
        store.clear_session();

        assert_eq!(store.read_session(), before);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_full_cycle_returns_to_initial_state() {
        let mut store = created(r#"{"api_key":"K123"}"#);
        let initial = store.read_session();

        store.acquire_credential("alice").await.expect("acquire should succeed");
        assert_eq!(store.session().state(), SessionState::LoggedIn);

        store.clear_session();
        assert_eq!(store.session().state(), SessionState::LoggedOut);
        assert_eq!(store.read_session(), initial);
        assert_consistent(&store);
    }

    #[tokio::test]
    async fn test_background_acquire_applies_on_poll() {
        let registrar = Arc::new(GatedRegistrar { gate: Notify::new() });
        let mut store = SessionStore::with_shared(Arc::clone(&registrar));

        store.begin_acquire("alice").expect("begin should succeed");
        assert!(store.is_acquiring());
        assert!(store.poll_pending().is_none());
        assert!(!store.is_authenticated());

        registrar.gate.notify_one();
        let outcome = store.settle().await.expect("an acquisition was pending");

        assert!(outcome.is_ok());
        assert!(!store.is_acquiring());
        assert_eq!(store.credential().map(Credential::expose), Some("K-alice"));
        // Reported once only
        assert!(store.poll_pending().is_none());
    }

    #[tokio::test]
    async fn test_poll_pending_eventually_reports() {
        let mut store = created(r#"{"api_key":"K123"}"#);
        store.begin_acquire("alice").expect("begin should succeed");

        let mut outcome = None;
        for _ in 0..100 {
            outcome = store.poll_pending();
            if outcome.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert!(matches!(outcome, Some(Ok(()))));
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_second_acquisition_is_refused_while_in_flight() {
        let registrar = Arc::new(GatedRegistrar { gate: Notify::new() });
        let mut store = SessionStore::with_shared(Arc::clone(&registrar));

        store.begin_acquire("alice").expect("begin should succeed");
        assert_eq!(store.begin_acquire("bob"), Err(AuthError::AcquisitionInProgress));
        assert_eq!(
            store.acquire_credential("carol").await,
            Err(AuthError::AcquisitionInProgress)
        );
        // Refusal leaves the session alone
        assert!(store.last_error().is_none());

        registrar.gate.notify_one();
        store.settle().await.expect("an acquisition was pending").expect("should succeed");
        assert_eq!(store.credential().map(Credential::expose), Some("K-alice"));
    }

    #[tokio::test]
    async fn test_result_applied_after_logout() {
        let registrar = Arc::new(GatedRegistrar { gate: Notify::new() });
        let mut store = SessionStore::with_shared(Arc::clone(&registrar));

        store.begin_acquire("alice").expect("begin should succeed");
        store.clear_session();
        assert!(store.is_acquiring());

        registrar.gate.notify_one();
        store.settle().await.expect("an acquisition was pending").expect("should succeed");
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_type_erased_registrar() {
        let registrar: Arc<dyn Registrar> = Arc::new(CannedRegistrar {
            status: StatusCode::CREATED,
            body: r#"{"api_key":"K123"}"#,
        });
        let mut store = SessionStore::with_shared(registrar);

        store.begin_acquire("alice").expect("begin should succeed");
        store.settle().await.expect("an acquisition was pending").expect("should succeed");
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_settle_without_pending() {
        let mut store = created("{}");
        assert!(store.settle().await.is_none());
        assert!(store.poll_pending().is_none());
    }
}
