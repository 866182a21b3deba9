//! Application state management for feedreader.
//!
//! This module contains the core `App` struct that owns the session store and
//! all UI state, and coordinates the background fetches and registration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use feedreader_core::models::{Feed, Post};
use feedreader_core::{ApiClient, AuthError, Config, Credential, Registrar, SessionStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background fetch channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// How long a toast stays in the status bar.
const TOAST_LIFETIME: Duration = Duration::from_secs(3);

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Pages reachable from the tab bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Discover,
    ApiReference,
    SignUp,
}

impl Page {
    /// Display title. The sign-up page doubles as the account page once signed in.
    pub fn title(&self, authenticated: bool) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Discover => "Discover",
            Page::ApiReference => "API Reference",
            Page::SignUp if authenticated => "Account",
            Page::SignUp => "Sign Up",
        }
    }

    /// Whether the page is only shown to signed-up users
    pub fn requires_auth(&self) -> bool {
        matches!(self, Page::Discover)
    }

    /// Pages visible for the given session, in tab-bar order
    pub fn visible(authenticated: bool) -> Vec<Page> {
        [Page::Home, Page::Discover, Page::ApiReference, Page::SignUp]
            .into_iter()
            .filter(|p| authenticated || !p.requires_auth())
            .collect()
    }

    /// Get the next visible page (wrapping around)
    pub fn next(&self, authenticated: bool) -> Self {
        let pages = Self::visible(authenticated);
        let idx = pages.iter().position(|p| p == self).unwrap_or(0);
        pages[(idx + 1) % pages.len()]
    }

    /// Get the previous visible page (wrapping around)
    pub fn prev(&self, authenticated: bool) -> Self {
        let pages = Self::visible(authenticated);
        let idx = pages.iter().position(|p| p == self).unwrap_or(0);
        pages[(idx + pages.len() - 1) % pages.len()]
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Sign-up form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpFocus {
    Username,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// Transient status-bar notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_LIFETIME
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background fetch tasks back to the main loop.
enum FetchResult {
    /// Public feed list
    Feeds(Vec<Feed>),
    /// A page of posts, tagged with the key it was fetched with
    Posts {
        credential: Credential,
        offset: u32,
        posts: Vec<Post>,
    },
    /// A fetch failed
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    config_path: Option<PathBuf>,
    pub api: ApiClient,
    pub session: SessionStore<dyn Registrar>,

    // UI State
    pub state: AppState,
    pub current_page: Page,

    // Sign-up form state
    pub signup_username: String,
    pub signup_focus: SignUpFocus,
    /// Local validation message, shown without involving the session store
    pub signup_hint: Option<String>,
    /// Username of the registration in flight; the field stays editable meanwhile
    submitted_username: Option<String>,

    // Data
    pub feeds: Vec<Feed>,
    pub feed_selection: usize,
    pub posts: Vec<Post>,
    pub post_selection: usize,
    pub posts_offset: u32,
    pub loading: bool,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchResult>,
    fetch_tx: mpsc::Sender<FetchResult>,

    pub toast: Option<Toast>,
}

impl App {
    /// Create the application, registering through the configured server
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Result<Self> {
        let api = ApiClient::new(config.base_url(), config.request_timeout())?;
        let registrar: Arc<dyn Registrar> = Arc::new(api.clone());
        Ok(Self::with_registrar(config, config_path, api, registrar))
    }

    /// Create the application with an explicit registrar
    pub fn with_registrar(
        config: Config,
        config_path: Option<PathBuf>,
        api: ApiClient,
        registrar: Arc<dyn Registrar>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let signup_username = config.last_username.clone().unwrap_or_default();
        debug!(base_url = %api.base_url(), "App created");

        Self {
            config,
            config_path,
            api,
            session: SessionStore::with_shared(registrar),

            state: AppState::Normal,
            current_page: Page::Home,

            signup_username,
            signup_focus: SignUpFocus::Username,
            signup_hint: None,
            submitted_username: None,

            feeds: Vec::new(),
            feed_selection: 0,
            posts: Vec::new(),
            post_selection: 0,
            posts_offset: 0,
            loading: false,

            fetch_rx: rx,
            fetch_tx: tx,

            toast: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn visible_pages(&self) -> Vec<Page> {
        Page::visible(self.is_authenticated())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch pages. Protected pages are refused while logged out.
    pub fn navigate(&mut self, page: Page) {
        if page.requires_auth() && !self.is_authenticated() {
            self.show_toast(ToastKind::Info, "Sign up to unlock Discover");
            return;
        }
        if page == self.current_page {
            return;
        }

        debug!(?page, "Navigating");
        self.current_page = page;
        match page {
            Page::Home if self.feeds.is_empty() => self.refresh_current_page(),
            Page::Discover if self.posts.is_empty() => self.refresh_current_page(),
            Page::SignUp => self.signup_focus = SignUpFocus::Username,
            _ => {}
        }
    }

    /// Jump to the n-th visible page (0-based), as bound to the number keys
    pub fn navigate_to_index(&mut self, index: usize) {
        if let Some(page) = self.visible_pages().get(index).copied() {
            self.navigate(page);
        }
    }

    pub fn next_page(&mut self) {
        let page = self.current_page.next(self.is_authenticated());
        self.navigate(page);
    }

    pub fn prev_page(&mut self) {
        let page = self.current_page.prev(self.is_authenticated());
        self.navigate(page);
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Accept a typed character into the username field.
    /// Any edit clears the last registration error.
    pub fn signup_push(&mut self, c: char) {
        if can_add_username_char(self.signup_username.chars().count(), c) {
            self.signup_username.push(c);
            self.clear_signup_error();
        }
    }

    pub fn signup_pop(&mut self) {
        if self.signup_username.pop().is_some() {
            self.clear_signup_error();
        }
    }

    fn clear_signup_error(&mut self) {
        self.signup_hint = None;
        if self.session.last_error().is_some() {
            self.session.set_last_error(None);
        }
    }

    /// Submit the sign-up form. The registration runs in the background and
    /// is applied by `check_background_tasks`.
    pub fn submit_signup(&mut self) {
        let username = self.signup_username.trim().to_string();
        if username.is_empty() {
            self.signup_hint = Some("Username is required".to_string());
            return;
        }

        match self.session.begin_acquire(&username) {
            Ok(()) => {
                info!(%username, "Sign-up submitted");
                self.submitted_username = Some(username);
                self.show_toast(ToastKind::Info, "Creating account...");
            }
            Err(e) => self.show_toast(ToastKind::Error, e.user_message()),
        }
    }

    /// React to a settled registration
    fn on_acquisition_settled(&mut self, outcome: Result<(), AuthError>) {
        let username = self.submitted_username.take();
        match outcome {
            Ok(()) => {
                if let Some(username) = username {
                    self.config.last_username = Some(username);
                    self.save_config();
                }

                // Posts belong to the previous key, if any
                self.posts.clear();
                self.posts_offset = 0;
                self.post_selection = 0;

                self.show_toast(ToastKind::Success, "Account created! Copy your API key now.");
            }
            Err(_) => {
                let message = self
                    .session
                    .last_error()
                    .unwrap_or("Sign up failed")
                    .to_string();
                self.show_toast(ToastKind::Error, message);
            }
        }
    }

    /// Drop the credential and return to the public view
    pub fn logout(&mut self) {
        if !self.is_authenticated() {
            return;
        }

        self.session.clear_session();
        self.posts.clear();
        self.posts_offset = 0;
        self.post_selection = 0;
        if self.current_page.requires_auth() {
            self.current_page = Page::Home;
        }
        self.signup_focus = SignUpFocus::Username;
        info!("Logged out");
        self.show_toast(ToastKind::Info, "Logged out");
    }

    fn save_config(&self) {
        let Some(ref path) = self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Data Fetching
    // =========================================================================

    /// Reload whatever the current page shows
    pub fn refresh_current_page(&mut self) {
        match self.current_page {
            Page::Home => self.spawn_fetch_feeds(),
            Page::Discover => self.spawn_fetch_posts(self.posts_offset),
            Page::ApiReference | Page::SignUp => {}
        }
    }

    fn spawn_fetch_feeds(&mut self) {
        self.loading = true;
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_feeds().await {
                Ok(feeds) => FetchResult::Feeds(feeds),
                Err(e) => FetchResult::Error(format!("Failed to load feeds: {}", e)),
            };
            let _ = tx.send(result).await;
        });
    }

    fn spawn_fetch_posts(&mut self, offset: u32) {
        let Some(credential) = self.session.credential() else {
            self.show_toast(ToastKind::Error, "Sign up to see posts");
            return;
        };

        self.loading = true;
        let api = self.api.with_token(credential);
        let credential = credential.clone();
        let limit = self.config.posts_page_size();
        let tx = self.fetch_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_posts(offset, limit).await {
                Ok(posts) => FetchResult::Posts {
                    credential,
                    offset,
                    posts,
                },
                Err(e) => FetchResult::Error(format!("Failed to load posts: {}", e)),
            };
            let _ = tx.send(result).await;
        });
    }

    pub fn next_posts_page(&mut self) {
        let page_size = self.config.posts_page_size();
        if (self.posts.len() as u32) < page_size {
            self.show_toast(ToastKind::Info, "No more posts");
            return;
        }
        self.spawn_fetch_posts(self.posts_offset + page_size);
    }

    pub fn prev_posts_page(&mut self) {
        if self.posts_offset == 0 {
            return;
        }
        let offset = self.posts_offset.saturating_sub(self.config.posts_page_size());
        self.spawn_fetch_posts(offset);
    }

    /// Apply finished background work and expire the toast.
    /// Called once per main-loop tick.
    pub fn check_background_tasks(&mut self) {
        if let Some(outcome) = self.session.poll_pending() {
            self.on_acquisition_settled(outcome);
        }

        while let Ok(result) = self.fetch_rx.try_recv() {
            self.apply_fetch(result);
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired(Instant::now())) {
            self.toast = None;
        }
    }

    fn apply_fetch(&mut self, result: FetchResult) {
        self.loading = false;
        match result {
            FetchResult::Feeds(feeds) => {
                debug!(count = feeds.len(), "Feeds loaded");
                self.feeds = feeds;
                self.feed_selection = self.feed_selection.min(self.feeds.len().saturating_sub(1));
            }
            FetchResult::Posts {
                credential,
                offset,
                posts,
            } => {
                // Posts fetched with a key that is no longer held are stale,
                // including after logout and a fresh sign-up
                if self.session.credential() != Some(&credential) {
                    debug!("Discarding posts fetched with a previous key");
                    return;
                }
                debug!(offset, count = posts.len(), "Posts loaded");
                self.posts = posts;
                self.posts_offset = offset;
                self.post_selection = 0;
            }
            FetchResult::Error(message) => {
                warn!(%message, "Background fetch failed");
                self.show_toast(ToastKind::Error, message);
            }
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select_next(&mut self, step: usize) {
        match self.current_page {
            Page::Home => {
                let max = self.feeds.len().saturating_sub(1);
                self.feed_selection = self.feed_selection.saturating_add(step).min(max);
            }
            Page::Discover => {
                let max = self.posts.len().saturating_sub(1);
                self.post_selection = self.post_selection.saturating_add(step).min(max);
            }
            Page::ApiReference | Page::SignUp => {}
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        match self.current_page {
            Page::Home => self.feed_selection = self.feed_selection.saturating_sub(step),
            Page::Discover => self.post_selection = self.post_selection.saturating_sub(step),
            Page::ApiReference | Page::SignUp => {}
        }
    }

    pub fn show_toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toast = Some(Toast::new(kind, message));
    }
}

// ============================================================================
// Input Validation
// ============================================================================

/// Check if a character is valid for text input (printable, no control chars)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
