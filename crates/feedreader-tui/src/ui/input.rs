//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Page, SignUpFocus, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // The sign-up form captures typing while it is shown
    if app.current_page == Page::SignUp && !app.is_authenticated() {
        if handle_signup_input(app, key) {
            return false;
        }
    } else if app.current_page == Page::SignUp && key.code == KeyCode::Enter {
        app.logout();
        return false;
    }

    handle_global_input(app, key);
    false
}

/// Keys for the sign-up form. Returns true if the key was consumed.
fn handle_signup_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.navigate(Page::Home);
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
            app.signup_focus = match app.signup_focus {
                SignUpFocus::Username => SignUpFocus::Button,
                SignUpFocus::Button => SignUpFocus::Username,
            };
        }
        KeyCode::Enter => {
            app.signup_focus = SignUpFocus::Button;
            app.submit_signup();
        }
        KeyCode::Backspace if app.signup_focus == SignUpFocus::Username => {
            app.signup_pop();
        }
        KeyCode::Char(c) if app.signup_focus == SignUpFocus::Username => {
            app.signup_push(c);
        }
        // Arrows, function keys and shortcuts on the button fall through
        _ => return false,
    }
    true
}

fn handle_global_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.navigate_to_index(index);
        }
        KeyCode::Left => app.prev_page(),
        KeyCode::Right => app.next_page(),
        KeyCode::Char('s') => app.navigate(Page::SignUp),
        KeyCode::Char('l') => app.logout(),
        KeyCode::Char('r') => app.refresh_current_page(),
        KeyCode::Char('n') if app.current_page == Page::Discover => app.next_posts_page(),
        KeyCode::Char('p') if app.current_page == Page::Discover => app.prev_posts_page(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.select_prev(usize::MAX),
        KeyCode::End => app.select_next(usize::MAX),
        KeyCode::Esc if app.current_page != Page::Home => app.navigate(Page::Home),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use feedreader_core::api::decode_registration;
    use feedreader_core::{ApiClient, AuthError, Config, Credential, Registrar};
    use reqwest::StatusCode;

    struct AcceptAll;

    #[async_trait]
    impl Registrar for AcceptAll {
        async fn register(&self, _username: &str) -> Result<Credential, AuthError> {
            decode_registration(StatusCode::CREATED, r#"{"api_key":"K123"}"#)
        }
    }

    fn test_app() -> App {
        let mut config = Config::default();
        config.base_url = Some("http://127.0.0.1:9".to_string());
        let api = ApiClient::new(config.base_url(), Duration::from_secs(1)).expect("client should build");
        App::with_registrar(config, None, api, Arc::new(AcceptAll))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_signup_form_captures_shortcut_letters() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.current_page, Page::SignUp);

        // 'q', 'l' and 'r' are typed, not treated as shortcuts
        type_text(&mut app, "qlr");
        assert_eq!(app.signup_username, "qlr");
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.signup_username, "ql");
    }

    #[tokio::test]
    async fn test_signup_enter_then_logout() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        type_text(&mut app, "alice");
        press(&mut app, KeyCode::Enter);
        assert!(app.session.is_acquiring());

        let outcome = app.session.settle().await.expect("an acquisition was pending");
        assert!(outcome.is_ok());
        assert!(app.is_authenticated());

        // Number keys now reach Discover
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_page, Page::Discover);

        press(&mut app, KeyCode::Char('l'));
        assert!(!app.is_authenticated());
        assert_eq!(app.current_page, Page::Home);
    }

    #[tokio::test]
    async fn test_esc_leaves_signup_form() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_page, Page::Home);
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let mut app = test_app();
        app.current_page = Page::ApiReference;

        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_number_keys_follow_visible_pages() {
        let mut app = test_app();
        app.current_page = Page::ApiReference;

        // Logged out: Discover is hidden so '2' is the API reference
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_page, Page::SignUp);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_page, Page::ApiReference);
    }
}
