use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use feedreader_core::utils::age_display;

use crate::app::{App, Page, SignUpFocus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.session.credential() {
        Some(_) => account_lines(app),
        None => form_lines(app),
    };

    let block = Block::default()
        .title(format!(" {} ", Page::SignUp.title(app.is_authenticated())))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn form_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Create an account to get an API key and unlock Discover.",
            styles::muted_style(),
        )),
        Line::from(""),
    ];

    // Username field
    let username_focused = app.signup_focus == SignUpFocus::Username;
    let has_error = app.session.last_error().is_some() || app.signup_hint.is_some();
    let username_display = format!("{:<24}", app.signup_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(
            format!("{}{}", username_display, cursor),
            styles::input_style(username_focused, has_error),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    // Submit button
    let button_focused = app.signup_focus == SignUpFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = if app.session.is_acquiring() {
        " Creating... "
    } else if button_focused {
        " ▶ Sign Up ◀ "
    } else {
        "   Sign Up   "
    };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    // Error message
    let error = app.signup_hint.as_deref().or(app.session.last_error());
    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  ", styles::muted_style()),
        Span::styled("Tab", styles::help_key_style()),
        Span::styled(" switch field  ", styles::muted_style()),
        Span::styled("Enter", styles::help_key_style()),
        Span::styled(" submit  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" back to Home", styles::muted_style()),
    ]));

    lines
}

fn account_lines(app: &App) -> Vec<Line<'static>> {
    let session = app.session.session();
    let key = session
        .credential()
        .map(|c| c.expose().to_string())
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  You're signed up!", styles::success_style())),
        Line::from(""),
        Line::from(Span::styled("  Your API key:", styles::muted_style())),
        Line::from(Span::styled(format!("  {}", key), styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled(
            "  Copy it now. It is not stored and cannot be shown again after you log out.",
            styles::muted_style(),
        )),
    ];

    if session.acquired_at().is_some() {
        lines.push(Line::from(Span::styled(
            format!("  Created {}", age_display(session.time_since_acquired())),
            styles::muted_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(" ▶ Log out ◀ ", styles::selected_style()),
        Span::raw("]"),
        Span::styled("  Enter or ", styles::muted_style()),
        Span::styled("[l]", styles::help_key_style()),
    ]));

    lines
}
