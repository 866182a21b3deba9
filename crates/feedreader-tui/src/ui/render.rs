use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use feedreader_core::utils::age_display;

use crate::app::{App, AppState, Page};

use super::pages::{api_reference, discover, home, signup};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Blog Aggregator";
    let server = format!("{}   [?] Help", app.api.base_url());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + server.len() + 4),
        )),
        Span::styled(server, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let authenticated = app.is_authenticated();

    // The sign-up page lives on the right, next to the session action
    let main_tabs: Vec<(String, bool)> = app
        .visible_pages()
        .into_iter()
        .filter(|p| *p != Page::SignUp)
        .enumerate()
        .map(|(i, page)| {
            (
                format!("[{}] {}", i + 1, page.title(authenticated)),
                app.current_page == page,
            )
        })
        .collect();

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(label, styles::tab_style(selected)));
    }

    let session_tabs = if authenticated {
        vec![
            ("[s] Account", app.current_page == Page::SignUp),
            ("[l] Logout", false),
        ]
    } else {
        vec![("[s] Sign Up", app.current_page == Page::SignUp)]
    };

    // Calculate padding to push session tabs to the right
    let main_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let session_width: usize = session_tabs.iter().map(|(l, _)| l.len()).sum::<usize>()
        + (session_tabs.len() - 1) * 3; // " | " separators
    let padding = (area.width as usize).saturating_sub(main_width + session_width + 2);
    spans.push(Span::raw(" ".repeat(padding)));

    for (i, (label, selected)) in session_tabs.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(label, styles::tab_style(selected)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_page {
        Page::Home => home::render(frame, app, area),
        Page::Discover => discover::render(frame, app, area),
        Page::ApiReference => api_reference::render(frame, app, area),
        Page::SignUp => signup::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]eload | [q]uit";

    let left = match app.toast {
        Some(ref toast) => Span::styled(format!(" {} ", toast.message), styles::toast_style(toast.kind)),
        None => {
            let session = app.session.session();
            let text = match session.credential() {
                Some(credential) => format!(
                    " Signed in {} · key {} ",
                    age_display(session.time_since_acquired()),
                    credential.masked()
                ),
                None if app.session.is_acquiring() => " Creating account... ".to_string(),
                None => " Not signed in ".to_string(),
            };
            Span::styled(text, styles::muted_style())
        }
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left.content.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        left,
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Number keys bound to pages, e.g. "1-4" while signed in
fn page_key_range(page_count: usize) -> String {
    format!("1-{}", page_count)
}

fn help_entry(key: &str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(description, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let version = env!("CARGO_PKG_VERSION");

    let lines = vec![
        Line::from(Span::styled("  Blog Aggregator", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_entry(&page_key_range(app.visible_pages().len()), "Switch pages"),
        help_entry("←/→", "Prev/next page"),
        help_entry("↑/↓", "Navigate list"),
        help_entry("PgUp/PgDn", "Scroll list by a page"),
        help_entry("n/p", "Next/prev page of posts"),
        Line::from(""),
        Line::from(Span::styled(" Account", styles::highlight_style())),
        help_entry("s", "Sign up / show API key"),
        help_entry("l", "Log out"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_entry("r", "Reload current page"),
        help_entry("q", "Quit"),
        Line::from(""),
        key_prompt(&[("Press ", Some("?")), (" or ", Some("Esc")), (" to close", None)]),
    ];

    render_dialog(frame, 52, lines);
}

fn render_quit_overlay(frame: &mut Frame) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Quit feedreader?", styles::highlight_style())),
        Line::from(""),
        key_prompt(&[("Press ", Some("[Y]")), (" to quit, ", Some("[N]")), (" to cancel", None)]),
    ];

    render_dialog(frame, 46, lines);
}

/// Muted text interleaved with highlighted key names, indented to the dialog body
fn key_prompt(parts: &[(&'static str, Option<&'static str>)]) -> Line<'static> {
    let mut spans = vec![Span::raw("   ")];
    for (text, key) in parts {
        spans.push(Span::styled(*text, styles::muted_style()));
        if let Some(key) = key {
            spans.push(Span::styled(*key, styles::help_key_style()));
        }
    }
    Line::from(spans)
}

/// Draw `lines` in a bordered box centered on screen, sized to fit them
fn render_dialog(frame: &mut Frame, width: u16, lines: Vec<Line<'static>>) {
    let height = lines.len() as u16 + 2; // borders
    let area = centered_rect_fixed(width, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
