use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

/// Endpoints exposed by the aggregator (method, path, requires key, purpose)
const ENDPOINTS: &[(&str, &str, bool, &str)] = &[
    ("GET", "/v1/readiness", false, "Health check"),
    ("POST", "/v1/users", false, "Create a user and receive an API key"),
    ("GET", "/v1/users", true, "Get the user owning the key"),
    ("GET", "/v1/feeds", false, "List all feeds"),
    ("POST", "/v1/feeds", true, "Add a feed and follow it"),
    ("GET", "/v1/feed_follows", true, "List followed feeds"),
    ("POST", "/v1/feed_follows", true, "Follow a feed"),
    ("DELETE", "/v1/feed_follows/{feed_id}", true, "Unfollow a feed"),
    ("GET", "/v1/posts?offset=&limit=", true, "Posts from followed feeds"),
    ("GET", "/v1/posts/{feed_id}", false, "Posts from a single feed"),
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" API Reference - {} ", app.api.base_url()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let header = Row::new([
        Cell::from("Method"),
        Cell::from("Path"),
        Cell::from("Auth"),
        Cell::from("Description"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = ENDPOINTS
        .iter()
        .map(|(method, path, needs_key, description)| {
            let auth = if *needs_key {
                Span::styled("key", styles::highlight_style())
            } else {
                Span::styled("-", styles::muted_style())
            };
            Row::new(vec![
                Cell::from(*method),
                Cell::from(*path),
                Cell::from(Line::from(auth)),
                Cell::from(*description),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(30),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];

    frame.render_widget(Table::new(rows, widths).header(header), chunks[0]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" Authenticated requests send ", styles::muted_style()),
        Span::styled("Authorization: Bearer <API key>", styles::help_key_style()),
    ]));
    frame.render_widget(footer, chunks[1]);
}
