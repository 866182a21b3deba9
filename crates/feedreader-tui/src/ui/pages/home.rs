use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use feedreader_core::utils::{strip_html, truncate};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_feed_list(frame, app, chunks[0]);
    render_feed_detail(frame, app, chunks[1]);
}

fn render_feed_list(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Title"), Cell::from("Last fetched")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .feeds
        .iter()
        .enumerate()
        .map(|(i, feed)| {
            let style = if i == app.feed_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(truncate(feed.display_title(), 60)),
                Cell::from(feed.last_fetched_display()),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(14)];

    let title = if app.loading && app.feeds.is_empty() {
        " Feeds (loading...) ".to_string()
    } else {
        format!(" Feeds ({}) ", app.feeds.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.feed_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_feed_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.feeds.get(app.feed_selection) {
        Some(feed) => {
            let mut lines = vec![
                Line::from(Span::styled(feed.display_title(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("URL:          ", styles::muted_style()),
                    Span::raw(feed.url.as_str()),
                ]),
                Line::from(vec![
                    Span::styled("Added:        ", styles::muted_style()),
                    Span::raw(feed.created_at.format("%b %d, %Y").to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Last fetched: ", styles::muted_style()),
                    Span::raw(feed.last_fetched_display()),
                ]),
            ];

            let description = strip_html(&feed.description);
            if !description.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Description", styles::highlight_style())));
                lines.push(Line::from(description));
            }

            if !app.is_authenticated() {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Press ", styles::muted_style()),
                    Span::styled("[s]", styles::help_key_style()),
                    Span::styled(" to sign up and read posts from these feeds", styles::muted_style()),
                ]));
            }
            lines
        }
        None if app.loading => vec![Line::from(Span::styled("Loading feeds...", styles::muted_style()))],
        None => vec![
            Line::from(Span::styled("No feeds yet", styles::muted_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", styles::muted_style()),
                Span::styled("[r]", styles::help_key_style()),
                Span::styled(" to reload", styles::muted_style()),
            ]),
        ],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
