use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use feedreader_core::utils::truncate;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_post_list(frame, app, chunks[0]);
    render_post_detail(frame, app, chunks[1]);
}

fn render_post_list(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([Cell::from("Title"), Cell::from("Published")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let style = if i == app.post_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(truncate(&post.title, 60)),
                Cell::from(post.published_display()),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(14)];

    let page = app.posts_offset / app.config.posts_page_size() + 1;
    let title = format!(" Posts - page {} - [n]ext [p]rev ", page);

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
    state.select(Some(app.post_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_post_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.posts.get(app.post_selection) {
        Some(post) => {
            let mut lines = vec![
                Line::from(Span::styled(post.title.as_str(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Published: ", styles::muted_style()),
                    Span::raw(post.published_display()),
                ]),
                Line::from(vec![
                    Span::styled("Link:      ", styles::muted_style()),
                    Span::styled(post.url.as_str(), styles::highlight_style()),
                ]),
                Line::from(""),
            ];

            let summary = post.summary();
            if summary.is_empty() {
                lines.push(Line::from(Span::styled("No description", styles::muted_style())));
            } else {
                lines.push(Line::from(summary));
            }
            lines
        }
        None if app.loading => vec![Line::from(Span::styled("Loading posts...", styles::muted_style()))],
        None => vec![
            Line::from(Span::styled("No posts yet", styles::muted_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Posts appear once the feeds you follow have been fetched.",
                styles::muted_style(),
            )),
        ],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
