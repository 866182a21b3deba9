use ratatui::style::{Color, Modifier, Style};

use crate::app::ToastKind;

// Palette: warm paper tones, orange for links and keys like an RSS badge
pub const INK: Color = Color::Rgb(230, 226, 214);
pub const FADED: Color = Color::Rgb(138, 132, 120);
pub const RSS_ORANGE: Color = Color::Rgb(238, 128, 44);
pub const TEAL: Color = Color::Rgb(72, 160, 170);
pub const GREEN: Color = Color::Rgb(110, 176, 96);
pub const RED: Color = Color::Rgb(210, 78, 70);
pub const SELECTION: Color = Color::Rgb(52, 50, 60);
pub const BAR: Color = Color::Rgb(30, 29, 36);

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

fn bold(color: Color) -> Style {
    fg(color).add_modifier(Modifier::BOLD)
}

pub fn title_style() -> Style {
    bold(TEAL)
}

pub fn selected_style() -> Style {
    Style::default().bg(SELECTION).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    fg(INK)
}

pub fn muted_style() -> Style {
    fg(FADED)
}

/// Section headings and links
pub fn highlight_style() -> Style {
    fg(RSS_ORANGE)
}

pub fn success_style() -> Style {
    bold(GREEN)
}

pub fn error_style() -> Style {
    fg(RED)
}

pub fn tab_style(selected: bool) -> Style {
    match selected {
        true => bold(TEAL).add_modifier(Modifier::UNDERLINED),
        false => muted_style(),
    }
}

pub fn border_style(focused: bool) -> Style {
    fg(if focused { TEAL } else { FADED })
}

/// Text input field; turns red while the last submission failed
pub fn input_style(focused: bool, has_error: bool) -> Style {
    let base = if focused { selected_style() } else { list_item_style() };
    if has_error {
        base.fg(RED)
    } else {
        base
    }
}

pub fn toast_style(kind: ToastKind) -> Style {
    match kind {
        ToastKind::Info => highlight_style(),
        ToastKind::Success => success_style(),
        ToastKind::Error => bold(RED),
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BAR).fg(INK)
}

pub fn help_key_style() -> Style {
    bold(RSS_ORANGE)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}
