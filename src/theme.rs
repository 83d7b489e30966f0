use ratatui::style::{Color, Modifier, Style};

// Centralized theme colors. Keep these as small helpers so components never
// hardcode a palette.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Trigger
pub fn trigger_style(hovered: bool, focused: bool) -> Style {
    let style = Style::default().fg(Color::White).bg(Color::DarkGray);
    if hovered || focused {
        style.bg(Color::Gray).fg(Color::Black)
    } else {
        style
    }
}

pub fn trigger_linked_style(hovered: bool, focused: bool) -> Style {
    let style = Style::default()
        .fg(Color::Black)
        .bg(accent())
        .add_modifier(Modifier::BOLD);
    if hovered || focused {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

pub fn tooltip_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
}

// Menu
pub fn menu_bg() -> Color {
    Color::DarkGray
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_cursor_bg() -> Color {
    Color::Gray
}
pub fn menu_cursor_fg() -> Color {
    Color::Black
}
pub fn menu_header_fg() -> Color {
    Color::Gray
}
pub fn menu_detail_fg() -> Color {
    Color::Gray
}
pub fn menu_marked_fg() -> Color {
    accent()
}

// Dialog / prompt
pub fn dialog_bg() -> Color {
    Color::Black
}
pub fn dialog_fg() -> Color {
    Color::White
}
pub fn dialog_separator() -> Color {
    Color::DarkGray
}

// Status bar
pub fn status_style() -> Style {
    Style::default().fg(Color::Black).bg(Color::Blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_is_rgb() {
        assert!(matches!(accent(), Color::Rgb(200, 100, 0)));
    }

    #[test]
    fn hover_changes_trigger_style() {
        assert_ne!(trigger_style(false, false), trigger_style(true, false));
        assert_ne!(
            trigger_linked_style(false, false),
            trigger_linked_style(false, true)
        );
    }
}
