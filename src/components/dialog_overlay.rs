use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use crate::ui::UiFrame;

/// Centered, bordered box over a dimmed screen. Owners draw
/// their own content inside [`DialogFrame::content_rect`].
#[derive(Debug, Clone)]
pub struct DialogFrame {
    title: String,
    visible: bool,
    width: u16,
    height: u16,
}

impl DialogFrame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            title: String::new(),
            visible: false,
            width,
            height,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Box for `area`, shrunk to fit small terminals.
    pub fn rect_for(&self, area: Rect) -> Rect {
        let mut width = area.width.min(self.width).max(1);
        let mut height = area.height.min(self.height).max(1);
        if area.width >= 24 {
            width = width.max(24);
        }
        if area.height >= 5 {
            height = height.max(5);
        }
        Rect {
            x: area.x.saturating_add(area.width.saturating_sub(width) / 2),
            y: area.y.saturating_add(area.height.saturating_sub(height) / 2),
            width,
            height,
        }
    }

    /// Inside of the border, with one column of padding on each side.
    pub fn content_rect(&self, area: Rect) -> Rect {
        let rect = self.rect_for(area);
        Rect {
            x: rect.x.saturating_add(2),
            y: rect.y.saturating_add(1),
            width: rect.width.saturating_sub(4),
            height: rect.height.saturating_sub(2),
        }
    }

    fn dim(frame: &mut UiFrame<'_>, area: Rect) {
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let bounds = area.intersection(frame.area());
        let buffer = frame.buffer_mut();
        for y in bounds.y..bounds.y.saturating_add(bounds.height) {
            for x in bounds.x..bounds.x.saturating_add(bounds.width) {
                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.set_style(dim_style);
                }
            }
        }
    }
}

impl super::Component for DialogFrame {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _focused: bool) {
        if !self.visible || area.width == 0 || area.height == 0 {
            return;
        }
        Self::dim(frame, area);
        let rect = self.rect_for(area);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .style(
                Style::default()
                    .bg(crate::theme::dialog_bg())
                    .fg(crate::theme::dialog_fg()),
            );
        frame.render_widget(block, rect);
    }
}
