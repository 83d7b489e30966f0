//! Popup menu primitive: anchor state, rows, a keyboard cursor, rendering
//! next to the anchor, and mouse hit testing.
//!
//! The menu never acts on a row itself. It reports which row was activated
//! and leaves closing and side effects to the owner.

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::keybindings::{Action, KeyBindings};
use crate::layout::{place_popup, rect_contains};
use crate::ui::{UiFrame, truncate_to_width};
use unicode_width::UnicodeWidthStr;

const MARKER: &str = "●";
const DETAIL_GAP: &str = "  ";
const MIN_WIDTH: u16 = 16;

/// Where the menu is anchored, if open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuAnchor {
    #[default]
    Closed,
    Open(Rect),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuRow {
    /// Non-selectable heading.
    Label(String),
    /// Selectable entry. `marked` renders the selection marker.
    Item {
        label: String,
        detail: Option<String>,
        marked: bool,
    },
    Divider,
}

impl MenuRow {
    pub fn item(label: impl Into<String>) -> Self {
        MenuRow::Item {
            label: label.into(),
            detail: None,
            marked: false,
        }
    }

    pub fn selectable(&self) -> bool {
        matches!(self, MenuRow::Item { .. })
    }

    fn width(&self) -> usize {
        match self {
            MenuRow::Label(text) => text.width(),
            MenuRow::Item { label, detail, .. } => {
                // marker + space + label (+ gap + detail)
                2 + label.width()
                    + detail
                        .as_ref()
                        .map(|d| DETAIL_GAP.len() + d.width())
                        .unwrap_or(0)
            }
            MenuRow::Divider => 0,
        }
    }
}

/// Outcome of feeding an event to an open menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// The row at this index was chosen.
    Activated(usize),
    /// The menu closed itself (Esc or a click outside).
    Dismissed,
    /// The event was used for navigation.
    Consumed,
}

#[derive(Debug, Clone, Copy)]
struct MenuHit {
    index: usize,
    rect: Rect,
}

#[derive(Debug)]
pub struct PopupMenu {
    anchor: MenuAnchor,
    rows: Vec<MenuRow>,
    cursor: Option<usize>,
    bounds: Option<Rect>,
    hits: Vec<MenuHit>,
    keys: KeyBindings,
}

impl Default for PopupMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupMenu {
    pub fn new() -> Self {
        Self {
            anchor: MenuAnchor::Closed,
            rows: Vec::new(),
            cursor: None,
            bounds: None,
            hits: Vec::new(),
            keys: KeyBindings::default(),
        }
    }

    pub fn anchor(&self) -> MenuAnchor {
        self.anchor
    }

    pub fn is_open(&self) -> bool {
        matches!(self.anchor, MenuAnchor::Open(_))
    }

    pub fn open(&mut self, anchor: Rect) {
        self.anchor = MenuAnchor::Open(anchor);
        self.cursor = self.initial_cursor();
    }

    pub fn close(&mut self) {
        self.anchor = MenuAnchor::Closed;
        self.bounds = None;
        self.hits.clear();
    }

    /// Open at `anchor` when closed, close when open. Returns the new state.
    pub fn toggle(&mut self, anchor: Rect) -> bool {
        if self.is_open() {
            self.close();
        } else {
            self.open(anchor);
        }
        self.is_open()
    }

    pub fn rows(&self) -> &[MenuRow] {
        &self.rows
    }

    /// Replace the rows, keeping the cursor on a selectable row.
    pub fn set_rows(&mut self, rows: Vec<MenuRow>) {
        self.rows = rows;
        let valid = self
            .cursor
            .is_some_and(|idx| self.rows.get(idx).is_some_and(MenuRow::selectable));
        if !valid {
            self.cursor = self.initial_cursor();
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Bounds of the last rendered popup, while open.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.bounds
            .is_some_and(|rect| rect_contains(rect, column, row))
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        self.hits
            .iter()
            .find(|hit| rect_contains(hit.rect, column, row))
            .map(|hit| hit.index)
    }

    fn initial_cursor(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| matches!(row, MenuRow::Item { marked: true, .. }))
            .or_else(|| self.rows.iter().position(MenuRow::selectable))
    }

    /// Move the cursor by `delta` selectable rows, wrapping around.
    pub fn move_cursor(&mut self, delta: isize) {
        let selectable = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.selectable())
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();
        if selectable.is_empty() {
            self.cursor = None;
            return;
        }
        let total = selectable.len() as isize;
        let current = self
            .cursor
            .and_then(|idx| selectable.iter().position(|&s| s == idx))
            .map(|pos| pos as isize)
            .unwrap_or(if delta >= 0 { -1 } else { total });
        let next = (current + delta).rem_euclid(total) as usize;
        self.cursor = Some(selectable[next]);
    }

    /// Index of the row under the cursor, if it can be activated.
    pub fn activate_cursor(&self) -> Option<usize> {
        self.cursor
            .filter(|&idx| self.rows.get(idx).is_some_and(MenuRow::selectable))
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<MenuEvent> {
        if !self.is_open() {
            return None;
        }
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(index) = self.hit_test(mouse.column, mouse.row) {
                        self.cursor = Some(index);
                        return Some(MenuEvent::Activated(index));
                    }
                    if self.contains(mouse.column, mouse.row) {
                        return Some(MenuEvent::Consumed);
                    }
                    self.close();
                    Some(MenuEvent::Dismissed)
                }
                MouseEventKind::Down(_) => {
                    if self.contains(mouse.column, mouse.row) {
                        Some(MenuEvent::Consumed)
                    } else {
                        self.close();
                        Some(MenuEvent::Dismissed)
                    }
                }
                MouseEventKind::Moved => {
                    if let Some(index) = self.hit_test(mouse.column, mouse.row) {
                        self.cursor = Some(index);
                    }
                    None
                }
                MouseEventKind::ScrollUp if self.contains(mouse.column, mouse.row) => {
                    self.move_cursor(-1);
                    Some(MenuEvent::Consumed)
                }
                MouseEventKind::ScrollDown if self.contains(mouse.column, mouse.row) => {
                    self.move_cursor(1);
                    Some(MenuEvent::Consumed)
                }
                _ => None,
            },
            Event::Key(key) => {
                if self.keys.matches(Action::MenuUp, key) || self.keys.matches(Action::MenuPrev, key)
                {
                    self.move_cursor(-1);
                    Some(MenuEvent::Consumed)
                } else if self.keys.matches(Action::MenuDown, key)
                    || self.keys.matches(Action::MenuNext, key)
                {
                    self.move_cursor(1);
                    Some(MenuEvent::Consumed)
                } else if self.keys.matches(Action::MenuSelect, key) {
                    self.activate_cursor().map(MenuEvent::Activated)
                } else if self.keys.matches(Action::MenuClose, key) {
                    self.close();
                    Some(MenuEvent::Dismissed)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Draw the popup next to its anchor, clamped to `bounds`.
    pub fn render(&mut self, frame: &mut UiFrame<'_>, bounds: Rect) {
        self.hits.clear();
        self.bounds = None;
        let MenuAnchor::Open(anchor) = self.anchor else {
            return;
        };
        let bounds = bounds.intersection(frame.area());
        if bounds.width == 0 || bounds.height == 0 || self.rows.is_empty() {
            return;
        }
        let content_width = self.rows.iter().map(MenuRow::width).max().unwrap_or(0) as u16;
        let width = content_width.saturating_add(4).max(MIN_WIDTH);
        let height = (self.rows.len() as u16).saturating_add(2);
        let rect = place_popup(anchor, width, height, bounds);
        if rect.width < 3 || rect.height < 3 {
            return;
        }
        self.bounds = Some(rect);

        let base = Style::default()
            .bg(crate::theme::menu_bg())
            .fg(crate::theme::menu_fg());
        let cursor_style = Style::default()
            .bg(crate::theme::menu_cursor_bg())
            .fg(crate::theme::menu_cursor_fg())
            .add_modifier(Modifier::BOLD);
        frame.fill(rect, base);

        let inner_x = rect.x.saturating_add(1);
        let inner_width = rect.width.saturating_sub(2);
        let visible_rows = rect.height.saturating_sub(2) as usize;
        for (idx, row) in self.rows.iter().enumerate().take(visible_rows) {
            let y = rect.y.saturating_add(1).saturating_add(idx as u16);
            let is_cursor = self.cursor == Some(idx);
            match row {
                MenuRow::Label(text) => {
                    let style = base
                        .fg(crate::theme::menu_header_fg())
                        .add_modifier(Modifier::BOLD);
                    let text = truncate_to_width(text, inner_width as usize);
                    frame.set_string(inner_x.saturating_add(1), y, &text, style);
                }
                MenuRow::Divider => {
                    let line = "─".repeat(inner_width as usize);
                    let style = base.fg(crate::theme::dialog_separator());
                    frame.set_string(inner_x, y, &line, style);
                }
                MenuRow::Item {
                    label,
                    detail,
                    marked,
                } => {
                    let row_style = if is_cursor { cursor_style } else { base };
                    if is_cursor {
                        frame.fill(
                            Rect {
                                x: rect.x,
                                y,
                                width: rect.width,
                                height: 1,
                            },
                            row_style,
                        );
                    }
                    let marker = if *marked { MARKER } else { " " };
                    let marker_style = if *marked && !is_cursor {
                        row_style.fg(crate::theme::menu_marked_fg())
                    } else {
                        row_style
                    };
                    let text_x = inner_x.saturating_add(1);
                    frame.set_string(text_x, y, marker, marker_style);
                    let label_x = text_x.saturating_add(2);
                    let room = rect
                        .x
                        .saturating_add(rect.width)
                        .saturating_sub(1)
                        .saturating_sub(label_x) as usize;
                    let label_text = truncate_to_width(label, room);
                    frame.set_string(label_x, y, &label_text, row_style);
                    if let Some(detail) = detail {
                        let used = label_text.width() + DETAIL_GAP.len();
                        if used < room {
                            let detail_x = label_x.saturating_add(used as u16);
                            let detail_text = truncate_to_width(detail, room - used);
                            let detail_style = if is_cursor {
                                row_style
                            } else {
                                row_style.fg(crate::theme::menu_detail_fg())
                            };
                            frame.set_string(detail_x, y, &detail_text, detail_style);
                        }
                    }
                    self.hits.push(MenuHit {
                        index: idx,
                        rect: Rect {
                            x: rect.x,
                            y,
                            width: rect.width,
                            height: 1,
                        },
                    });
                }
            }
        }
    }
}
