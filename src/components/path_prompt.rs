//! Path prompt overlay: the "Other file…" chooser of the demo binary.
//!
//! The user types or drops a path; accepting it resolves a [`FileHandle`].
//! Paths that do not name a regular file keep the prompt open with an
//! error line instead of closing it.

use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyModifiers, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::components::{Component, DialogFrame};
use crate::dnd::{DropPayload, first_file_handle};
use crate::keybindings::{Action, KeyBindings};
use crate::layout::rect_contains;
use crate::model::{FileHandle, WorkspaceId};
use crate::ui::{UiFrame, truncate_to_width};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Accepted {
        workspace: WorkspaceId,
        handle: FileHandle,
    },
    Cancelled,
}

#[derive(Debug)]
pub struct PathPromptComponent {
    dialog: DialogFrame,
    workspace: Option<WorkspaceId>,
    input: String,
    /// Cursor position in chars.
    cursor: usize,
    error: Option<String>,
    cancel_rect: Option<Rect>,
    open_rect: Option<Rect>,
    keys: KeyBindings,
}

impl Default for PathPromptComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl PathPromptComponent {
    pub fn new() -> Self {
        Self {
            dialog: DialogFrame::new(64, 8),
            workspace: None,
            input: String::new(),
            cursor: 0,
            error: None,
            cancel_rect: None,
            open_rect: None,
            keys: KeyBindings::default(),
        }
    }

    /// Show the prompt on behalf of `workspace`.
    pub fn open(&mut self, workspace: WorkspaceId) {
        self.dialog
            .set_title(format!(" Pair a file with {workspace} "));
        self.dialog.set_visible(true);
        self.workspace = Some(workspace);
        self.input.clear();
        self.cursor = 0;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.dialog.set_visible(false);
        self.workspace = None;
        self.cancel_rect = None;
        self.open_rect = None;
    }

    pub fn visible(&self) -> bool {
        self.dialog.visible()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        self.cursor = self.input.chars().count();
        self.error = None;
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }

    fn insert_str(&mut self, text: &str) {
        let idx = self.byte_index();
        self.input.insert_str(idx, text);
        self.cursor += text.chars().count();
        self.error = None;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index();
        self.input.remove(idx);
        self.error = None;
    }

    fn delete(&mut self) {
        let idx = self.byte_index();
        if idx < self.input.len() {
            self.input.remove(idx);
        }
    }

    fn resolved_path(&self) -> PathBuf {
        let raw = self.input.trim();
        if let Some(rest) = raw.strip_prefix("~/")
            && let Some(home) = std::env::var_os("HOME")
        {
            return PathBuf::from(home).join(rest);
        }
        PathBuf::from(raw)
    }

    fn accept(&mut self) -> Option<PromptOutcome> {
        if self.input.trim().is_empty() {
            self.error = Some("Enter a path".to_string());
            return None;
        }
        let path = self.resolved_path();
        let Some(handle) = FileHandle::from_path(&path) else {
            tracing::debug!(path = %path.display(), "prompt path is not a regular file");
            self.error = Some(format!("Not a file: {}", path.display()));
            return None;
        };
        let workspace = self.workspace.take()?;
        self.close();
        Some(PromptOutcome::Accepted { workspace, handle })
    }

    fn cancel(&mut self) -> PromptOutcome {
        self.close();
        PromptOutcome::Cancelled
    }

    /// Feed an event to the prompt. Returns an outcome once the prompt
    /// closes; editing keys return `None`.
    pub fn handle_prompt_event(&mut self, event: &Event) -> Option<PromptOutcome> {
        if !self.visible() {
            return None;
        }
        match event {
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                if self
                    .open_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return self.accept();
                }
                if self
                    .cancel_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(self.cancel());
                }
                None
            }
            Event::Paste(text) => {
                // A file dropped on the prompt fills in its path.
                match first_file_handle(&DropPayload::from_paste(text)) {
                    Some(handle) => self.set_input(handle.path.display().to_string()),
                    None => self.insert_str(text.trim()),
                }
                None
            }
            Event::Key(key) => {
                if self.keys.matches(Action::PromptAccept, key) {
                    return self.accept();
                }
                if self.keys.matches(Action::PromptCancel, key) {
                    return Some(self.cancel());
                }
                match key.code {
                    KeyCode::Char(c)
                        if !key.modifiers.contains(KeyModifiers::CONTROL)
                            && !key.modifiers.contains(KeyModifiers::ALT) =>
                    {
                        let mut buf = [0u8; 4];
                        self.insert_str(c.encode_utf8(&mut buf));
                    }
                    KeyCode::Backspace => self.backspace(),
                    KeyCode::Delete => self.delete(),
                    KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
                    KeyCode::Right => {
                        self.cursor = (self.cursor + 1).min(self.input.chars().count())
                    }
                    KeyCode::Home => self.cursor = 0,
                    KeyCode::End => self.cursor = self.input.chars().count(),
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }
}

impl Component for PathPromptComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _focused: bool) {
        self.cancel_rect = None;
        self.open_rect = None;
        if !self.visible() || area.width == 0 || area.height == 0 {
            return;
        }
        self.dialog.render(frame, area, false);
        let content = self.dialog.content_rect(area);
        if content.width == 0 || content.height < 4 {
            return;
        }
        let width = content.width as usize;
        let text_style = Style::default()
            .bg(crate::theme::dialog_bg())
            .fg(crate::theme::dialog_fg());
        frame.set_string(
            content.x,
            content.y,
            &truncate_to_width("Path (type, paste or drop a file):", width),
            text_style,
        );

        // Keep the cursor visible by scrolling the input from the left.
        let chars = self.input.chars().collect::<Vec<_>>();
        let room = width.saturating_sub(1);
        let start = self.cursor.saturating_sub(room);
        let visible = truncate_to_width(&chars[start..].iter().collect::<String>(), width);
        let input_y = content.y.saturating_add(1);
        let input_style = text_style.add_modifier(Modifier::UNDERLINED);
        frame.fill(
            Rect {
                x: content.x,
                y: input_y,
                width: content.width,
                height: 1,
            },
            input_style,
        );
        frame.set_string(content.x, input_y, &visible, input_style);
        let before_cursor = chars[start..self.cursor].iter().collect::<String>();
        let cursor_x = content.x.saturating_add(before_cursor.width() as u16);
        if rect_contains(frame.area(), cursor_x, input_y)
            && let Some(cell) = frame.buffer_mut().cell_mut((cursor_x, input_y))
        {
            cell.set_style(input_style.add_modifier(Modifier::REVERSED));
        }

        if let Some(error) = &self.error {
            let style = text_style.fg(crate::theme::accent());
            frame.set_string(
                content.x,
                input_y.saturating_add(1),
                &truncate_to_width(error, width),
                style,
            );
        }

        let button_y = content.y.saturating_add(content.height.saturating_sub(1));
        let cancel = "[ Cancel ]";
        let open = "[ Open ]";
        let total = (cancel.len() + 1 + open.len()) as u16;
        let start_x = content
            .x
            .saturating_add(content.width.saturating_sub(total));
        let open_x = start_x.saturating_add(cancel.len() as u16 + 1);
        let selected = Style::default()
            .fg(crate::theme::menu_cursor_fg())
            .bg(crate::theme::menu_cursor_bg())
            .add_modifier(Modifier::BOLD);
        frame.set_string(start_x, button_y, cancel, text_style);
        frame.set_string(open_x, button_y, open, selected);
        self.cancel_rect = Some(Rect {
            x: start_x,
            y: button_y,
            width: cancel.len() as u16,
            height: 1,
        });
        self.open_rect = Some(Rect {
            x: open_x,
            y: button_y,
            width: open.len() as u16,
            height: 1,
        });
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.visible() {
            return false;
        }
        self.handle_prompt_event(event);
        // Modal: nothing underneath sees events while the prompt is up.
        true
    }
}
