//! Drag and drop for a terminal.
//!
//! Terminal emulators turn a file dropped onto their window into pasted
//! text: usually the path, shell-quoted or backslash-escaped, sometimes a
//! `file://` URI. With bracketed paste enabled that text arrives as one
//! `Event::Paste`, which is what [`DropPayload::from_paste`] consumes.

use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::layout::rect_contains;
use crate::model::FileHandle;

/// One dropped item, as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropItem(String);

impl DropItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Candidate paths named by this item, in order.
    ///
    /// Only the whole line, or its single shell word, is considered. A
    /// sentence that merely mentions a file name is not a drop.
    fn paths(&self) -> Vec<PathBuf> {
        let text = self.0.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let mut paths = Vec::new();
        // Unbalanced quotes are common when a path contains an apostrophe.
        if let Ok(words) = shell_words::split(text)
            && let [word] = words.as_slice()
            && let Some(path) = word_to_path(word)
        {
            paths.push(path);
        }
        // Unquoted paths with spaces split into several words.
        if let Some(whole) = word_to_path(text)
            && !paths.contains(&whole)
        {
            paths.push(whole);
        }
        paths
    }
}

/// Terminals paste dropped files as absolute paths or `file://` URIs.
fn word_to_path(word: &str) -> Option<PathBuf> {
    let word = word.trim();
    if word.starts_with("file://") {
        return url::Url::parse(word).ok()?.to_file_path().ok();
    }
    let path = PathBuf::from(word);
    path.is_absolute().then_some(path)
}

/// Everything dropped in one gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropPayload {
    items: Vec<DropItem>,
}

impl DropPayload {
    pub fn new(items: Vec<DropItem>) -> Self {
        Self { items }
    }

    /// Split pasted text into one item per non-empty line.
    pub fn from_paste(text: &str) -> Self {
        let items = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(DropItem::new)
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[DropItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Resolve the first item of `payload` that names an existing regular file.
pub fn first_file_handle(payload: &DropPayload) -> Option<FileHandle> {
    payload
        .items
        .iter()
        .flat_map(DropItem::paths)
        .find_map(FileHandle::from_path)
}

/// Screen region that accepts drops.
///
/// A paste carries no position, so the target counts as "under the pointer"
/// when the last mouse event seen landed inside its rect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropTarget {
    rect: Option<Rect>,
    hovered: bool,
}

impl DropTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = Some(rect);
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Record a pointer position. Returns whether the hover state changed.
    pub fn track_pointer(&mut self, column: u16, row: u16) -> bool {
        let hovered = self
            .rect
            .is_some_and(|rect| rect_contains(rect, column, row));
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.rect
            .is_some_and(|rect| rect_contains(rect, column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn from_paste_splits_lines() {
        let payload = DropPayload::from_paste("/a/b.txt\n\n  /c/d.txt  \n");
        assert_eq!(payload.items().len(), 2);
        assert_eq!(payload.items()[1].text(), "/c/d.txt");
        assert!(DropPayload::from_paste("   \n").is_empty());
    }

    #[test]
    fn resolves_plain_quoted_and_escaped_paths() {
        let dir = tempfile::tempdir().unwrap();
        let spaced = dir.path().join("my notes.md");
        fs::write(&spaced, "# notes\n").unwrap();
        let quoted = format!("'{}'", spaced.display());
        let escaped = spaced.display().to_string().replace(' ', "\\ ");
        let raw = spaced.display().to_string();

        for text in [quoted, escaped, raw] {
            let handle = first_file_handle(&DropPayload::from_paste(&text))
                .unwrap_or_else(|| panic!("no handle for {text}"));
            assert_eq!(handle.path, spaced);
            assert_eq!(handle.name, "my notes.md");
        }
    }

    #[test]
    fn resolves_file_uri() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x.py");
        fs::write(&file, "pass\n").unwrap();
        let uri = url::Url::from_file_path(&file).unwrap().to_string();
        let handle = first_file_handle(&DropPayload::from_paste(&uri)).expect("handle");
        assert_eq!(handle.path, file);
        assert_eq!(handle.kind.as_deref(), Some("text/x-python"));
    }

    #[test]
    fn skips_items_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("second.txt");
        fs::write(&file, "2").unwrap();
        let text = format!(
            "hello world\n{}\n{}",
            dir.path().display(),
            file.display()
        );
        let handle = first_file_handle(&DropPayload::from_paste(&text)).expect("handle");
        assert_eq!(handle.path, file);

        assert!(first_file_handle(&DropPayload::from_paste("just some text")).is_none());
        assert!(first_file_handle(&DropPayload::default()).is_none());
    }

    #[test]
    fn text_mentioning_a_file_is_not_a_drop() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        fs::write(&file, "# notes\n").unwrap();
        let sentence = format!("see {} for details", file.display());
        assert!(first_file_handle(&DropPayload::from_paste(&sentence)).is_none());
        assert!(first_file_handle(&DropPayload::from_paste("see Cargo.toml for details")).is_none());
        // Relative names are never resolved against the working directory.
        assert!(first_file_handle(&DropPayload::from_paste("Cargo.toml")).is_none());
    }

    #[test]
    fn drop_target_tracks_hover() {
        let mut target = DropTarget::new();
        assert!(!target.track_pointer(1, 1));
        target.set_rect(Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 1,
        });
        assert!(target.track_pointer(2, 0));
        assert!(target.hovered());
        assert!(!target.track_pointer(3, 0));
        assert!(target.track_pointer(9, 9));
        assert!(!target.hovered());
    }
}
