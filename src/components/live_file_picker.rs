//! Live file picker: a trigger button that opens a menu of the workspace's
//! live files, accepts dropped files, and reports choices through caller
//! supplied callbacks.
//!
//! The picker owns no association state. The current selection is passed
//! in with [`LiveFilePicker::set_live_file_id`] and every choice goes back
//! out through [`PickerCallbacks`]; the caller decides what to persist.
//!
//! Candidates are read from the [`LiveFileMetadataProvider`] on every
//! [`LiveFilePicker::sync`], which rendering and event handling call first.

use std::future::Future;
use std::sync::Arc;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use crate::components::Component;
use crate::config::{MENU_HEADER, OTHER_FILE_LABEL, PickerConfig, REMOVE_LABEL};
use crate::dnd::{DropPayload, DropTarget, first_file_handle};
use crate::keybindings::{Action, KeyBindings};
use crate::menu::{MenuEvent, MenuRow, PopupMenu};
use crate::model::{FileHandle, LiveFileId, LiveFileMetadata, WorkspaceId};
use crate::provider::LiveFileMetadataProvider;
use crate::tasks::{PendingTasks, PickerFuture, TaskSpawner};
use crate::ui::UiFrame;
use unicode_width::UnicodeWidthStr;

/// Icon drawn on the trigger while a live file is selected.
pub const LINKED_ICON: &str = "⇄";

pub type SelectLiveFileFn = Box<dyn FnMut(Option<LiveFileId>)>;
pub type SelectFileOpenFn = Box<dyn FnMut(WorkspaceId) -> PickerFuture>;
pub type SelectFileHandleFn = Box<dyn FnMut(WorkspaceId, FileHandle) -> PickerFuture>;

/// Callbacks through which the picker reports user choices.
pub struct PickerCallbacks {
    on_select_live_file: SelectLiveFileFn,
    on_select_file_open: Option<SelectFileOpenFn>,
    on_select_file_handle: Option<SelectFileHandleFn>,
}

impl PickerCallbacks {
    /// `on_select` receives the chosen id, or `None` when the user removes
    /// the association.
    pub fn new(on_select: impl FnMut(Option<LiveFileId>) + 'static) -> Self {
        Self {
            on_select_live_file: Box::new(on_select),
            on_select_file_open: None,
            on_select_file_handle: None,
        }
    }

    /// Enable the "Other file…" entry. The returned future is spawned.
    pub fn with_file_open<F, Fut>(mut self, mut on_open: F) -> Self
    where
        F: FnMut(WorkspaceId) -> Fut + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_select_file_open = Some(Box::new(move |workspace| {
            Box::pin(on_open(workspace)) as PickerFuture
        }));
        self
    }

    /// Handle files dropped onto the trigger. The returned future is spawned.
    pub fn with_file_handle<F, Fut>(mut self, mut on_handle: F) -> Self
    where
        F: FnMut(WorkspaceId, FileHandle) -> Fut + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_select_file_handle = Some(Box::new(move |workspace, handle| {
            Box::pin(on_handle(workspace, handle)) as PickerFuture
        }));
        self
    }

    pub fn has_file_open(&self) -> bool {
        self.on_select_file_open.is_some()
    }

    pub fn has_file_handle(&self) -> bool {
        self.on_select_file_handle.is_some()
    }
}

impl std::fmt::Debug for PickerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickerCallbacks")
            .field("file_open", &self.has_file_open())
            .field("file_handle", &self.has_file_handle())
            .finish()
    }
}

/// What the picker did in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    MenuToggled { open: bool },
    MenuNavigated,
    Selected(LiveFileId),
    Removed,
    OpenFileRequested,
    FileDropped(FileHandle),
    /// A drop arrived but named no readable file.
    DropIgnored,
}

/// Meaning of each menu row, index-aligned with the menu's rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEntry {
    Header,
    Candidate(LiveFileId),
    OtherFile,
    Divider,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AutoSelectInputs {
    candidates: Vec<LiveFileMetadata>,
    selected: Option<LiveFileId>,
    name: Option<String>,
}

/// Candidate auto-select would choose: the only one, or the one named
/// `name` when there are several.
pub fn auto_select_target<'a>(
    candidates: &'a [LiveFileMetadata],
    name: Option<&str>,
) -> Option<&'a LiveFileMetadata> {
    match candidates {
        [] => None,
        [only] => Some(only),
        many => {
            let name = name?;
            many.iter().find(|candidate| candidate.name == name)
        }
    }
}

pub struct LiveFilePicker {
    workspace: WorkspaceId,
    config: PickerConfig,
    provider: Arc<dyn LiveFileMetadataProvider>,
    callbacks: PickerCallbacks,
    spawner: TaskSpawner,
    pending: PendingTasks,
    live_file_id: Option<LiveFileId>,
    candidates: Vec<LiveFileMetadata>,
    entries: Vec<PickerEntry>,
    menu: PopupMenu,
    drop_target: DropTarget,
    trigger_rect: Option<Rect>,
    last_auto_select: Option<AutoSelectInputs>,
    focused: bool,
    keys: KeyBindings,
}

impl LiveFilePicker {
    pub fn new(
        workspace: WorkspaceId,
        provider: Arc<dyn LiveFileMetadataProvider>,
        spawner: TaskSpawner,
        config: PickerConfig,
        callbacks: PickerCallbacks,
    ) -> Self {
        Self {
            workspace,
            config,
            provider,
            callbacks,
            spawner,
            pending: PendingTasks::new(),
            live_file_id: None,
            candidates: Vec::new(),
            entries: Vec::new(),
            menu: PopupMenu::new(),
            drop_target: DropTarget::new(),
            trigger_rect: None,
            last_auto_select: None,
            focused: false,
            keys: KeyBindings::default(),
        }
    }

    pub fn workspace(&self) -> &WorkspaceId {
        &self.workspace
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn live_file_id(&self) -> Option<&LiveFileId> {
        self.live_file_id.as_ref()
    }

    pub fn set_live_file_id(&mut self, id: Option<LiveFileId>) {
        if self.live_file_id == id {
            return;
        }
        tracing::debug!(workspace = %self.workspace, live_file = ?id, "picker selection changed");
        self.live_file_id = id;
        self.sync();
    }

    /// Turn auto-select on or off; the next sync re-evaluates it.
    pub fn set_auto_select(&mut self, enabled: bool, name: Option<String>) {
        self.config.auto_select = enabled;
        self.config.auto_select_name = name;
        self.last_auto_select = None;
        self.sync();
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn candidates(&self) -> &[LiveFileMetadata] {
        &self.candidates
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn menu(&self) -> &PopupMenu {
        &self.menu
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn trigger_rect(&self) -> Option<Rect> {
        self.trigger_rect
    }

    /// Callbacks dispatched by this picker that have not settled yet.
    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }

    pub fn take_pending(&mut self) -> Vec<tokio::task::JoinHandle<()>> {
        self.pending.take()
    }

    /// Re-read candidates, rebuild the menu rows and run auto-select when
    /// its inputs changed since the last sync.
    pub fn sync(&mut self) {
        self.candidates = self.provider.live_files(&self.workspace);
        self.rebuild_rows();
        self.run_auto_select();
        self.pending.prune();
    }

    fn run_auto_select(&mut self) {
        let inputs = AutoSelectInputs {
            candidates: self.candidates.clone(),
            selected: self.live_file_id.clone(),
            name: self.config.auto_select_name.clone(),
        };
        if self.last_auto_select.as_ref() == Some(&inputs) {
            return;
        }
        self.last_auto_select = Some(inputs);
        if !self.config.auto_select {
            return;
        }
        let Some(target) = auto_select_target(
            &self.candidates,
            self.config.auto_select_name.as_deref(),
        ) else {
            return;
        };
        if self.live_file_id.as_ref() == Some(&target.id) {
            return;
        }
        let id = target.id.clone();
        tracing::debug!(workspace = %self.workspace, live_file = %id, "auto-selecting live file");
        (self.callbacks.on_select_live_file)(Some(id));
    }

    fn rebuild_rows(&mut self) {
        let mut entries = Vec::with_capacity(self.candidates.len() + 4);
        let mut rows = Vec::with_capacity(self.candidates.len() + 4);
        entries.push(PickerEntry::Header);
        rows.push(MenuRow::Label(MENU_HEADER.to_string()));
        for candidate in &self.candidates {
            entries.push(PickerEntry::Candidate(candidate.id.clone()));
            rows.push(MenuRow::Item {
                label: candidate.name.clone(),
                detail: Some(candidate.detail_label()),
                marked: self.live_file_id.as_ref() == Some(&candidate.id),
            });
        }
        if self.callbacks.has_file_open() {
            entries.push(PickerEntry::OtherFile);
            rows.push(MenuRow::item(OTHER_FILE_LABEL));
        }
        if self.config.allow_remove && self.live_file_id.is_some() {
            entries.push(PickerEntry::Divider);
            rows.push(MenuRow::Divider);
            entries.push(PickerEntry::Remove);
            rows.push(MenuRow::item(REMOVE_LABEL));
        }
        self.entries = entries;
        self.menu.set_rows(rows);
    }

    /// Open the menu when closed, close it when open.
    pub fn toggle_menu(&mut self) -> PickerAction {
        self.sync();
        let anchor = self.trigger_rect.unwrap_or_default();
        let open = self.menu.toggle(anchor);
        tracing::debug!(workspace = %self.workspace, open, "live file menu toggled");
        PickerAction::MenuToggled { open }
    }

    fn close_menu(&mut self) {
        if self.menu.is_open() {
            self.menu.close();
            tracing::debug!(workspace = %self.workspace, "live file menu closed");
        }
    }

    /// Act on the menu row at `index`.
    pub fn activate(&mut self, index: usize) -> Option<PickerAction> {
        let entry = self.entries.get(index)?.clone();
        match entry {
            PickerEntry::Header | PickerEntry::Divider => None,
            PickerEntry::Candidate(id) => {
                self.close_menu();
                tracing::info!(workspace = %self.workspace, live_file = %id, "live file selected");
                (self.callbacks.on_select_live_file)(Some(id.clone()));
                Some(PickerAction::Selected(id))
            }
            PickerEntry::Remove => {
                self.close_menu();
                tracing::info!(workspace = %self.workspace, "live file association removed");
                (self.callbacks.on_select_live_file)(None);
                Some(PickerAction::Removed)
            }
            PickerEntry::OtherFile => {
                self.close_menu();
                let on_open = self.callbacks.on_select_file_open.as_mut()?;
                let future = on_open(self.workspace.clone());
                self.dispatch("file-open", future);
                Some(PickerAction::OpenFileRequested)
            }
        }
    }

    /// Handle a drop onto the trigger.
    pub fn handle_drop(&mut self, payload: &DropPayload) -> PickerAction {
        let Some(handle) = first_file_handle(payload) else {
            tracing::debug!(
                workspace = %self.workspace,
                items = payload.items().len(),
                "drop carried no file handle"
            );
            return PickerAction::DropIgnored;
        };
        self.close_menu();
        tracing::info!(workspace = %self.workspace, path = %handle.path.display(), "file dropped on picker");
        if let Some(on_handle) = self.callbacks.on_select_file_handle.as_mut() {
            let future = on_handle(self.workspace.clone(), handle.clone());
            self.dispatch("file-handle", future);
        }
        PickerAction::FileDropped(handle)
    }

    fn dispatch(&mut self, label: &'static str, future: PickerFuture) {
        let in_flight = self.pending.len();
        if in_flight > 0 {
            // Concurrent dispatches are allowed to race.
            tracing::debug!(task = label, in_flight, "previous picker task still pending");
        }
        let handle = self.spawner.spawn(label, future);
        self.pending.push(handle);
    }

    fn accepts_drop(&self) -> bool {
        self.drop_target.hovered() || self.focused || self.menu.is_open()
    }

    fn on_trigger(&self, column: u16, row: u16) -> bool {
        self.drop_target.contains(column, row)
    }

    pub fn handle_picker_event(&mut self, event: &Event) -> Option<PickerAction> {
        self.sync();
        match event {
            Event::Mouse(mouse) => {
                if matches!(
                    mouse.kind,
                    MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_)
                ) {
                    self.drop_target.track_pointer(mouse.column, mouse.row);
                }
                if let MouseEventKind::Down(MouseButton::Left | MouseButton::Right) = mouse.kind
                    && self.on_trigger(mouse.column, mouse.row)
                {
                    // Right clicks land here too so they never reach anything
                    // underneath the trigger.
                    return Some(self.toggle_menu());
                }
                self.route_to_menu(event)
            }
            Event::Key(key) => {
                if self.menu.is_open() {
                    return self.route_to_menu(event);
                }
                if self.focused && self.keys.matches(Action::PickerToggle, key) {
                    return Some(self.toggle_menu());
                }
                None
            }
            Event::Paste(text) => {
                if !self.accepts_drop() {
                    return None;
                }
                Some(self.handle_drop(&DropPayload::from_paste(text)))
            }
            _ => None,
        }
    }

    fn route_to_menu(&mut self, event: &Event) -> Option<PickerAction> {
        match self.menu.handle_event(event)? {
            MenuEvent::Activated(index) => self
                .activate(index)
                .or(Some(PickerAction::MenuNavigated)),
            MenuEvent::Dismissed => {
                tracing::debug!(workspace = %self.workspace, "live file menu dismissed");
                Some(PickerAction::MenuToggled { open: false })
            }
            MenuEvent::Consumed => Some(PickerAction::MenuNavigated),
        }
    }

    fn trigger_text(&self) -> String {
        if self.live_file_id.is_some() {
            format!(" {LINKED_ICON} ")
        } else {
            format!(" {} ▾ ", self.config.label_button)
        }
    }

    fn render_trigger(&mut self, frame: &mut UiFrame<'_>, area: Rect) {
        let text = self.trigger_text();
        let width = (text.width() as u16).min(area.width);
        let rect = Rect {
            x: area.x,
            y: area.y,
            width,
            height: 1,
        };
        self.trigger_rect = Some(rect);
        self.drop_target.set_rect(rect);
        let hovered = self.drop_target.hovered();
        let style = if self.live_file_id.is_some() {
            crate::theme::trigger_linked_style(hovered, self.focused)
        } else {
            crate::theme::trigger_style(hovered, self.focused)
        };
        frame.set_string(rect.x, rect.y, &text, style);
        if hovered && !self.menu.is_open() && self.live_file_id.is_none() {
            let tooltip = format!(" {} ", self.config.label_tooltip);
            frame.set_string(
                rect.x,
                rect.y.saturating_add(1),
                &tooltip,
                crate::theme::tooltip_style(),
            );
        }
    }
}

impl Component for LiveFilePicker {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool) {
        self.focused = focused;
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.sync();
        self.render_trigger(frame, area);
        let bounds = frame.area();
        self.menu.render(frame, bounds);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        self.handle_picker_event(event).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LiveFileRegistry;
    use crate::ui::row_text;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Calls = Rc<RefCell<Vec<Option<LiveFileId>>>>;
    type HandleCalls = Rc<RefCell<Vec<(WorkspaceId, FileHandle)>>>;

    struct Fixture {
        rt: tokio::runtime::Runtime,
        registry: LiveFileRegistry,
        workspace: WorkspaceId,
    }

    impl Fixture {
        fn new(candidates: &[LiveFileMetadata]) -> Self {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let registry = LiveFileRegistry::new();
            let workspace = WorkspaceId::new("ws");
            for candidate in candidates {
                registry.insert(&workspace, candidate.clone()).unwrap();
            }
            Self {
                rt,
                registry,
                workspace,
            }
        }

        fn picker(&self, config: PickerConfig, callbacks: PickerCallbacks) -> LiveFilePicker {
            LiveFilePicker::new(
                self.workspace.clone(),
                Arc::new(self.registry.clone()),
                TaskSpawner::new(self.rt.handle().clone()),
                config,
                callbacks,
            )
        }

        fn settle(&self, picker: &mut LiveFilePicker) {
            let handles = picker.take_pending();
            self.rt.block_on(async {
                for handle in handles {
                    handle.await.unwrap();
                }
            });
        }
    }

    fn recording() -> (Calls, PickerCallbacks) {
        let calls: Calls = Rc::default();
        let sink = calls.clone();
        let callbacks = PickerCallbacks::new(move |id| sink.borrow_mut().push(id));
        (calls, callbacks)
    }

    fn python() -> LiveFileMetadata {
        LiveFileMetadata::new("a", "x.py")
            .with_size(120)
            .with_kind("text/x-python")
    }

    fn three() -> Vec<LiveFileMetadata> {
        vec![
            LiveFileMetadata::new("a", "a.txt").with_size(1),
            LiveFileMetadata::new("b", "b.txt").with_size(2),
            LiveFileMetadata::new("c", "c.txt"),
        ]
    }

    fn auto_select(name: Option<&str>) -> PickerConfig {
        PickerConfig::default().with_auto_select(true, name.map(str::to_string))
    }

    fn render(picker: &mut LiveFilePicker) -> Buffer {
        let area = Rect {
            x: 0,
            y: 0,
            width: 60,
            height: 12,
        };
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        picker.render(&mut frame, area, false);
        buf
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn index_of(picker: &LiveFilePicker, entry: &PickerEntry) -> usize {
        picker
            .entries()
            .iter()
            .position(|e| e == entry)
            .expect("entry present")
    }

    #[test]
    fn auto_select_single_candidate_calls_once() {
        let fx = Fixture::new(&[python()]);
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(auto_select(None), callbacks);
        picker.sync();
        picker.sync();
        assert_eq!(*calls.borrow(), vec![Some(LiveFileId::new("a"))]);
        // The caller feeds the selection back; nothing fires again.
        picker.set_live_file_id(Some(LiveFileId::new("a")));
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn auto_select_many_uses_name_match() {
        let fx = Fixture::new(&three());
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(auto_select(Some("b.txt")), callbacks);
        picker.sync();
        assert_eq!(*calls.borrow(), vec![Some(LiveFileId::new("b"))]);
    }

    #[test]
    fn auto_select_many_without_match_does_nothing() {
        let fx = Fixture::new(&three());
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(auto_select(Some("zzz")), callbacks);
        picker.sync();
        assert!(calls.borrow().is_empty());

        let fx = Fixture::new(&three());
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(auto_select(None), callbacks);
        picker.sync();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn auto_select_empty_list_does_nothing() {
        let fx = Fixture::new(&[]);
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(auto_select(Some("x.py")), callbacks);
        picker.sync();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn auto_select_is_dormant_until_enabled() {
        let fx = Fixture::new(&[python()]);
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        picker.sync();
        assert!(calls.borrow().is_empty());
        picker.set_auto_select(true, None);
        assert_eq!(*calls.borrow(), vec![Some(LiveFileId::new("a"))]);
    }

    #[test]
    fn auto_select_reruns_when_candidates_change() {
        let fx = Fixture::new(&[]);
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(auto_select(None), callbacks);
        picker.sync();
        assert!(calls.borrow().is_empty());
        fx.registry.insert(&fx.workspace, python()).unwrap();
        picker.sync();
        assert_eq!(*calls.borrow(), vec![Some(LiveFileId::new("a"))]);
    }

    #[test]
    fn toggle_pair_returns_to_closed() {
        let fx = Fixture::new(&[python()]);
        let (_, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        assert_eq!(
            picker.toggle_menu(),
            PickerAction::MenuToggled { open: true }
        );
        assert_eq!(
            picker.toggle_menu(),
            PickerAction::MenuToggled { open: false }
        );
        assert!(!picker.is_menu_open());
    }

    #[test]
    fn selecting_each_candidate_closes_and_calls_once() {
        let fx = Fixture::new(&three());
        for candidate in three() {
            let (calls, callbacks) = recording();
            let mut picker = fx.picker(PickerConfig::default(), callbacks);
            picker.toggle_menu();
            let index = index_of(&picker, &PickerEntry::Candidate(candidate.id.clone()));
            assert_eq!(
                picker.activate(index),
                Some(PickerAction::Selected(candidate.id.clone()))
            );
            assert!(!picker.is_menu_open());
            assert_eq!(*calls.borrow(), vec![Some(candidate.id)]);
        }
    }

    #[test]
    fn remove_requires_allow_remove_and_selection() {
        let fx = Fixture::new(&[python()]);
        let (_, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default().with_allow_remove(true), callbacks);
        picker.sync();
        assert!(!picker.entries().contains(&PickerEntry::Remove));

        let (_, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        picker.set_live_file_id(Some(LiveFileId::new("a")));
        assert!(!picker.entries().contains(&PickerEntry::Remove));
        assert!(!picker.entries().contains(&PickerEntry::Divider));
    }

    #[test]
    fn remove_calls_back_with_none() {
        let fx = Fixture::new(&[python()]);
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default().with_allow_remove(true), callbacks);
        picker.set_live_file_id(Some(LiveFileId::new("a")));
        assert_eq!(
            picker.entries(),
            &[
                PickerEntry::Header,
                PickerEntry::Candidate(LiveFileId::new("a")),
                PickerEntry::Divider,
                PickerEntry::Remove,
            ]
        );
        picker.toggle_menu();
        assert_eq!(picker.activate(3), Some(PickerAction::Removed));
        assert!(!picker.is_menu_open());
        assert_eq!(*calls.borrow(), vec![None]);
    }

    #[test]
    fn empty_candidate_list_still_opens_menu() {
        let fx = Fixture::new(&[]);
        let (_, callbacks) = recording();
        let callbacks = callbacks.with_file_open(|_| async {});
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        render(&mut picker);
        picker.toggle_menu();
        assert!(picker.is_menu_open());
        assert_eq!(
            picker.entries(),
            &[PickerEntry::Header, PickerEntry::OtherFile]
        );
        let buf = render(&mut picker);
        assert!(row_text(&buf, 2).contains("Live files"));
        assert!(row_text(&buf, 3).contains("Other file…"));
    }

    #[test]
    fn other_file_closes_menu_and_dispatches_with_workspace() {
        let fx = Fixture::new(&[python()]);
        let (calls, callbacks) = recording();
        let opened: Rc<RefCell<Vec<WorkspaceId>>> = Rc::default();
        let settled = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let sink = opened.clone();
        let flag = settled.clone();
        let callbacks = callbacks.with_file_open(move |workspace| {
            sink.borrow_mut().push(workspace);
            let flag = flag.clone();
            async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
            }
        });
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        picker.toggle_menu();
        let index = index_of(&picker, &PickerEntry::OtherFile);
        assert_eq!(
            picker.activate(index),
            Some(PickerAction::OpenFileRequested)
        );
        assert!(!picker.is_menu_open());
        assert_eq!(*opened.borrow(), vec![WorkspaceId::new("ws")]);
        assert!(calls.borrow().is_empty());
        fx.settle(&mut picker);
        assert!(settled.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn no_other_file_entry_without_callback() {
        let fx = Fixture::new(&[python()]);
        let (_, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        picker.sync();
        assert!(!picker.entries().contains(&PickerEntry::OtherFile));
    }

    fn dropping_picker(fx: &Fixture) -> (HandleCalls, LiveFilePicker) {
        let (_, callbacks) = recording();
        let dropped: HandleCalls = Rc::default();
        let sink = dropped.clone();
        let callbacks = callbacks.with_file_handle(move |workspace, handle| {
            sink.borrow_mut().push((workspace, handle));
            async {}
        });
        (dropped, fx.picker(PickerConfig::default(), callbacks))
    }

    #[test]
    fn drop_without_file_is_a_silent_no_op() {
        let fx = Fixture::new(&[python()]);
        let (dropped, mut picker) = dropping_picker(&fx);
        picker.toggle_menu();
        let action = picker.handle_drop(&DropPayload::from_paste("not a file at all"));
        assert_eq!(action, PickerAction::DropIgnored);
        assert!(dropped.borrow().is_empty());
        assert!(picker.is_menu_open());
        assert_eq!(picker.pending_tasks(), 0);
    }

    #[test]
    fn drop_with_file_closes_menu_and_calls_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.py");
        std::fs::write(&path, "print('hi')\n").unwrap();
        let fx = Fixture::new(&[python()]);
        let (dropped, mut picker) = dropping_picker(&fx);
        picker.toggle_menu();
        let action = picker.handle_drop(&DropPayload::from_paste(&path.display().to_string()));
        assert!(matches!(action, PickerAction::FileDropped(ref h) if h.path == path));
        assert!(!picker.is_menu_open());
        let dropped = dropped.borrow();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].0, WorkspaceId::new("ws"));
        assert_eq!(dropped[0].1.path, path);
        fx.settle(&mut picker);
    }

    #[test]
    fn paste_over_trigger_is_a_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# notes\n").unwrap();
        let fx = Fixture::new(&[]);
        let (dropped, mut picker) = dropping_picker(&fx);
        render(&mut picker);
        let paste = Event::Paste(path.display().to_string());
        // Pointer elsewhere and not focused: not ours.
        assert_eq!(picker.handle_picker_event(&paste), None);
        picker.handle_picker_event(&mouse(MouseEventKind::Moved, 1, 0));
        assert!(matches!(
            picker.handle_picker_event(&paste),
            Some(PickerAction::FileDropped(_))
        ));
        assert_eq!(dropped.borrow().len(), 1);
        fx.settle(&mut picker);
    }

    #[test]
    fn left_and_right_click_on_trigger_toggle() {
        let fx = Fixture::new(&[python()]);
        let (_, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        render(&mut picker);
        assert_eq!(
            picker.handle_picker_event(&mouse(MouseEventKind::Down(MouseButton::Right), 1, 0)),
            Some(PickerAction::MenuToggled { open: true })
        );
        render(&mut picker);
        assert_eq!(
            picker.handle_picker_event(&mouse(MouseEventKind::Down(MouseButton::Left), 1, 0)),
            Some(PickerAction::MenuToggled { open: false })
        );
        // Clicks elsewhere with the menu closed are not consumed.
        assert_eq!(
            picker.handle_picker_event(&mouse(MouseEventKind::Down(MouseButton::Right), 50, 9)),
            None
        );
    }

    #[test]
    fn wide_label_trigger_covers_every_drawn_column() {
        let fx = Fixture::new(&[python()]);
        let (_, callbacks) = recording();
        let config = PickerConfig::default().with_labels("ライブファイル", "Pair a file");
        let mut picker = fx.picker(config, callbacks);
        render(&mut picker);
        let trigger = picker.trigger_rect().expect("trigger rendered");
        assert_eq!(trigger.width, 18);
        assert_eq!(
            picker.handle_picker_event(&mouse(MouseEventKind::Down(MouseButton::Left), 14, 0)),
            Some(PickerAction::MenuToggled { open: true })
        );
    }

    #[test]
    fn keyboard_flow_selects_candidate() {
        let fx = Fixture::new(&three());
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        picker.set_focused(true);
        assert_eq!(
            picker.handle_picker_event(&key(KeyCode::Enter)),
            Some(PickerAction::MenuToggled { open: true })
        );
        assert_eq!(
            picker.handle_picker_event(&key(KeyCode::Down)),
            Some(PickerAction::MenuNavigated)
        );
        assert_eq!(
            picker.handle_picker_event(&key(KeyCode::Enter)),
            Some(PickerAction::Selected(LiveFileId::new("b")))
        );
        assert_eq!(*calls.borrow(), vec![Some(LiveFileId::new("b"))]);
        assert!(!picker.is_menu_open());
    }

    #[test]
    fn escape_and_outside_click_dismiss() {
        let fx = Fixture::new(&three());
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default(), callbacks);
        render(&mut picker);
        picker.toggle_menu();
        assert_eq!(
            picker.handle_picker_event(&key(KeyCode::Esc)),
            Some(PickerAction::MenuToggled { open: false })
        );
        picker.toggle_menu();
        render(&mut picker);
        assert_eq!(
            picker.handle_picker_event(&mouse(MouseEventKind::Down(MouseButton::Left), 59, 11)),
            Some(PickerAction::MenuToggled { open: false })
        );
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn unselected_example_renders_label_and_row() {
        let fx = Fixture::new(&[python()]);
        let (_, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default().with_allow_remove(true), callbacks);
        let buf = render(&mut picker);
        assert!(row_text(&buf, 0).starts_with(" Live file ▾ "));

        picker.toggle_menu();
        let buf = render(&mut picker);
        assert_eq!(
            picker.entries(),
            &[
                PickerEntry::Header,
                PickerEntry::Candidate(LiveFileId::new("a"))
            ]
        );
        let row = row_text(&buf, 3);
        assert!(row.contains("x.py  120 bytes · text/x-python"), "{row:?}");
        assert!(!row.contains('●'));
        assert!(!(0..12).any(|y| row_text(&buf, y).contains("Remove")));
    }

    #[test]
    fn selected_example_marks_row_and_offers_remove() {
        let fx = Fixture::new(&[python()]);
        let (calls, callbacks) = recording();
        let mut picker = fx.picker(PickerConfig::default().with_allow_remove(true), callbacks);
        picker.set_live_file_id(Some(LiveFileId::new("a")));
        let buf = render(&mut picker);
        assert!(row_text(&buf, 0).starts_with(&format!(" {LINKED_ICON} ")));

        picker.toggle_menu();
        let buf = render(&mut picker);
        assert!(row_text(&buf, 3).contains("● x.py"));
        assert!(row_text(&buf, 5).contains("Remove"));
        // Click the Remove row.
        assert_eq!(
            picker.handle_picker_event(&mouse(MouseEventKind::Down(MouseButton::Left), 3, 5)),
            Some(PickerAction::Removed)
        );
        assert_eq!(*calls.borrow(), vec![None]);
    }

    #[test]
    fn tooltip_shows_while_hovering_unselected_trigger() {
        let fx = Fixture::new(&[]);
        let (_, callbacks) = recording();
        let mut picker = fx.picker(
            PickerConfig::default().with_labels("Pair", "Drop a file here"),
            callbacks,
        );
        render(&mut picker);
        let buf = render(&mut picker);
        assert!(!row_text(&buf, 1).contains("Drop a file here"));
        picker.handle_picker_event(&mouse(MouseEventKind::Moved, 2, 0));
        let buf = render(&mut picker);
        assert!(row_text(&buf, 1).contains("Drop a file here"));
    }

    #[test]
    fn auto_select_target_rules() {
        let many = three();
        assert_eq!(auto_select_target(&[], Some("a.txt")), None);
        assert_eq!(
            auto_select_target(&many[..1], Some("nope")).map(|c| c.id.as_str()),
            Some("a")
        );
        assert_eq!(
            auto_select_target(&many, Some("c.txt")).map(|c| c.id.as_str()),
            Some("c")
        );
        assert_eq!(auto_select_target(&many, None), None);
    }
}
