//! The `livefile-picker` screen: one workspace, its picker, a status bar and
//! the path prompt that stands in for a system file dialog.
//!
//! Picker callbacks never touch UI state. They send [`AppMessage`]s over a
//! std channel, and the UI thread applies them on the next tick.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use crossterm::event::Event;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::components::{
    Component, LiveFilePicker, PathPromptComponent, PickerAction, PickerCallbacks, PromptOutcome,
    StatusBar,
};
use crate::config::PickerConfig;
use crate::drivers::{InputDriver, OutputDriver};
use crate::error::AppError;
use crate::event_loop::{ControlFlow, EventLoop};
use crate::keybindings::{Action, KeyBindings};
use crate::model::{FileHandle, LiveFileId, WorkspaceId};
use crate::provider::LiveFileRegistry;
use crate::tasks::{PendingTasks, TaskSpawner};
use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
    /// The picker chose a live file, or removed the pairing with `None`.
    Select {
        workspace: WorkspaceId,
        id: Option<LiveFileId>,
    },
    /// "Other file…" was chosen; show the path prompt.
    PromptForPath(WorkspaceId),
    /// A dropped or prompted file was added to the registry.
    Registered {
        workspace: WorkspaceId,
        id: LiveFileId,
    },
    RegisterFailed {
        path: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub workspace: WorkspaceId,
    /// Directory whose files are registered as candidates at startup.
    pub scan_dir: Option<PathBuf>,
    /// JSON file the registry and the pairing are loaded from and saved to.
    pub state_path: Option<PathBuf>,
    pub config: PickerConfig,
}

impl AppOptions {
    pub fn new(workspace: WorkspaceId) -> Self {
        Self {
            workspace,
            scan_dir: None,
            state_path: None,
            config: PickerConfig::default(),
        }
    }
}

pub struct App {
    workspace: WorkspaceId,
    registry: LiveFileRegistry,
    picker: LiveFilePicker,
    prompt: PathPromptComponent,
    status: StatusBar,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
    state_path: Option<PathBuf>,
    spawner: TaskSpawner,
    pending: PendingTasks,
    keys: KeyBindings,
}

/// Register `handle` with `workspace` and report the result on `tx`.
async fn register_file(
    registry: LiveFileRegistry,
    tx: Sender<AppMessage>,
    workspace: WorkspaceId,
    handle: FileHandle,
) {
    let message = match registry.register(&workspace, &handle) {
        Ok(id) => AppMessage::Registered { workspace, id },
        Err(err) => AppMessage::RegisterFailed {
            path: handle.path,
            error: err.to_string(),
        },
    };
    let _ = tx.send(message);
}

impl App {
    pub fn new(options: AppOptions, spawner: TaskSpawner) -> Result<Self, AppError> {
        let registry = match &options.state_path {
            Some(path) => LiveFileRegistry::load(path)?,
            None => LiveFileRegistry::new(),
        };
        if let Some(dir) = &options.scan_dir {
            let count = registry.scan_dir(&options.workspace, dir)?;
            tracing::info!(dir = %dir.display(), count, "registered workspace files");
        }

        let (tx, rx) = mpsc::channel();
        let callbacks = {
            let select_tx = tx.clone();
            let select_workspace = options.workspace.clone();
            let open_tx = tx.clone();
            let drop_tx = tx.clone();
            let drop_registry = registry.clone();
            PickerCallbacks::new(move |id| {
                let _ = select_tx.send(AppMessage::Select {
                    workspace: select_workspace.clone(),
                    id,
                });
            })
            .with_file_open(move |workspace| {
                let tx = open_tx.clone();
                async move {
                    let _ = tx.send(AppMessage::PromptForPath(workspace));
                }
            })
            .with_file_handle(move |workspace, handle| {
                register_file(drop_registry.clone(), drop_tx.clone(), workspace, handle)
            })
        };

        let mut picker = LiveFilePicker::new(
            options.workspace.clone(),
            Arc::new(registry.clone()),
            spawner.clone(),
            options.config,
            callbacks,
        );
        picker.set_focused(true);
        picker.set_live_file_id(registry.selection(&options.workspace));
        picker.sync();

        let mut app = Self {
            workspace: options.workspace,
            registry,
            picker,
            prompt: PathPromptComponent::new(),
            status: StatusBar::new(),
            tx,
            rx,
            state_path: options.state_path,
            spawner,
            pending: PendingTasks::new(),
            keys: KeyBindings::default(),
        };
        app.status.set_right(app.key_hints());
        app.status.set_left(app.pairing_summary());
        Ok(app)
    }

    pub fn workspace(&self) -> &WorkspaceId {
        &self.workspace
    }

    pub fn registry(&self) -> &LiveFileRegistry {
        &self.registry
    }

    pub fn picker(&self) -> &LiveFilePicker {
        &self.picker
    }

    pub fn prompt(&self) -> &PathPromptComponent {
        &self.prompt
    }

    pub fn status(&self) -> &str {
        self.status.left()
    }

    pub fn selection(&self) -> Option<LiveFileId> {
        self.picker.live_file_id().cloned()
    }

    /// Handles of every background task still tracked by the app.
    pub fn take_pending(&mut self) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = self.picker.take_pending();
        handles.extend(self.pending.take());
        handles
    }

    fn key_hints(&self) -> String {
        let combo = |action| {
            self.keys
                .first_combo(action)
                .map(|combo| combo.display())
                .unwrap_or_default()
        };
        format!(
            "{} menu · {} quit",
            combo(Action::PickerToggle),
            combo(Action::Quit)
        )
    }

    fn pairing_summary(&self) -> String {
        match self.selection() {
            Some(id) => match self.registry.get(&self.workspace, &id) {
                Some(meta) => format!("Paired with {}", meta.name),
                None => format!("Paired with {id}"),
            },
            None => "No live file".to_string(),
        }
    }

    /// Apply every message callbacks have sent since the last call.
    pub fn drain_messages(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, message: AppMessage) {
        tracing::debug!(?message, "applying app message");
        match message {
            AppMessage::Select { workspace, id } => {
                if workspace == self.workspace {
                    self.select(id);
                }
            }
            AppMessage::PromptForPath(workspace) => {
                self.prompt.open(workspace);
                self.picker.set_focused(false);
            }
            AppMessage::Registered { workspace, id } => {
                if workspace == self.workspace {
                    self.select(Some(id));
                }
            }
            AppMessage::RegisterFailed { path, error } => {
                tracing::warn!(path = %path.display(), %error, "could not register file");
                self.status
                    .set_left(format!("Could not add {}: {error}", path.display()));
            }
        }
    }

    fn select(&mut self, id: Option<LiveFileId>) {
        if let Err(err) = self.registry.set_selection(&self.workspace, id.clone()) {
            tracing::warn!(error = %err, "could not record selection");
        }
        self.picker.set_live_file_id(id);
        self.status.set_left(self.pairing_summary());
        self.persist();
    }

    fn persist(&mut self) {
        let Some(path) = self.state_path.clone() else {
            return;
        };
        if let Err(err) = self.save_to(&path) {
            tracing::warn!(error = %err, "could not save state");
            self.status.set_left(format!("Could not save state: {err}"));
        }
    }

    fn save_to(&self, path: &Path) -> Result<(), AppError> {
        self.registry.save(path)?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    fn register_in_background(&mut self, workspace: WorkspaceId, handle: FileHandle) {
        let future = register_file(self.registry.clone(), self.tx.clone(), workspace, handle);
        let task = self.spawner.spawn("register-file", Box::pin(future));
        self.pending.push(task);
    }

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        if let Event::Key(key) = event
            && self.keys.matches(Action::Quit, key)
        {
            return ControlFlow::Quit;
        }

        if self.prompt.visible() {
            match self.prompt.handle_prompt_event(event) {
                Some(PromptOutcome::Accepted { workspace, handle }) => {
                    self.status.set_left(format!("Adding {}…", handle.name));
                    self.register_in_background(workspace, handle);
                    self.picker.set_focused(true);
                }
                Some(PromptOutcome::Cancelled) => {
                    self.status.set_left(self.pairing_summary());
                    self.picker.set_focused(true);
                }
                None => {}
            }
            return ControlFlow::Continue;
        }

        match self.picker.handle_picker_event(event) {
            Some(PickerAction::DropIgnored) => {
                self.status.set_left("Dropped text does not name a file");
            }
            Some(PickerAction::FileDropped(handle)) => {
                self.status.set_left(format!("Adding {}…", handle.name));
            }
            _ => {}
        }
        ControlFlow::Continue
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let title = format!(" Workspace {} ", self.workspace);
        frame.set_string(
            area.x,
            area.y,
            &title,
            Style::default().add_modifier(Modifier::BOLD),
        );

        let status_rect = Rect {
            x: area.x,
            y: area.y.saturating_add(area.height.saturating_sub(1)),
            width: area.width,
            height: 1,
        };
        if let Some(path) = self
            .selection()
            .and_then(|id| self.registry.path_of(&self.workspace, &id))
        {
            frame.set_string(
                area.x.saturating_add(2),
                area.y.saturating_add(5),
                &path.display().to_string(),
                Style::default().add_modifier(Modifier::DIM),
            );
        }
        let picker_rect = Rect {
            x: area.x.saturating_add(2),
            y: area.y.saturating_add(2),
            width: area.width.saturating_sub(4),
            height: area.height.saturating_sub(3).min(2),
        };
        let prompt_open = self.prompt.visible();
        self.status.render(frame, status_rect, false);
        self.picker.render(frame, picker_rect, !prompt_open);
        self.prompt.render(frame, area, prompt_open);
    }

    /// Drive the app until quit, drawing on every tick.
    pub fn run<D, O>(
        &mut self,
        event_loop: &mut EventLoop<D>,
        output: &mut O,
    ) -> Result<(), AppError>
    where
        D: InputDriver,
        O: OutputDriver,
    {
        output.enter()?;
        tracing::info!(workspace = %self.workspace, "picker started");
        let result = event_loop.run(|_, event| match event {
            None => {
                self.drain_messages();
                output.draw(|mut frame| self.render(&mut frame))?;
                Ok(ControlFlow::Continue)
            }
            Some(event) => Ok(self.handle_event(&event)),
        });
        output.exit()?;
        tracing::info!(workspace = %self.workspace, "picker stopped");
        result.map_err(AppError::from)
    }
}
