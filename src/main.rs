use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indoc::indoc;

use livefile_picker::app::{App, AppOptions};
use livefile_picker::config::{DEFAULT_LABEL_BUTTON, DEFAULT_LABEL_TOOLTIP, PickerConfig};
use livefile_picker::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use livefile_picker::error::AppError;
use livefile_picker::event_loop::EventLoop;
use livefile_picker::model::WorkspaceId;
use livefile_picker::tasks::{TaskSpawner, build_runtime};
use livefile_picker::tracing_sub;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(
    name = "livefile-picker",
    version,
    about = "Pair a workspace with a local live file from the terminal.",
    after_help = indoc! {"
        Drop a file onto the terminal while the pointer is over the picker (or
        while the picker is focused) to pair it. Terminals deliver drops as
        pasted paths, so pasting a path works the same way.

        Keys:
          Enter / Space   open or close the menu
          Up / Down, j/k  move in the menu
          Esc             close the menu or the path prompt
          Ctrl+Q          quit
    "}
)]
struct Cli {
    /// Directory whose files are offered as live files.
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Workspace identifier. Defaults to the workspace directory name.
    #[arg(long, value_name = "ID")]
    workspace_id: Option<String>,

    /// Offer "Remove" while a live file is paired.
    #[arg(long)]
    allow_remove: bool,

    /// Pick the only candidate, or the one named by --auto-select-name.
    #[arg(long)]
    auto_select: bool,

    #[arg(long, value_name = "NAME", requires = "auto_select")]
    auto_select_name: Option<String>,

    #[arg(long, value_name = "TEXT", default_value = DEFAULT_LABEL_BUTTON)]
    label: String,

    #[arg(long, value_name = "TEXT", default_value = DEFAULT_LABEL_TOOLTIP)]
    tooltip: String,

    /// JSON file holding registered live files and the current pairing.
    #[arg(long, value_name = "FILE")]
    state: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `livefile_picker=trace`. RUST_LOG wins.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

impl Cli {
    fn workspace_id(&self) -> WorkspaceId {
        if let Some(id) = &self.workspace_id {
            return WorkspaceId::new(id.clone());
        }
        self.workspace
            .as_deref()
            .and_then(|dir| dir.canonicalize().ok())
            .and_then(|dir| dir.file_name().map(|name| name.to_string_lossy().into_owned()))
            .map(WorkspaceId::new)
            .unwrap_or_else(|| WorkspaceId::new("default"))
    }

    fn options(&self) -> AppOptions {
        let config = PickerConfig::default()
            .with_allow_remove(self.allow_remove)
            .with_auto_select(self.auto_select, self.auto_select_name.clone())
            .with_labels(self.label.clone(), self.tooltip.clone());
        AppOptions {
            workspace: self.workspace_id(),
            scan_dir: self.workspace.clone(),
            state_path: self.state.clone(),
            config,
        }
    }
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    tracing_sub::init(cli.log_file.as_deref(), cli.log_level.as_deref())?;

    let runtime = build_runtime().map_err(AppError::Runtime)?;
    let spawner = TaskSpawner::new(runtime.handle().clone());
    let mut app = App::new(cli.options(), spawner)?;

    let mut output = ConsoleOutputDriver::new()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), POLL_INTERVAL);
    let result = app.run(&mut event_loop, &mut output);
    if let Err(err) = &result {
        tracing::error!(error = %err, "picker exited with an error");
    }
    // Pending callbacks are abandoned with the runtime.
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}
