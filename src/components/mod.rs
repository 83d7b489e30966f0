use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod dialog_overlay;
pub mod live_file_picker;
pub mod path_prompt;
pub mod status_bar;

pub use dialog_overlay::DialogFrame;
pub use live_file_picker::{LiveFilePicker, PickerAction, PickerCallbacks};
pub use path_prompt::{PathPromptComponent, PromptOutcome};
pub use status_bar::StatusBar;

pub trait Component {
    fn resize(&mut self, _area: Rect) {}

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool);

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }
}
