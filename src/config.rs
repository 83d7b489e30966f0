//! Caller-facing configuration of the live file picker.

/// Default text of the unselected-state trigger.
pub const DEFAULT_LABEL_BUTTON: &str = "Live file";
/// Default tooltip of the unselected-state trigger.
pub const DEFAULT_LABEL_TOOLTIP: &str = "Pair a local file with this workspace";
/// Heading shown at the top of the menu.
pub const MENU_HEADER: &str = "Live files";
pub const OTHER_FILE_LABEL: &str = "Other file…";
pub const REMOVE_LABEL: &str = "Remove";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    /// Offer a "Remove" entry while a live file is selected.
    pub allow_remove: bool,
    /// Pick a candidate automatically when the list or selection changes.
    pub auto_select: bool,
    /// Candidate name preferred by auto-select when several exist.
    pub auto_select_name: Option<String>,
    pub label_button: String,
    pub label_tooltip: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            allow_remove: false,
            auto_select: false,
            auto_select_name: None,
            label_button: DEFAULT_LABEL_BUTTON.to_string(),
            label_tooltip: DEFAULT_LABEL_TOOLTIP.to_string(),
        }
    }
}

impl PickerConfig {
    pub fn with_allow_remove(mut self, allow: bool) -> Self {
        self.allow_remove = allow;
        self
    }

    pub fn with_auto_select(mut self, enabled: bool, name: Option<String>) -> Self {
        self.auto_select = enabled;
        self.auto_select_name = name;
        self
    }

    pub fn with_labels(mut self, button: impl Into<String>, tooltip: impl Into<String>) -> Self {
        self.label_button = button.into();
        self.label_tooltip = tooltip.into();
        self
    }
}
