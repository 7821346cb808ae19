use crate::model::{FolderSettings, ModeColors};

pub const DEFAULT_BASE_FONT_SIZE: u32 = 14;

/// Markers seeded into a new task snippet.
pub const DEFAULT_TASK_MARKERS: &[&str] = &["x", "-", ">"];

/// Marker reserved for the unchecked row.
pub const UNCHECKED_MARKER: &str = " ";

pub const FOLDER_BORDER_RADIUS: u32 = 6;
pub const FOLDER_HIDE_COLLAPSE: bool = false;
pub const FOLDER_ICON: bool = true;
pub const FOLDER_HIDE_SCROLLBAR: bool = true;
pub const FOLDER_HIDE_TYPES: bool = true;
pub const FOLDER_HOVER_DECORATION: bool = true;
pub const FOLDER_RELATIONSHIP_LINES: bool = true;

fn theme_default_colors() -> ModeColors {
    ModeColors {
        foreground: Some("var(--text-normal)".into()),
        background: Some("transparent".into()),
    }
}

/// Appearance applied to every folder unless overridden.
pub fn default_folder() -> FolderSettings {
    FolderSettings {
        target: String::new(),
        light_mode: theme_default_colors(),
        dark_mode: theme_default_colors(),
        font: None,
        font_size: None,
        content: None,
        include_children: Some(false),
        extra: Default::default(),
    }
}
