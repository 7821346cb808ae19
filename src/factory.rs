use crate::defaults::{self, DEFAULT_BASE_FONT_SIZE, DEFAULT_TASK_MARKERS, UNCHECKED_MARKER};
use crate::identity::{self, IdentitySource};
use crate::model::{
    CheckboxSettings, FolderSettings, FolderSnippetConfig, ModeColors, SnippetCommon,
    SnippetKind, TaskSettings, TaskSnippetConfig,
};
use crate::version::SchemaVersion;

/// New task entry for `data` with random checkbox colors in both modes.
pub fn new_task_entry(data: &str, source: &mut dyn IdentitySource) -> TaskSettings {
    TaskSettings {
        data: data.to_string(),
        unchecked: None,
        checkbox: CheckboxSettings {
            light_mode: ModeColors {
                foreground: Some(source.color()),
                background: None,
            },
            dark_mode: ModeColors {
                foreground: Some(source.color()),
                background: None,
            },
            ..CheckboxSettings::default()
        },
        li: Default::default(),
        extra: Default::default(),
    }
}

/// Entry for the special unchecked row.
pub fn new_unchecked_entry(source: &mut dyn IdentitySource) -> TaskSettings {
    let mut entry = new_task_entry(UNCHECKED_MARKER, source);
    entry.unchecked = Some(true);
    entry
}

pub fn new_task_snippet(
    current: SchemaVersion,
    source: &mut dyn IdentitySource,
) -> TaskSnippetConfig {
    let mut cfg = TaskSnippetConfig::empty();
    cfg.task_settings = DEFAULT_TASK_MARKERS
        .iter()
        .map(|data| new_task_entry(data, source))
        .collect();
    cfg.base_font_size = Some(DEFAULT_BASE_FONT_SIZE);
    identity::ensure_identity(&mut cfg.common, current, source);
    cfg
}

pub fn new_folder_entry(target: &str) -> FolderSettings {
    FolderSettings {
        target: target.to_string(),
        ..FolderSettings::default()
    }
}

pub fn new_folder_snippet(
    current: SchemaVersion,
    source: &mut dyn IdentitySource,
) -> FolderSnippetConfig {
    let mut cfg = FolderSnippetConfig {
        common: SnippetCommon::blank(SnippetKind::Folder),
        default: defaults::default_folder(),
        folders: Vec::new(),
        border_radius: defaults::FOLDER_BORDER_RADIUS,
        hide_collapse: defaults::FOLDER_HIDE_COLLAPSE,
        folder_icon: defaults::FOLDER_ICON,
        hide_scrollbar: defaults::FOLDER_HIDE_SCROLLBAR,
        hide_types: defaults::FOLDER_HIDE_TYPES,
        hover_decoration: defaults::FOLDER_HOVER_DECORATION,
        relationship_lines: defaults::FOLDER_RELATIONSHIP_LINES,
        extra: Default::default(),
    };
    identity::ensure_identity(&mut cfg.common, current, source);
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::counting_identity;

    #[test]
    fn new_task_snippet_is_seeded_and_identified() {
        let cfg = new_task_snippet(SchemaVersion::new(0, 1, 7), &mut counting_identity());

        let markers: Vec<&str> = cfg.task_settings.iter().map(|t| t.data.as_str()).collect();
        assert_eq!(markers, vec!["x", "-", ">"]);
        assert!(
            cfg.task_settings
                .iter()
                .all(|t| t.checkbox.light_mode.foreground.is_some()
                    && t.checkbox.dark_mode.foreground.is_some())
        );
        assert_eq!(cfg.base_font_size, Some(14));
        assert_eq!(cfg.common.kind, SnippetKind::Task);
        assert!(!cfg.common.id.is_empty());
        assert_eq!(cfg.common.version, Some(SchemaVersion::new(0, 1, 7)));
    }

    #[test]
    fn unchecked_entry_is_marked() {
        let entry = new_unchecked_entry(&mut counting_identity());
        assert_eq!(entry.data, " ");
        assert!(entry.is_unchecked());
    }

    #[test]
    fn new_folder_snippet_uses_folder_defaults() {
        let cfg = new_folder_snippet(SchemaVersion::new(0, 1, 7), &mut counting_identity());
        assert_eq!(cfg.common.kind, SnippetKind::Folder);
        assert_eq!(cfg.default.light_mode.foreground.as_deref(), Some("var(--text-normal)"));
        assert!(cfg.hover_decoration);
        assert!(!cfg.hide_collapse);
        assert!(cfg.folders.is_empty());
    }
}
