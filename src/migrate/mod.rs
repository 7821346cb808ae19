//! Versioned migration of persisted snippets to the current schema.
//!
//! Order matters: entries are converted while the stored version is still
//! visible, document-level changes are gated on that same stored version,
//! and the identity step stamps the current version last.

pub mod ensure;
pub mod legacy;
mod raw;

use serde_json::Value;

use crate::defaults::{self, DEFAULT_BASE_FONT_SIZE};
use crate::error::{Result, SnippetorError};
use crate::identity::{self, IdentitySource, OsIdentity};
use crate::model::{
    FolderSettings, FolderSnippetConfig, SnippetCommon, SnippetConfig, SnippetKind,
    TaskSettings, TaskSnippetConfig,
};
use crate::version::SchemaVersion;

pub use ensure::{FOLDER_ENTRY_PATHS, TASK_ENTRY_PATHS, ensure_path, ensure_paths};
pub use legacy::{BackgroundSync, convert_task_entry};
pub use raw::LegacyTaskFields;

use raw::{
    RawCommon, RawFolderEntry, RawFolderSnippet, RawTaskEntry, RawTaskSnippet, carried, decode,
};

/// Snippet keys the typed model writes itself.
const SNIPPET_KEYS: &[&str] = &["type"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOptions {
    /// Version stamped on every upgraded document.
    pub current_version: SchemaVersion,
    /// Documents below this version get `baseFontSize` and lose
    /// `clearThemeBackground`.
    pub base_font_size_since: SchemaVersion,
    pub background_sync: BackgroundSync,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            current_version: SchemaVersion::current(),
            base_font_size_since: SchemaVersion::base_font_size_since(),
            background_sync: BackgroundSync::default(),
        }
    }
}

/// The `version` a document carried when it was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredVersion {
    /// No `version` field: the pre-versioning flat schema.
    Unversioned,
    Known(SchemaVersion),
    /// Present but `null` or not parseable; ordered below every known version.
    Unreadable(String),
}

impl StoredVersion {
    fn from_raw(raw: Option<&Value>) -> Self {
        match raw {
            None => Self::Unversioned,
            Some(Value::String(text)) => match text.parse() {
                Ok(version) => Self::Known(version),
                Err(err) => {
                    tracing::warn!(version = %text, %err, "unreadable snippet version");
                    Self::Unreadable(text.clone())
                }
            },
            Some(other) => {
                tracing::warn!(version = %other, "snippet version is not a string");
                Self::Unreadable(other.to_string())
            }
        }
    }

    pub fn is_unversioned(&self) -> bool {
        matches!(self, Self::Unversioned)
    }

    pub fn is_below(&self, threshold: &SchemaVersion) -> bool {
        match self {
            Self::Unversioned | Self::Unreadable(_) => true,
            Self::Known(version) => version < threshold,
        }
    }

    pub fn known(&self) -> Option<SchemaVersion> {
        match self {
            Self::Known(version) => Some(*version),
            _ => None,
        }
    }
}

/// Normalize one stored task entry.
///
/// Guarantees the nested color objects exist, then converts legacy flat
/// fields when the enclosing document predates versioning. Legacy fields on
/// a versioned document are not converted; they are dropped with a warning.
pub fn migrate_task_entry(mut raw: Value, legacy_era: bool, sync: BackgroundSync) -> TaskSettings {
    ensure_paths(&mut raw, TASK_ENTRY_PATHS);
    let (entry, legacy) = decode::<RawTaskEntry>(raw, "task entry").split();

    if legacy_era {
        if !legacy.is_empty() {
            tracing::debug!(
                data = %entry.data,
                fields = ?legacy.present(),
                "converting legacy task fields"
            );
        }
        return convert_task_entry(legacy, entry, sync);
    }

    if !legacy.is_empty() {
        tracing::warn!(
            data = %entry.data,
            fields = ?legacy.present(),
            "ignoring legacy fields on a versioned snippet"
        );
    }
    entry
}

fn migrate_folder_entry(mut raw: Value) -> FolderSettings {
    ensure_paths(&mut raw, FOLDER_ENTRY_PATHS);
    decode::<RawFolderEntry>(raw, "folder entry").into()
}

fn common_from_raw(raw: RawCommon, kind: SnippetKind, stored: &StoredVersion) -> SnippetCommon {
    SnippetCommon {
        id: raw.id.unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        kind,
        version: stored.known(),
        css_font_import: raw.css_font_import,
    }
}

/// Applies the migration pipeline with injected options and identity source.
pub struct Upgrader<I = OsIdentity> {
    options: UpgradeOptions,
    identity: I,
}

impl Upgrader<OsIdentity> {
    pub fn new(options: UpgradeOptions) -> Self {
        Self::with_identity(options, OsIdentity::new())
    }
}

impl Default for Upgrader<OsIdentity> {
    fn default() -> Self {
        Self::new(UpgradeOptions::default())
    }
}

impl<I: IdentitySource> Upgrader<I> {
    pub fn with_identity(options: UpgradeOptions, identity: I) -> Self {
        Self { options, identity }
    }

    pub fn options(&self) -> &UpgradeOptions {
        &self.options
    }

    pub fn identity_mut(&mut self) -> &mut I {
        &mut self.identity
    }

    /// Normalize a stored snippet of any kind, dispatching on `type`.
    /// A missing `type` is read as a task snippet, the only kind that
    /// existed before the tag was written.
    pub fn upgrade(&mut self, raw: Value) -> Result<SnippetConfig> {
        let tag = raw.get("type").and_then(Value::as_str);
        let kind = match tag {
            None => SnippetKind::Task,
            Some(tag) => SnippetKind::parse(tag).ok_or_else(|| {
                SnippetorError::MalformedSettings(format!("unknown snippet type '{tag}'"))
            })?,
        };

        Ok(match kind {
            SnippetKind::Task => self.upgrade_task_snippet(raw).into(),
            SnippetKind::Folder => self.upgrade_folder_snippet(raw).into(),
        })
    }

    pub fn upgrade_task_snippet(&mut self, mut raw: Value) -> TaskSnippetConfig {
        if let Some(entries) = raw.get_mut("taskSettings").and_then(Value::as_array_mut) {
            for entry in entries {
                ensure_paths(entry, TASK_ENTRY_PATHS);
            }
        }
        if let Some(entry) = raw.get_mut("uncheckedTask") {
            ensure_paths(entry, TASK_ENTRY_PATHS);
        }

        let raw: RawTaskSnippet = decode(raw, "task snippet");
        let stored = StoredVersion::from_raw(raw.common.version.as_ref());
        let legacy_era = stored.is_unversioned();
        let sync = self.options.background_sync;

        let task_settings: Vec<TaskSettings> = raw
            .task_settings
            .unwrap_or_default()
            .into_iter()
            .map(|entry| migrate_task_entry(entry, legacy_era, sync))
            .collect();
        let unchecked_task = raw
            .unchecked_task
            .map(|entry| migrate_task_entry(entry, legacy_era, sync));

        let mut cfg = TaskSnippetConfig {
            common: common_from_raw(raw.common, SnippetKind::Task, &stored),
            task_settings,
            unchecked_task,
            base_font_size: raw.base_font_size,
            border_radius: raw.border_radius,
            hide_color_picker: raw.hide_color_picker,
            style_unchecked_task: raw.style_unchecked_task,
            extra: carried(raw.extra, SNIPPET_KEYS),
        };

        if stored.is_below(&self.options.base_font_size_since) {
            tracing::debug!(
                stored = ?stored,
                dropped_clear_theme_background = raw.clear_theme_background.is_some(),
                "introducing baseFontSize"
            );
            cfg.base_font_size = Some(DEFAULT_BASE_FONT_SIZE);
        } else if let Some(clear) = raw.clear_theme_background {
            // only documents crossing the threshold lose it
            cfg.extra.insert("clearThemeBackground".to_string(), Value::Bool(clear));
        }

        identity::ensure_identity(
            &mut cfg.common,
            self.options.current_version,
            &mut self.identity,
        );
        cfg
    }

    pub fn upgrade_folder_snippet(&mut self, mut raw: Value) -> FolderSnippetConfig {
        if let Some(entry) = raw.get_mut("default") {
            ensure_paths(entry, FOLDER_ENTRY_PATHS);
        }
        if let Some(entries) = raw.get_mut("folders").and_then(Value::as_array_mut) {
            for entry in entries {
                ensure_paths(entry, FOLDER_ENTRY_PATHS);
            }
        }

        let raw: RawFolderSnippet = decode(raw, "folder snippet");
        let stored = StoredVersion::from_raw(raw.common.version.as_ref());

        let mut cfg = FolderSnippetConfig {
            common: common_from_raw(raw.common, SnippetKind::Folder, &stored),
            default: raw
                .default
                .map(migrate_folder_entry)
                .unwrap_or_else(defaults::default_folder),
            folders: raw
                .folders
                .unwrap_or_default()
                .into_iter()
                .map(migrate_folder_entry)
                .collect(),
            border_radius: raw.border_radius.unwrap_or(defaults::FOLDER_BORDER_RADIUS),
            hide_collapse: raw.hide_collapse.unwrap_or(defaults::FOLDER_HIDE_COLLAPSE),
            folder_icon: raw.folder_icon.unwrap_or(defaults::FOLDER_ICON),
            hide_scrollbar: raw.hide_scrollbar.unwrap_or(defaults::FOLDER_HIDE_SCROLLBAR),
            hide_types: raw.hide_types.unwrap_or(defaults::FOLDER_HIDE_TYPES),
            hover_decoration: raw
                .hover_decoration
                .unwrap_or(defaults::FOLDER_HOVER_DECORATION),
            relationship_lines: raw
                .relationship_lines
                .unwrap_or(defaults::FOLDER_RELATIONSHIP_LINES),
            extra: carried(raw.extra, SNIPPET_KEYS),
        };

        identity::ensure_identity(
            &mut cfg.common,
            self.options.current_version,
            &mut self.identity,
        );
        cfg
    }

    /// Identity step alone, run before a snippet is persisted.
    pub fn finalize(&mut self, cfg: &mut SnippetConfig) {
        identity::ensure_identity(
            cfg.common_mut(),
            self.options.current_version,
            &mut self.identity,
        );
    }
}
