use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::version::SchemaVersion;

/// Selects the schema and stylesheet family of a snippet. Fixed at creation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SnippetKind {
    #[default]
    #[serde(rename = "simple-task")]
    #[value(name = "simple-task")]
    Task,
    #[serde(rename = "folder")]
    #[value(name = "folder")]
    Folder,
}

impl SnippetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "simple-task",
            Self::Folder => "folder",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "simple-task" => Some(Self::Task),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Task => "simple checkboxes",
            Self::Folder => "colored folders",
        }
    }
}

impl fmt::Display for SnippetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every snippet regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetCommon {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SnippetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_font_import: Option<String>,
}

impl SnippetCommon {
    /// Blank identity; `identity::ensure_identity` fills it in.
    pub fn blank(kind: SnippetKind) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            kind,
            version: None,
            css_font_import: None,
        }
    }

    /// Name of the generated stylesheet, without the `.css` extension.
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.kind, self.name)
    }
}

/// Foreground/background pair for one theme mode. `None` means inherit
/// (foreground) or transparent (background).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeColors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl ModeColors {
    pub fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    /// Fields this release does not know, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxSettings {
    #[serde(default)]
    pub light_mode: ModeColors,
    #[serde(default)]
    pub dark_mode: ModeColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TextFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_border: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_mode_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_click: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CheckboxSettings {
    pub fn format_mut(&mut self) -> &mut TextFormat {
        self.format.get_or_insert_with(TextFormat::default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemSettings {
    #[serde(default)]
    pub light_mode: ModeColors,
    #[serde(default)]
    pub dark_mode: ModeColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TextFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_task_color: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_task_font: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListItemSettings {
    pub fn format_mut(&mut self) -> &mut TextFormat {
        self.format.get_or_insert_with(TextFormat::default)
    }
}

/// Appearance of one task marker, e.g. how `- [x]` renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSettings {
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unchecked: Option<bool>,
    #[serde(default)]
    pub checkbox: CheckboxSettings,
    #[serde(default)]
    pub li: ListItemSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskSettings {
    pub fn is_unchecked(&self) -> bool {
        self.unchecked.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnippetConfig {
    #[serde(flatten)]
    pub common: SnippetCommon,
    #[serde(default)]
    pub task_settings: Vec<TaskSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unchecked_task: Option<TaskSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_color_picker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_unchecked_task: Option<bool>,
    /// Fields written by a newer release, kept so a save here loses nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskSnippetConfig {
    pub fn empty() -> Self {
        Self {
            common: SnippetCommon::blank(SnippetKind::Task),
            task_settings: Vec::new(),
            unchecked_task: None,
            base_font_size: None,
            border_radius: None,
            hide_color_picker: None,
            style_unchecked_task: None,
            extra: Map::new(),
        }
    }

    /// Entries in display order: the unchecked row first when it is styled.
    pub fn rendered_entries(&self) -> impl Iterator<Item = &TaskSettings> {
        let unchecked = if self.style_unchecked_task.unwrap_or(false) {
            self.unchecked_task.as_ref()
        } else {
            None
        };
        unchecked.into_iter().chain(self.task_settings.iter())
    }
}

/// Appearance of one folder in the file explorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSettings {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub light_mode: ModeColors,
    #[serde(default)]
    pub dark_mode: ModeColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_children: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSnippetConfig {
    #[serde(flatten)]
    pub common: SnippetCommon,
    pub default: FolderSettings,
    #[serde(default)]
    pub folders: Vec<FolderSettings>,
    pub border_radius: u32,
    pub hide_collapse: bool,
    pub folder_icon: bool,
    pub hide_scrollbar: bool,
    pub hide_types: bool,
    pub hover_decoration: bool,
    pub relationship_lines: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A normalized snippet of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnippetConfig {
    Task(TaskSnippetConfig),
    Folder(FolderSnippetConfig),
}

impl SnippetConfig {
    pub fn common(&self) -> &SnippetCommon {
        match self {
            Self::Task(cfg) => &cfg.common,
            Self::Folder(cfg) => &cfg.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut SnippetCommon {
        match self {
            Self::Task(cfg) => &mut cfg.common,
            Self::Folder(cfg) => &mut cfg.common,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn kind(&self) -> SnippetKind {
        self.common().kind
    }

    /// Generated stylesheet filename, `{type}-{name}.css`.
    pub fn file_name(&self) -> String {
        format!("{}.css", self.common().file_stem())
    }

    /// Drop the editor's transient `cache` from the snippet and its entries.
    pub fn strip_cache(&mut self) {
        let not_cache = |key: &String, _: &mut Value| key != "cache";
        match self {
            Self::Task(cfg) => {
                cfg.extra.retain(not_cache);
                let entries = cfg.task_settings.iter_mut().chain(cfg.unchecked_task.as_mut());
                for entry in entries {
                    entry.extra.retain(not_cache);
                }
            }
            Self::Folder(cfg) => cfg.extra.retain(not_cache),
        }
    }
}

impl From<TaskSnippetConfig> for SnippetConfig {
    fn from(value: TaskSnippetConfig) -> Self {
        Self::Task(value)
    }
}

impl From<FolderSnippetConfig> for SnippetConfig {
    fn from(value: FolderSnippetConfig) -> Self {
        Self::Folder(value)
    }
}

/// Strict decode of an already-normalized snippet, dispatching on `type`.
/// Persisted data of unknown age goes through `migrate::Upgrader` instead.
impl<'de> Deserialize<'de> for SnippetConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = serde_json::Value::deserialize(deserializer)?;
        let tag = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?;
        match SnippetKind::parse(tag) {
            Some(SnippetKind::Task) => serde_json::from_value(value)
                .map(Self::Task)
                .map_err(D::Error::custom),
            Some(SnippetKind::Folder) => serde_json::from_value(value)
                .map(Self::Folder)
                .map_err(D::Error::custom),
            None => Err(D::Error::unknown_variant(tag, &["simple-task", "folder"])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> TaskSettings {
        TaskSettings {
            data: "x".into(),
            unchecked: None,
            checkbox: CheckboxSettings {
                light_mode: ModeColors {
                    foreground: Some("#0c5e7a".into()),
                    background: None,
                },
                hide_border: Some(true),
                ..CheckboxSettings::default()
            },
            li: ListItemSettings::default(),
            extra: Map::new(),
        }
    }

    #[test]
    fn empty_color_modes_serialize_as_empty_objects() {
        let json = serde_json::to_value(sample_entry()).unwrap();
        assert_eq!(
            json,
            json!({
                "data": "x",
                "checkbox": {
                    "lightMode": { "foreground": "#0c5e7a" },
                    "darkMode": {},
                    "hideBorder": true
                },
                "li": { "lightMode": {}, "darkMode": {} }
            })
        );
    }

    #[test]
    fn task_snippet_serializes_type_tag_and_camel_case() {
        let mut cfg = TaskSnippetConfig::empty();
        cfg.common.id = "id-1".into();
        cfg.common.name = "tasks".into();
        cfg.common.version = Some(SchemaVersion::new(0, 1, 7));
        cfg.base_font_size = Some(14);
        cfg.task_settings.push(sample_entry());

        let json = serde_json::to_value(SnippetConfig::from(cfg.clone())).unwrap();
        assert_eq!(json["type"], "simple-task");
        assert_eq!(json["version"], "0.1.7");
        assert_eq!(json["baseFontSize"], 14);
        assert!(json.get("uncheckedTask").is_none());

        let back: SnippetConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, SnippetConfig::Task(cfg));
    }

    #[test]
    fn strict_decode_keeps_unknown_fields_but_cache_can_be_stripped() {
        let mut cfg: SnippetConfig = serde_json::from_value(json!({
            "id": "a",
            "name": "b",
            "type": "simple-task",
            "futureFlag": 1,
            "cache": { "open": true },
            "taskSettings": [{ "data": "x", "cache": { "i": 0 }, "checkbox": { "glow": "2px" } }]
        }))
        .unwrap();

        let SnippetConfig::Task(task) = &cfg else {
            panic!("expected a task snippet");
        };
        assert_eq!(task.extra.get("futureFlag"), Some(&json!(1)));
        assert!(task.extra.get("type").is_none());
        assert_eq!(task.task_settings[0].checkbox.extra.get("glow"), Some(&json!("2px")));

        cfg.strip_cache();
        let out = serde_json::to_value(&cfg).unwrap();
        assert!(out.get("cache").is_none());
        assert!(out["taskSettings"][0].get("cache").is_none());
        assert_eq!(out["futureFlag"], 1);
        assert_eq!(out["taskSettings"][0]["checkbox"]["glow"], "2px");
    }

    #[test]
    fn strict_decode_rejects_unknown_type() {
        let err = serde_json::from_value::<SnippetConfig>(json!({
            "id": "a", "name": "b", "type": "mystery"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn file_name_combines_kind_and_name() {
        let mut cfg = TaskSnippetConfig::empty();
        cfg.common.name = "my-tasks".into();
        assert_eq!(SnippetConfig::Task(cfg).file_name(), "simple-task-my-tasks.css");
    }

    #[test]
    fn rendered_entries_puts_unchecked_row_first_only_when_styled() {
        let mut cfg = TaskSnippetConfig::empty();
        cfg.task_settings.push(sample_entry());
        cfg.unchecked_task = Some(TaskSettings {
            data: " ".into(),
            unchecked: Some(true),
            ..TaskSettings::default()
        });

        assert_eq!(cfg.rendered_entries().count(), 1);

        cfg.style_unchecked_task = Some(true);
        let data: Vec<&str> = cfg.rendered_entries().map(|t| t.data.as_str()).collect();
        assert_eq!(data, vec![" ", "x"]);
    }
}
