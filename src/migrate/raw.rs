//! Permissive decode of persisted snippets of unknown age.
//!
//! Every field is optional and ill-typed values are dropped with a warning
//! instead of failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::model::{
    CheckboxSettings, FolderSettings, ListItemSettings, ModeColors, TaskSettings, TextFormat,
};

/// Keeps a present `null` distinct from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Unknown fields worth carrying forward. The editor's transient `cache`
/// never is, and neither is any key the typed model writes itself.
pub(crate) fn carried(mut extra: Map<String, Value>, reserved: &[&str]) -> Map<String, Value> {
    extra.retain(|key, _| key != "cache" && !reserved.contains(&key.as_str()));
    if !extra.is_empty() {
        tracing::debug!(
            fields = ?extra.keys().collect::<Vec<_>>(),
            "keeping unknown settings fields"
        );
    }
    extra
}

pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let shown = value.to_string();
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            tracing::warn!(value = %shown, %err, "dropping ill-typed settings field");
            Ok(None)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCommon {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Kept untyped so a non-string or `null` version is unreadable rather
    /// than absent.
    #[serde(default, deserialize_with = "present")]
    pub version: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub css_font_import: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawModeColors {
    #[serde(default, deserialize_with = "lenient")]
    pub foreground: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub background: Option<String>,
}

impl From<RawModeColors> for ModeColors {
    fn from(raw: RawModeColors) -> Self {
        Self {
            foreground: raw.foreground,
            background: raw.background,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTextFormat {
    #[serde(default, deserialize_with = "lenient")]
    pub bold: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub italics: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub strikethrough: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub font: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_weight: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<RawTextFormat> for TextFormat {
    fn from(raw: RawTextFormat) -> Self {
        Self {
            bold: raw.bold,
            italics: raw.italics,
            strikethrough: raw.strikethrough,
            font: raw.font,
            font_size: raw.font_size,
            font_weight: raw.font_weight,
            extra: carried(raw.extra, &[]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCheckbox {
    #[serde(default, deserialize_with = "lenient")]
    pub light_mode: Option<RawModeColors>,
    #[serde(default, deserialize_with = "lenient")]
    pub dark_mode: Option<RawModeColors>,
    #[serde(default, deserialize_with = "lenient")]
    pub format: Option<RawTextFormat>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_border: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub read_mode_data: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub prevent_click: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub left: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub top: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<RawCheckbox> for CheckboxSettings {
    fn from(raw: RawCheckbox) -> Self {
        Self {
            light_mode: raw.light_mode.map(Into::into).unwrap_or_default(),
            dark_mode: raw.dark_mode.map(Into::into).unwrap_or_default(),
            format: raw.format.map(Into::into),
            hide_border: raw.hide_border,
            read_mode_data: raw.read_mode_data,
            prevent_click: raw.prevent_click,
            left: raw.left,
            top: raw.top,
            extra: carried(raw.extra, &[]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawListItem {
    #[serde(default, deserialize_with = "lenient")]
    pub light_mode: Option<RawModeColors>,
    #[serde(default, deserialize_with = "lenient")]
    pub dark_mode: Option<RawModeColors>,
    #[serde(default, deserialize_with = "lenient")]
    pub format: Option<RawTextFormat>,
    #[serde(default, deserialize_with = "lenient")]
    pub sync_task_color: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub sync_task_font: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<RawListItem> for ListItemSettings {
    fn from(raw: RawListItem) -> Self {
        Self {
            light_mode: raw.light_mode.map(Into::into).unwrap_or_default(),
            dark_mode: raw.dark_mode.map(Into::into).unwrap_or_default(),
            format: raw.format.map(Into::into),
            sync_task_color: raw.sync_task_color,
            sync_task_font: raw.sync_task_font,
            extra: carried(raw.extra, &[]),
        }
    }
}

/// Flat fields from the pre-versioning task schema.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTaskFields {
    #[serde(default, deserialize_with = "lenient")]
    pub reader: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_border: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub task_color_light: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub task_color_dark: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bg_color_light: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bg_color_dark: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub apply_text_color: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub apply_text_bg_color: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub strikethrough: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub clear_theme_background: Option<bool>,
}

impl LegacyTaskFields {
    /// Persisted names of the legacy fields that are present.
    pub fn present(&self) -> Vec<&'static str> {
        let checks = [
            ("reader", self.reader.is_some()),
            ("hideBorder", self.hide_border.is_some()),
            ("fontSize", self.font_size.is_some()),
            ("taskColorLight", self.task_color_light.is_some()),
            ("taskColorDark", self.task_color_dark.is_some()),
            ("bgColorLight", self.bg_color_light.is_some()),
            ("bgColorDark", self.bg_color_dark.is_some()),
            ("applyTextColor", self.apply_text_color.is_some()),
            ("applyTextBgColor", self.apply_text_bg_color.is_some()),
            ("strikethrough", self.strikethrough.is_some()),
            ("clearThemeBackground", self.clear_theme_background.is_some()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTaskEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub unchecked: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub checkbox: Option<RawCheckbox>,
    #[serde(default, deserialize_with = "lenient")]
    pub li: Option<RawListItem>,
    #[serde(flatten)]
    pub legacy: LegacyTaskFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawTaskEntry {
    /// Split into the already-nested part and the legacy flat fields.
    pub fn split(self) -> (TaskSettings, LegacyTaskFields) {
        let entry = TaskSettings {
            data: self.data.unwrap_or_default(),
            unchecked: self.unchecked,
            checkbox: self.checkbox.map(Into::into).unwrap_or_default(),
            li: self.li.map(Into::into).unwrap_or_default(),
            extra: carried(self.extra, &[]),
        };
        (entry, self.legacy)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTaskSnippet {
    #[serde(flatten)]
    pub common: RawCommon,
    #[serde(default, deserialize_with = "lenient")]
    pub task_settings: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub unchecked_task: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub base_font_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub border_radius: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_color_picker: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub style_unchecked_task: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub clear_theme_background: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFolderEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub light_mode: Option<RawModeColors>,
    #[serde(default, deserialize_with = "lenient")]
    pub dark_mode: Option<RawModeColors>,
    #[serde(default, deserialize_with = "lenient")]
    pub font: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub font_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub include_children: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<RawFolderEntry> for FolderSettings {
    fn from(raw: RawFolderEntry) -> Self {
        Self {
            target: raw.target.unwrap_or_default(),
            light_mode: raw.light_mode.map(Into::into).unwrap_or_default(),
            dark_mode: raw.dark_mode.map(Into::into).unwrap_or_default(),
            font: raw.font,
            font_size: raw.font_size,
            content: raw.content,
            include_children: raw.include_children,
            extra: carried(raw.extra, &[]),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFolderSnippet {
    #[serde(flatten)]
    pub common: RawCommon,
    #[serde(default, deserialize_with = "lenient")]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub folders: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub border_radius: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_collapse: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub folder_icon: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_scrollbar: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hide_types: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub hover_decoration: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub relationship_lines: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode `value`, falling back to an empty record when it is not an object.
pub(crate) fn decode<T>(value: Value, what: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(%err, "{what} is not an object; starting from defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ill_typed_fields_are_dropped_not_fatal() {
        let raw: RawTaskEntry = decode(
            json!({
                "data": "x",
                "checkbox": { "hideBorder": "yes", "left": 4 },
                "taskColorLight": 12
            }),
            "entry",
        );
        let (entry, legacy) = raw.split();
        assert_eq!(entry.data, "x");
        assert_eq!(entry.checkbox.hide_border, None);
        assert_eq!(entry.checkbox.left, Some(4));
        assert!(legacy.is_empty());
    }

    #[test]
    fn nulls_count_as_absent() {
        let raw: RawTaskEntry = decode(json!({ "data": null, "reader": null }), "entry");
        let (entry, legacy) = raw.split();
        assert_eq!(entry.data, "");
        assert!(legacy.is_empty());
    }

    #[test]
    fn legacy_fields_are_captured_alongside_nested_ones() {
        let raw: RawTaskEntry = decode(
            json!({
                "data": "-",
                "reader": "1",
                "hideBorder": true,
                "checkbox": { "lightMode": { "foreground": "red" } }
            }),
            "entry",
        );
        let (entry, legacy) = raw.split();
        assert_eq!(entry.checkbox.light_mode.foreground.as_deref(), Some("red"));
        assert_eq!(legacy.present(), vec!["reader", "hideBorder"]);
    }

    #[test]
    fn transient_cache_is_ignored() {
        let raw: RawTaskEntry = decode(
            json!({ "data": "x", "cache": { "i": 3, "expanded": true } }),
            "entry",
        );
        let (entry, legacy) = raw.split();
        assert_eq!(entry.data, "x");
        assert!(legacy.is_empty());
    }

    #[test]
    fn non_object_decodes_to_default() {
        let raw: RawTaskSnippet = decode(json!("nope"), "snippet");
        assert!(raw.task_settings.is_none());
        assert!(raw.common.id.is_none());
    }
}
