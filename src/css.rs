//! Stylesheet generation for normalized snippets.

use std::fmt;

use crate::defaults::DEFAULT_BASE_FONT_SIZE;
use crate::model::{
    FolderSettings, FolderSnippetConfig, ModeColors, SnippetConfig, TaskSettings,
    TaskSnippetConfig, TextFormat,
};

/// Turns a normalized snippet into stylesheet text.
pub trait StylesheetRenderer {
    fn render(&self, cfg: &SnippetConfig) -> String;
}

/// Renders task and folder snippets for the host's default theme markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssRenderer;

impl StylesheetRenderer for CssRenderer {
    fn render(&self, cfg: &SnippetConfig) -> String {
        let mut sheet = Sheet::default();
        let common = cfg.common();
        sheet.comment(&format!(
            "{} ({}) generated by snippetor {}",
            common.file_stem(),
            common.id,
            common
                .version
                .map(|v| v.to_string())
                .unwrap_or_default()
        ));
        if let Some(import) = common.css_font_import.as_deref().map(str::trim)
            && !import.is_empty()
        {
            sheet.raw(import);
        }

        match cfg {
            SnippetConfig::Task(task) => render_tasks(&mut sheet, task),
            SnippetConfig::Folder(folder) => render_folders(&mut sheet, folder),
        }
        sheet.finish()
    }
}

#[derive(Debug)]
struct Rule {
    selectors: Vec<String>,
    declarations: Vec<(&'static str, String)>,
}

impl Rule {
    fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
            declarations: Vec::new(),
        }
    }

    fn set(&mut self, property: &'static str, value: impl Into<String>) -> &mut Self {
        self.declarations.push((property, value.into()));
        self
    }

    fn set_opt(&mut self, property: &'static str, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.set(property, value);
        }
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.selectors.join(",\n"))?;
        for (property, value) in &self.declarations {
            writeln!(f, "    {property}: {value};")?;
        }
        writeln!(f, "}}")
    }
}

#[derive(Debug, Default)]
struct Sheet {
    out: String,
}

impl Sheet {
    fn comment(&mut self, text: &str) {
        self.out.push_str(&format!("/* {} */\n", text.replace("*/", "* /")));
    }

    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Rules without declarations are skipped.
    fn rule(&mut self, rule: &Rule) {
        if rule.declarations.is_empty() {
            return;
        }
        self.out.push_str(&rule.to_string());
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Quote `value` as a CSS string.
fn quoted(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\a ");
    format!("\"{escaped}\"")
}

fn px(value: impl fmt::Display) -> String {
    format!("{value}px")
}

fn apply_format(rule: &mut Rule, format: Option<&TextFormat>) {
    let Some(format) = format else {
        return;
    };
    rule.set_opt("font-family", format.font.clone())
        .set_opt("font-size", format.font_size.map(px))
        .set_opt("font-weight", format.font_weight.map(|w| w.to_string()));
    if format.bold == Some(true) && format.font_weight.is_none() {
        rule.set("font-weight", "bold");
    }
    if format.italics == Some(true) {
        rule.set("font-style", "italic");
    }
    if format.strikethrough == Some(true) {
        rule.set("text-decoration", "line-through");
    }
}

fn apply_colors(rule: &mut Rule, colors: &ModeColors) {
    rule.set_opt("color", colors.foreground.clone())
        .set_opt("background-color", colors.background.clone());
}

fn checkbox_selectors(entry: &TaskSettings, prefix: &str) -> Vec<String> {
    if entry.is_unchecked() {
        return vec![
            format!("{prefix}input[type=checkbox].task-list-item-checkbox:not(:checked)"),
            format!("{prefix}li.task-list-item[data-task=\"\"] > input:not(:checked)"),
        ];
    }
    let data = quoted(&entry.data);
    vec![
        format!("{prefix}input[data-task={data}]:checked"),
        format!("{prefix}li[data-task={data}] > input:checked"),
        format!("{prefix}li[data-task={data}] > p > input:checked"),
    ]
}

fn item_selectors(entry: &TaskSettings, prefix: &str) -> Vec<String> {
    if entry.is_unchecked() {
        return vec![format!("{prefix}li.task-list-item[data-task=\"\"]")];
    }
    let data = quoted(&entry.data);
    vec![
        format!("{prefix}.HyperMD-task-line[data-task={data}]"),
        format!("{prefix}li.task-list-item[data-task={data}]"),
    ]
}

fn render_tasks(sheet: &mut Sheet, cfg: &TaskSnippetConfig) {
    let mut body = Rule::new(["body"]);
    body.set_opt("--snippetor-base-font-size", cfg.base_font_size.map(px));
    sheet.rule(&body);

    let mut boxes = Rule::new([
        ".markdown-source-view.mod-cm6 .task-list-item-checkbox",
        ".markdown-preview-view .task-list-item-checkbox",
    ]);
    boxes.set_opt("border-radius", cfg.border_radius.map(|r| format!("{r}%")));
    if cfg.base_font_size.is_some() {
        boxes.set("font-size", "var(--snippetor-base-font-size)");
    }
    sheet.rule(&boxes);

    let base_size = cfg.base_font_size.unwrap_or(DEFAULT_BASE_FONT_SIZE);
    for entry in cfg.rendered_entries() {
        sheet.comment(&format!("[{}]", entry.data));
        render_task_entry(sheet, entry, base_size);
    }
}

fn render_task_entry(sheet: &mut Sheet, entry: &TaskSettings, base_size: u32) {
    let checkbox = &entry.checkbox;
    let format = checkbox.format.as_ref();
    let size = format.and_then(|f| f.font_size).unwrap_or(base_size);

    for (theme, colors) in [
        (".theme-light ", &checkbox.light_mode),
        (".theme-dark ", &checkbox.dark_mode),
    ] {
        let mut rule = Rule::new(checkbox_selectors(entry, theme));
        rule.set_opt("--checkbox-color", colors.foreground.clone())
            .set_opt("color", colors.foreground.clone())
            .set_opt("background-color", colors.background.clone());
        if colors.background.is_none() && checkbox.hide_border == Some(true) {
            rule.set("background-color", "transparent");
        }
        sheet.rule(&rule);
    }

    let mut glyph = Rule::new(checkbox_selectors(entry, ""));
    if checkbox.hide_border == Some(true) {
        glyph.set("border-color", "transparent");
    }
    if checkbox.prevent_click == Some(true) {
        glyph.set("pointer-events", "none");
    }
    apply_format(&mut glyph, format);
    glyph.set("--snippetor-box-font-size", px(size));
    if let Some(top) = checkbox.top {
        glyph
            .set("--snippetor-box-top", px(top))
            .set("position", "relative")
            .set("top", "var(--snippetor-box-top)");
    }
    sheet.rule(&glyph);

    // reading-mode marker, centered in the box unless `left` pins it
    let reading: Vec<String> = checkbox_selectors(entry, ".markdown-preview-view ")
        .into_iter()
        .map(|s| format!("{s}::after"))
        .collect();
    let mut marker = Rule::new(reading);
    let content = checkbox.read_mode_data.as_deref().unwrap_or(&entry.data);
    marker
        .set("content", quoted(content))
        .set("position", "absolute")
        .set(
            "font-family",
            format
                .and_then(|f| f.font.clone())
                .unwrap_or_else(|| "var(--font-monospace)".to_string()),
        )
        .set("font-size", "var(--snippetor-box-font-size)");
    match checkbox.left {
        Some(left) => marker
            .set("--snippetor-box-left", px(left))
            .set("left", "var(--snippetor-box-left)")
            .set("margin-left", "0"),
        None => marker
            .set("left", "50%")
            .set("margin-left", format!("-{}px", f64::from(size) / 2.0)),
    };
    sheet.rule(&marker);

    let li = &entry.li;
    let sync_color = li.sync_task_color == Some(true);
    for (theme, item_colors, box_colors) in [
        (".theme-light ", &li.light_mode, &checkbox.light_mode),
        (".theme-dark ", &li.dark_mode, &checkbox.dark_mode),
    ] {
        let mut rule = Rule::new(item_selectors(entry, theme));
        if sync_color {
            rule.set_opt("color", box_colors.foreground.clone());
        } else {
            apply_colors(&mut rule, item_colors);
        }
        sheet.rule(&rule);
    }

    let mut text = Rule::new(item_selectors(entry, ""));
    apply_format(&mut text, li.format.as_ref());
    if li.sync_task_font == Some(true)
        && let Some(font) = checkbox.format.as_ref().and_then(|f| f.font.clone())
    {
        text.set("font-family", font);
    }
    sheet.rule(&text);
}

fn folder_selectors(folder: &FolderSettings, suffix: &str) -> Vec<String> {
    let path = quoted(&folder.target);
    let mut selectors = vec![format!(".nav-folder-title[data-path={path}]{suffix}")];
    if folder.include_children == Some(true) {
        let children = quoted(&format!("{}/", folder.target));
        selectors.push(format!(".nav-folder-title[data-path^={children}]{suffix}"));
        selectors.push(format!(".nav-file-title[data-path^={children}]{suffix}"));
    }
    selectors
}

fn render_folder_colors(sheet: &mut Sheet, selectors: &[String], folder: &FolderSettings) {
    for (theme, colors) in [
        (".theme-light ", &folder.light_mode),
        (".theme-dark ", &folder.dark_mode),
    ] {
        let mut rule = Rule::new(selectors.iter().map(|s| format!("{theme}{s}")));
        apply_colors(&mut rule, colors);
        sheet.rule(&rule);
    }
}

fn render_folders(sheet: &mut Sheet, cfg: &FolderSnippetConfig) {
    let mut title = Rule::new([".nav-folder-title"]);
    title.set("border-radius", px(cfg.border_radius));
    sheet.rule(&title);

    render_folder_colors(sheet, &[".nav-folder-title".to_string()], &cfg.default);

    if cfg.hide_collapse {
        let mut rule = Rule::new([".nav-folder-collapse-indicator"]);
        rule.set("display", "none");
        sheet.rule(&rule);
    }
    if cfg.hide_scrollbar {
        let mut rule = Rule::new([".nav-files-container::-webkit-scrollbar"]);
        rule.set("display", "none");
        sheet.rule(&rule);
    }
    if cfg.hide_types {
        let mut rule = Rule::new([".nav-file-tag"]);
        rule.set("display", "none");
        sheet.rule(&rule);
    }
    if cfg.hover_decoration {
        let mut rule = Rule::new([".nav-folder-title:hover", ".nav-file-title:hover"]);
        rule.set("text-decoration", "underline");
        sheet.rule(&rule);
    }
    if cfg.relationship_lines {
        let mut rule = Rule::new([".nav-folder-children"]);
        rule.set("border-left", "1px solid var(--background-modifier-border)");
        sheet.rule(&rule);
    }
    if cfg.folder_icon {
        let mut rule = Rule::new([".nav-folder-title-content::before"]);
        rule.set("content", quoted("📁 "));
        sheet.rule(&rule);
    }

    for folder in cfg.folders.iter().filter(|f| !f.target.is_empty()) {
        sheet.comment(&folder.target);
        let selectors = folder_selectors(folder, "");
        render_folder_colors(sheet, &selectors, folder);

        let mut font = Rule::new(selectors);
        font.set_opt("font-family", folder.font.clone())
            .set_opt("font-size", folder.font_size.map(px));
        sheet.rule(&font);

        let mut content = Rule::new(folder_selectors(folder, " .nav-folder-title-content::before"));
        content.set_opt("content", folder.content.as_deref().map(quoted));
        sheet.rule(&content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::model::{FolderSnippetConfig, SnippetCommon, SnippetKind};
    use crate::version::SchemaVersion;

    fn task_cfg() -> TaskSnippetConfig {
        let mut cfg = TaskSnippetConfig::empty();
        cfg.common.id = "brave-otter-9b11c1".into();
        cfg.common.name = "tasks".into();
        cfg.common.version = Some(SchemaVersion::new(0, 1, 7));
        cfg.base_font_size = Some(14);
        let mut entry = TaskSettings {
            data: "x".into(),
            ..TaskSettings::default()
        };
        entry.checkbox.light_mode.foreground = Some("#0c5e7a".into());
        entry.checkbox.dark_mode.foreground = Some("#a0ffd1".into());
        entry.checkbox.read_mode_data = Some("✓".into());
        entry.li.sync_task_color = Some(true);
        entry.li.format_mut().strikethrough = Some(true);
        cfg.task_settings.push(entry);
        cfg
    }

    #[test]
    fn task_sheet_contains_theme_rules_and_reading_marker() {
        let css = CssRenderer.render(&SnippetConfig::Task(task_cfg()));

        assert!(css.starts_with("/* simple-task-tasks (brave-otter-9b11c1)"));
        assert!(css.contains("--snippetor-base-font-size: 14px;"));
        assert!(css.contains(".theme-light input[data-task=\"x\"]:checked"));
        assert!(css.contains("color: #0c5e7a;"));
        assert!(css.contains("content: \"✓\";"));
        assert!(css.contains("text-decoration: line-through;"));
        // synced list item reuses the checkbox color
        let synced = ".theme-dark li.task-list-item[data-task=\"x\"] {\n    color: #a0ffd1;";
        assert!(css.contains(synced));
    }

    #[test]
    fn font_size_and_offsets_reach_the_checkbox() {
        let mut cfg = task_cfg();
        let css = CssRenderer.render(&SnippetConfig::Task(cfg.clone()));
        assert!(css.contains("font-size: var(--snippetor-base-font-size);"));
        assert!(css.contains("--snippetor-box-font-size: 14px;"));
        assert!(css.contains("left: 50%;"));
        assert!(css.contains("margin-left: -7px;"));
        assert!(!css.contains("position: relative;"));

        let checkbox = &mut cfg.task_settings[0].checkbox;
        checkbox.left = Some(3);
        checkbox.top = Some(-2);
        checkbox.format_mut().font_size = Some(15);
        let css = CssRenderer.render(&SnippetConfig::Task(cfg));
        assert!(css.contains("--snippetor-box-font-size: 15px;"));
        let top = [
            "--snippetor-box-top: -2px;",
            "position: relative;",
            "top: var(--snippetor-box-top);",
        ]
        .join("\n    ");
        assert!(css.contains(&top));
        let left = [
            "--snippetor-box-left: 3px;",
            "left: var(--snippetor-box-left);",
            "margin-left: 0;",
        ]
        .join("\n    ");
        assert!(css.contains(&left));
        assert!(!css.contains("left: 50%;"));
    }

    #[test]
    fn reading_marker_falls_back_to_the_task_data() {
        let mut cfg = task_cfg();
        cfg.task_settings[0].checkbox.read_mode_data = None;
        let css = CssRenderer.render(&SnippetConfig::Task(cfg));
        assert!(css.contains(".markdown-preview-view input[data-task=\"x\"]:checked::after"));
        assert!(css.contains("content: \"x\";"));
        assert!(css.contains("font-family: var(--font-monospace);"));
    }

    #[test]
    fn unchecked_row_only_rendered_when_styled() {
        let mut cfg = task_cfg();
        let mut unchecked = TaskSettings {
            data: " ".into(),
            unchecked: Some(true),
            ..TaskSettings::default()
        };
        unchecked.checkbox.light_mode.foreground = Some("#9b11c1".into());
        cfg.unchecked_task = Some(unchecked);

        let css = CssRenderer.render(&SnippetConfig::Task(cfg.clone()));
        assert!(!css.contains(":not(:checked)"));

        cfg.style_unchecked_task = Some(true);
        let css = CssRenderer.render(&SnippetConfig::Task(cfg));
        assert!(css.contains(":not(:checked)"));
    }

    #[test]
    fn markers_are_escaped_in_selectors() {
        let mut cfg = task_cfg();
        cfg.task_settings[0].data = "\"".into();
        let css = CssRenderer.render(&SnippetConfig::Task(cfg));
        assert!(css.contains("input[data-task=\"\\\"\"]:checked"));
    }

    #[test]
    fn folder_sheet_honors_flags_and_targets() {
        let cfg = FolderSnippetConfig {
            common: SnippetCommon {
                id: "id".into(),
                name: "folders".into(),
                kind: SnippetKind::Folder,
                version: None,
                css_font_import: Some("@import url(https://fonts.example/x.css);".into()),
            },
            default: defaults::default_folder(),
            folders: vec![FolderSettings {
                target: "Projects".into(),
                light_mode: ModeColors {
                    foreground: Some("#123456".into()),
                    background: None,
                },
                include_children: Some(true),
                content: Some("🚀".into()),
                ..FolderSettings::default()
            }],
            border_radius: 6,
            hide_collapse: true,
            folder_icon: false,
            hide_scrollbar: false,
            hide_types: true,
            hover_decoration: false,
            relationship_lines: false,
            extra: Default::default(),
        };

        let css = CssRenderer.render(&SnippetConfig::Folder(cfg));
        assert!(css.contains("@import url(https://fonts.example/x.css);"));
        assert!(css.contains(".nav-folder-collapse-indicator"));
        assert!(!css.contains("::-webkit-scrollbar"));
        assert!(css.contains(".theme-light .nav-folder-title[data-path=\"Projects\"]"));
        assert!(css.contains(".nav-file-title[data-path^=\"Projects/\"]"));
        assert!(css.contains("content: \"🚀\";"));
        assert!(css.contains("border-radius: 6px;"));
    }
}
