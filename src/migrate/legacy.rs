use crate::model::TaskSettings;

use super::raw::LegacyTaskFields;

/// How `bgColorLight`/`bgColorDark` interact with `applyTextBgColor`.
///
/// Stored settings were historically converted with the flag consumed by
/// the `syncTaskColor` rule before the background rules could read it, so
/// the background never reached the list item. `Legacy` reproduces that
/// result; `Corrected` copies the background to `li` as the flag intended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackgroundSync {
    #[default]
    Legacy,
    Corrected,
}

/// Map the pre-versioning flat fields onto the nested schema.
///
/// `entry` holds whatever nested data the stored entry already had; each
/// legacy field present overwrites exactly one nested destination and is
/// consumed. An entry without legacy fields comes back unchanged.
pub fn convert_task_entry(
    legacy: LegacyTaskFields,
    mut entry: TaskSettings,
    sync: BackgroundSync,
) -> TaskSettings {
    let LegacyTaskFields {
        reader,
        hide_border,
        font_size,
        task_color_light,
        task_color_dark,
        bg_color_light,
        bg_color_dark,
        apply_text_color,
        apply_text_bg_color,
        strikethrough,
        clear_theme_background: _,
    } = legacy;

    if let Some(reader) = reader {
        entry.checkbox.read_mode_data = Some(reader);
    }
    if let Some(hide_border) = hide_border {
        entry.checkbox.hide_border = Some(hide_border);
    }
    if let Some(font_size) = font_size {
        entry.checkbox.format_mut().font_size = Some(font_size);
    }
    if let Some(color) = task_color_light {
        entry.checkbox.light_mode.foreground = Some(color);
    }
    if let Some(color) = task_color_dark {
        entry.checkbox.dark_mode.foreground = Some(color);
    }

    let apply_text_bg = apply_text_bg_color.unwrap_or(false);
    if apply_text_color.unwrap_or(false) || apply_text_bg {
        entry.li.sync_task_color = Some(true);
    }

    let copy_background = match sync {
        BackgroundSync::Legacy => false,
        BackgroundSync::Corrected => apply_text_bg,
    };
    if let Some(color) = bg_color_light {
        if copy_background {
            entry.li.light_mode.background = Some(color.clone());
        }
        entry.checkbox.light_mode.background = Some(color);
    }
    if let Some(color) = bg_color_dark {
        if copy_background {
            entry.li.dark_mode.background = Some(color.clone());
        }
        entry.checkbox.dark_mode.background = Some(color);
    }

    if strikethrough == Some(true) {
        entry.li.format_mut().strikethrough = Some(true);
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextFormat;

    fn entry(data: &str) -> TaskSettings {
        TaskSettings {
            data: data.into(),
            ..TaskSettings::default()
        }
    }

    fn every_field() -> LegacyTaskFields {
        LegacyTaskFields {
            reader: Some("🌸".into()),
            hide_border: Some(true),
            font_size: Some(16),
            task_color_light: Some("fgLight".into()),
            task_color_dark: Some("fgDark".into()),
            bg_color_light: Some("bgLight".into()),
            bg_color_dark: Some("bgDark".into()),
            apply_text_color: Some(true),
            apply_text_bg_color: Some(true),
            strikethrough: Some(true),
            clear_theme_background: Some(false),
        }
    }

    #[test]
    fn every_legacy_field_lands_in_its_nested_destination() {
        let out = convert_task_entry(every_field(), entry("-"), BackgroundSync::Legacy);

        assert_eq!(out.checkbox.read_mode_data.as_deref(), Some("🌸"));
        assert_eq!(out.checkbox.hide_border, Some(true));
        assert_eq!(out.checkbox.format.as_ref().and_then(|f| f.font_size), Some(16));
        assert_eq!(out.checkbox.light_mode.foreground.as_deref(), Some("fgLight"));
        assert_eq!(out.checkbox.dark_mode.foreground.as_deref(), Some("fgDark"));
        assert_eq!(out.checkbox.light_mode.background.as_deref(), Some("bgLight"));
        assert_eq!(out.checkbox.dark_mode.background.as_deref(), Some("bgDark"));
        assert_eq!(out.li.sync_task_color, Some(true));
        assert_eq!(
            out.li.format,
            Some(TextFormat {
                strikethrough: Some(true),
                ..TextFormat::default()
            })
        );
        assert!(out.li.light_mode.is_empty());
        assert!(out.li.dark_mode.is_empty());
    }

    #[test]
    fn corrected_mode_copies_background_to_text() {
        let out = convert_task_entry(every_field(), entry("-"), BackgroundSync::Corrected);
        assert_eq!(out.li.light_mode.background.as_deref(), Some("bgLight"));
        assert_eq!(out.li.dark_mode.background.as_deref(), Some("bgDark"));
        assert_eq!(out.checkbox.light_mode.background.as_deref(), Some("bgLight"));
    }

    #[test]
    fn corrected_mode_needs_the_text_background_flag() {
        let legacy = LegacyTaskFields {
            bg_color_dark: Some("#a05454".into()),
            apply_text_color: Some(true),
            ..LegacyTaskFields::default()
        };
        let out = convert_task_entry(legacy, entry("i"), BackgroundSync::Corrected);
        assert_eq!(out.li.dark_mode.background, None);
        assert_eq!(out.li.sync_task_color, Some(true));
    }

    #[test]
    fn false_flags_do_not_sync_or_strike() {
        let legacy = LegacyTaskFields {
            apply_text_color: Some(false),
            apply_text_bg_color: Some(false),
            strikethrough: Some(false),
            ..LegacyTaskFields::default()
        };
        let out = convert_task_entry(legacy, entry("x"), BackgroundSync::Legacy);
        assert_eq!(out.li.sync_task_color, None);
        assert_eq!(out.li.format, None);
    }

    #[test]
    fn entry_without_legacy_fields_is_unchanged() {
        let mut before = entry("x");
        before.checkbox.prevent_click = Some(true);
        before.li.sync_task_font = Some(true);

        let out = convert_task_entry(
            LegacyTaskFields::default(),
            before.clone(),
            BackgroundSync::Legacy,
        );
        assert_eq!(out, before);
    }

    #[test]
    fn legacy_font_size_keeps_existing_format_fields() {
        let mut before = entry("x");
        before.checkbox.format_mut().font = Some("serif".into());
        let legacy = LegacyTaskFields {
            font_size: Some(12),
            ..LegacyTaskFields::default()
        };

        let out = convert_task_entry(legacy, before, BackgroundSync::Legacy);
        let format = out.checkbox.format.unwrap();
        assert_eq!(format.font.as_deref(), Some("serif"));
        assert_eq!(format.font_size, Some(12));
    }
}
