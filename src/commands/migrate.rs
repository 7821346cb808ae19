use std::fs;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, SnippetorError};
use crate::migrate::{BackgroundSync, UpgradeOptions, Upgrader};
use crate::output::Format;
use crate::version::SchemaVersion;

/// Normalize one stored snippet document and print it. Nothing is persisted.
pub fn run(
    file: Option<&Path>,
    current_version: Option<&str>,
    background_sync: BackgroundSync,
    format: Format,
) -> Result<()> {
    let text = match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let raw: Value = serde_json::from_str(&text)?;
    let normalized = migrate_document(raw, current_version, background_sync)?;

    match format {
        Format::Pretty => println!("{}", serde_json::to_string_pretty(&normalized)?),
        Format::Json | Format::Minimal => println!("{}", serde_json::to_string(&normalized)?),
    }
    Ok(())
}

pub fn migrate_document(
    raw: Value,
    current_version: Option<&str>,
    background_sync: BackgroundSync,
) -> Result<Value> {
    if !raw.is_object() {
        return Err(SnippetorError::MalformedSettings(
            "snippet document is not an object".into(),
        ));
    }

    let mut options = UpgradeOptions {
        background_sync,
        ..UpgradeOptions::default()
    };
    if let Some(version) = current_version {
        options.current_version = version
            .parse::<SchemaVersion>()
            .map_err(|err| SnippetorError::InvalidVersion(format!("{version}: {err}")))?;
    }

    let cfg = Upgrader::new(options).upgrade(raw)?;
    Ok(serde_json::to_value(&cfg)?)
}
