use std::path::{Path, PathBuf};

use crate::migrate::{BackgroundSync, UpgradeOptions};

pub const VAULT_ENV: &str = "SNIPPETOR_VAULT";
pub const SYNC_TEXT_BACKGROUND_ENV: &str = "SNIPPETOR_SYNC_TEXT_BACKGROUND";

/// Where settings and generated stylesheets live for one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub vault: PathBuf,
    pub background_sync: BackgroundSync,
}

impl Config {
    /// `--vault`, then `SNIPPETOR_VAULT`, then the current directory.
    pub fn resolve(vault: Option<PathBuf>) -> std::io::Result<Self> {
        let vault = match vault.or_else(resolve_vault_env) {
            Some(vault) => vault,
            None => std::env::current_dir()?,
        };
        Ok(Self {
            vault,
            background_sync: resolve_background_sync(),
        })
    }

    pub fn for_vault(vault: impl Into<PathBuf>) -> Self {
        Self {
            vault: vault.into(),
            background_sync: BackgroundSync::default(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.obsidian_dir()
            .join("plugins")
            .join("snippetor")
            .join("data.json")
    }

    pub fn snippets_dir(&self) -> PathBuf {
        self.obsidian_dir().join("snippets")
    }

    fn obsidian_dir(&self) -> PathBuf {
        self.vault.join(".obsidian")
    }

    pub fn vault(&self) -> &Path {
        &self.vault
    }

    pub fn upgrade_options(&self) -> UpgradeOptions {
        UpgradeOptions {
            background_sync: self.background_sync,
            ..UpgradeOptions::default()
        }
    }
}

fn resolve_vault_env() -> Option<PathBuf> {
    std::env::var_os(VAULT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `1`/`true`/`yes` opt into copying the text background onto the list item.
pub fn resolve_background_sync() -> BackgroundSync {
    let enabled = std::env::var(SYNC_TEXT_BACKGROUND_ENV)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    if enabled {
        BackgroundSync::Corrected
    } else {
        BackgroundSync::Legacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-var tests must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn derived_paths_live_under_obsidian() {
        let cfg = Config::for_vault("/notes");
        assert_eq!(
            cfg.settings_path(),
            PathBuf::from("/notes/.obsidian/plugins/snippetor/data.json")
        );
        assert_eq!(cfg.snippets_dir(), PathBuf::from("/notes/.obsidian/snippets"));
    }

    #[test]
    fn vault_resolution_order() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe { std::env::set_var(VAULT_ENV, "/from-env") };
        let cfg = Config::resolve(Some(PathBuf::from("/from-flag"))).unwrap();
        assert_eq!(cfg.vault, PathBuf::from("/from-flag"));
        let cfg = Config::resolve(None).unwrap();
        assert_eq!(cfg.vault, PathBuf::from("/from-env"));

        unsafe { std::env::set_var(VAULT_ENV, "") };
        let cfg = Config::resolve(None).unwrap();
        assert_eq!(cfg.vault, std::env::current_dir().unwrap());

        unsafe { std::env::remove_var(VAULT_ENV) };
    }

    #[test]
    fn background_sync_env_behavior() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe { std::env::set_var(SYNC_TEXT_BACKGROUND_ENV, "1") };
        assert_eq!(resolve_background_sync(), BackgroundSync::Corrected);
        assert_eq!(
            Config::for_vault("/v").upgrade_options().background_sync,
            BackgroundSync::Legacy
        );

        unsafe { std::env::set_var(SYNC_TEXT_BACKGROUND_ENV, "0") };
        assert_eq!(resolve_background_sync(), BackgroundSync::Legacy);

        unsafe { std::env::remove_var(SYNC_TEXT_BACKGROUND_ENV) };
        assert_eq!(resolve_background_sync(), BackgroundSync::Legacy);
    }
}
