use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{Result, SnippetorError};
use crate::store::lock::SettingsLock;

/// Persistence for the whole settings blob. The blob is schemaless here;
/// normalization happens in `migrate`.
pub trait SettingsStore {
    /// `None` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<Value>>;

    /// Replace the persisted blob. Callers doing a load-modify-save cycle
    /// hold `lock()` across the whole cycle.
    fn save(&self, blob: &Value) -> Result<()>;

    /// Exclusive access to the persisted blob until the guard is dropped.
    /// `None` when there is nothing to contend for.
    fn lock(&self) -> Result<Option<SettingsLock>> {
        Ok(None)
    }
}

/// Settings blob written before any snippet exists.
pub fn empty_settings() -> Value {
    json!({ "snippets": {} })
}

/// Settings stored as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the settings file; fails if it already exists.
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.create_parent()?;
        let _lock = SettingsLock::acquire(&store.lock_path())?;
        if store.exists() {
            return Err(SnippetorError::AlreadyInitialized(
                store.path.display().to_string(),
            ));
        }
        store.save(&empty_settings())?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn create_parent(&self) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            return Err(SnippetorError::MalformedSettings(format!(
                "settings path '{}' has no parent directory",
                self.path.display()
            )));
        };
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "settings".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Value>> {
        if !self.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// Write through a staging file and rename it over the target so a
    /// failed write never leaves a truncated settings file.
    fn save(&self, blob: &Value) -> Result<()> {
        self.create_parent()?;

        let staging = self
            .path
            .with_file_name(format!(".settings.{}.staging", Uuid::new_v4()));
        let json = serde_json::to_string_pretty(blob)?;
        if let Err(err) = fs::write(&staging, json) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        tracing::debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    /// Not taken before `init`: a vault without settings has nothing to guard
    /// and reports `NotInitialized` on load instead.
    fn lock(&self) -> Result<Option<SettingsLock>> {
        if !self.exists() {
            return Ok(None);
        }
        SettingsLock::acquire(&self.lock_path()).map(Some)
    }
}

/// In-memory store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: RefCell<Option<Value>>,
}

impl MemoryStore {
    pub fn new(blob: Option<Value>) -> Self {
        Self {
            blob: RefCell::new(blob),
        }
    }

    pub fn snapshot(&self) -> Option<Value> {
        self.blob.borrow().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Value>> {
        Ok(self.snapshot())
    }

    fn save(&self, blob: &Value) -> Result<()> {
        *self.blob.borrow_mut() = Some(blob.clone());
        Ok(())
    }
}
