use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, SnippetorError};

/// Exclusive advisory lock held while the settings file is rewritten.
/// Released when dropped.
#[derive(Debug)]
pub struct SettingsLock {
    file: File,
    path: PathBuf,
}

impl SettingsLock {
    /// Fails immediately with `Locked` if another process holds the lock.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        file.try_lock_exclusive()
            .map_err(|_| SnippetorError::Locked(path.display().to_string()))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SettingsLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), %err, "failed to release settings lock");
        }
    }
}
