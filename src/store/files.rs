use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SnippetorError};

/// Destination for generated stylesheets.
pub trait SnippetFileWriter {
    /// Write `css` under `file_name`, returning the full path written.
    fn write(&self, file_name: &str, css: &str) -> Result<PathBuf>;

    /// Returns `false` if there was nothing to delete.
    fn delete(&self, file_name: &str) -> Result<bool>;

    fn exists(&self, file_name: &str) -> bool;
}

/// Stylesheets stored as plain files in one snippets directory.
#[derive(Debug, Clone)]
pub struct SnippetFiles {
    dir: PathBuf,
}

impl SnippetFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, file_name: &str) -> Result<PathBuf> {
        let invalid = file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(SnippetorError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.dir.join(file_name))
    }
}

impl SnippetFileWriter for SnippetFiles {
    fn write(&self, file_name: &str, css: &str) -> Result<PathBuf> {
        let path = self.file_path(file_name)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, css)?;
        tracing::debug!(path = %path.display(), bytes = css.len(), "wrote snippet file");
        Ok(path)
    }

    fn delete(&self, file_name: &str) -> Result<bool> {
        let path = self.file_path(file_name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted snippet file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, file_name: &str) -> bool {
        self.file_path(file_name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }
}
