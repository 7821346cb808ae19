use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::css::{CssRenderer, StylesheetRenderer};
use crate::defaults::UNCHECKED_MARKER;
use crate::error::{Result, SnippetorError};
use crate::factory;
use crate::identity::IdentitySource;
use crate::migrate::Upgrader;
use crate::model::{SnippetConfig, SnippetKind, TaskSnippetConfig};
use crate::store::{SettingsLock, SettingsStore, SnippetFileWriter};

/// User-visible outcome of an operation that touched a stylesheet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub ok: bool,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradedSnippet {
    pub id: String,
    pub name: String,
    /// Version text as stored, `None` for pre-versioning snippets.
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeReport {
    pub dry_run: bool,
    pub upgraded: Vec<UpgradedSnippet>,
    pub unchanged: usize,
    /// Keys of stored snippets that could not be read; kept as stored.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerProblem {
    Duplicate,
    Empty,
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIssue {
    pub index: usize,
    pub data: String,
    pub problem: MarkerProblem,
}

impl MarkerIssue {
    pub fn message(&self) -> &'static str {
        match self.problem {
            MarkerProblem::Duplicate => "Another task uses the same value",
            MarkerProblem::Empty => "Specify a task value, e.g. X",
            MarkerProblem::Unchecked => {
                "Unchecked tasks are a special case; style them with styleUncheckedTask"
            }
        }
    }
}

/// Check the task markers of a snippet. Order of the result follows the
/// entries.
pub fn validate_task_markers(cfg: &TaskSnippetConfig) -> Vec<MarkerIssue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in &cfg.task_settings {
        *counts.entry(entry.data.as_str()).or_default() += 1;
    }

    cfg.task_settings
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let problem = if counts[entry.data.as_str()] > 1 {
                MarkerProblem::Duplicate
            } else if entry.data == UNCHECKED_MARKER {
                MarkerProblem::Unchecked
            } else if entry.data.is_empty() {
                MarkerProblem::Empty
            } else {
                return None;
            };
            Some(MarkerIssue {
                index,
                data: entry.data.clone(),
                problem,
            })
        })
        .collect()
}

struct Pending {
    from: Option<String>,
}

/// All snippets of one settings store, normalized on open. The store stays
/// locked for the life of the registry.
pub struct Snippetor {
    store: Box<dyn SettingsStore>,
    _lock: Option<SettingsLock>,
    files: Box<dyn SnippetFileWriter>,
    renderer: Box<dyn StylesheetRenderer>,
    upgrader: Upgrader<Box<dyn IdentitySource>>,
    snippets: BTreeMap<String, SnippetConfig>,
    /// Stored snippets that could not be read, by their original key.
    unreadable: Map<String, Value>,
    /// Top-level settings keys other than `snippets`.
    extra: Map<String, Value>,
    /// Snippets whose normalized form differs from what is stored.
    pending: BTreeMap<String, Pending>,
}

impl Snippetor {
    /// Load and normalize every stored snippet. Nothing is written back
    /// until a mutating operation or `upgrade_all` runs.
    ///
    /// Fails with `Locked` while another registry holds the same store.
    pub fn open(
        store: Box<dyn SettingsStore>,
        files: Box<dyn SnippetFileWriter>,
        upgrader: Upgrader<Box<dyn IdentitySource>>,
    ) -> Result<Self> {
        let lock = store.lock()?;
        let blob = store.load()?.ok_or(SnippetorError::NotInitialized)?;
        let Value::Object(mut extra) = blob else {
            return Err(SnippetorError::MalformedSettings(
                "settings root is not an object".into(),
            ));
        };
        let stored = match extra.remove("snippets") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(SnippetorError::MalformedSettings(
                    "`snippets` is not an object".into(),
                ));
            }
        };

        let mut registry = Self {
            store,
            _lock: lock,
            files,
            renderer: Box::new(CssRenderer),
            upgrader,
            snippets: BTreeMap::new(),
            unreadable: Map::new(),
            extra,
            pending: BTreeMap::new(),
        };

        let mut loaded = Vec::with_capacity(stored.len());
        for (key, raw) in stored {
            if !raw.is_object() {
                tracing::warn!(key = %key, "keeping unreadable snippet as stored");
                registry.unreadable.insert(key, raw);
                continue;
            }
            match registry.upgrader.upgrade(raw.clone()) {
                Ok(cfg) => loaded.push((key, raw, cfg)),
                Err(err) => {
                    tracing::warn!(key = %key, %err, "keeping unreadable snippet as stored");
                    registry.unreadable.insert(key, raw);
                }
            }
        }

        for (key, raw, mut cfg) in loaded {
            if registry.id_taken(cfg.id()) {
                tracing::warn!(
                    key = %key,
                    id = %cfg.id(),
                    "duplicate snippet id; assigning a new one"
                );
                cfg.common_mut().id.clear();
                registry.assign_unique_id(&mut cfg);
            }
            if key != cfg.id() {
                tracing::debug!(key = %key, id = %cfg.id(), "re-keying snippet by id");
            }

            let normalized = serde_json::to_value(&cfg)?;
            if key != cfg.id() || normalized != raw {
                let from = raw
                    .get("version")
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()));
                registry.pending.insert(cfg.id().to_string(), Pending { from });
            }
            registry.snippets.insert(cfg.id().to_string(), cfg);
        }

        tracing::debug!(
            snippets = registry.snippets.len(),
            unreadable = registry.unreadable.len(),
            pending = registry.pending.len(),
            "opened snippet registry"
        );
        Ok(registry)
    }

    pub fn with_renderer(mut self, renderer: Box<dyn StylesheetRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn store(&self) -> &dyn SettingsStore {
        self.store.as_ref()
    }

    pub fn files(&self) -> &dyn SnippetFileWriter {
        self.files.as_ref()
    }

    /// Snippets ordered by name, then id.
    pub fn all(&self) -> Vec<&SnippetConfig> {
        let mut all: Vec<&SnippetConfig> = self.snippets.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        all
    }

    /// Look up by id, then by unique name.
    pub fn get(&self, key: &str) -> Result<&SnippetConfig> {
        if let Some(cfg) = self.snippets.get(key) {
            return Ok(cfg);
        }
        let mut by_name = self.snippets.values().filter(|cfg| cfg.name() == key);
        match (by_name.next(), by_name.next()) {
            (Some(cfg), None) => Ok(cfg),
            (Some(_), Some(_)) => Err(SnippetorError::AmbiguousName(key.to_string())),
            (None, _) => Err(SnippetorError::SnippetNotFound(key.to_string())),
        }
    }

    fn resolve_id(&self, key: &str) -> Result<String> {
        self.get(key).map(|cfg| cfg.id().to_string())
    }

    fn id_taken(&self, id: &str) -> bool {
        self.snippets.contains_key(id) || self.unreadable.contains_key(id)
    }

    fn name_taken(&self, kind: SnippetKind, name: &str, except: Option<&str>) -> bool {
        self.snippets
            .values()
            .any(|cfg| cfg.kind() == kind && cfg.name() == name && Some(cfg.id()) != except)
    }

    fn assign_unique_id(&mut self, cfg: &mut SnippetConfig) {
        loop {
            self.upgrader.finalize(cfg);
            if !self.id_taken(cfg.id()) {
                return;
            }
            cfg.common_mut().id.clear();
        }
    }

    fn fresh_name(&mut self, kind: SnippetKind) -> String {
        loop {
            let name = self.upgrader.identity_mut().slug(2);
            if !self.name_taken(kind, &name, None) {
                return name;
            }
        }
    }

    fn check_name(&self, kind: SnippetKind, name: &str, except: Option<&str>) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.contains(['/', '\\', '\0']) {
            return Err(SnippetorError::InvalidFileName(format!("{kind}-{name}.css")));
        }
        if self.name_taken(kind, trimmed, except) {
            return Err(SnippetorError::NameTaken(trimmed.to_string()));
        }
        Ok(())
    }

    /// New snippet seeded from defaults, persisted but not yet generated.
    pub fn create(&mut self, kind: SnippetKind, name: Option<&str>) -> Result<SnippetConfig> {
        let current = self.upgrader.options().current_version;
        let source = &mut **self.upgrader.identity_mut();
        let mut cfg: SnippetConfig = match kind {
            SnippetKind::Task => factory::new_task_snippet(current, source).into(),
            SnippetKind::Folder => factory::new_folder_snippet(current, source).into(),
        };

        match name {
            Some(name) => {
                self.check_name(kind, name, None)?;
                cfg.common_mut().name = name.trim().to_string();
            }
            None => {
                if self.name_taken(kind, cfg.name(), None) {
                    cfg.common_mut().name = self.fresh_name(kind);
                }
            }
        }
        if self.id_taken(cfg.id()) {
            cfg.common_mut().id.clear();
            self.assign_unique_id(&mut cfg);
        }

        tracing::info!(id = %cfg.id(), name = %cfg.name(), kind = %kind, "created snippet");
        self.snippets.insert(cfg.id().to_string(), cfg.clone());
        self.save()?;
        Ok(cfg)
    }

    /// Replace a whole snippet, persist it and regenerate its stylesheet.
    /// A snippet whose name changed has its previous stylesheet removed.
    pub fn set(&mut self, mut cfg: SnippetConfig) -> Result<Notice> {
        cfg.strip_cache();
        if self.unreadable.contains_key(cfg.id()) {
            cfg.common_mut().id.clear();
        }
        self.upgrader.finalize(&mut cfg);
        let id = cfg.id().to_string();
        self.check_name(cfg.kind(), cfg.name(), Some(&id))?;

        let previous = self.snippets.insert(id.clone(), cfg);
        self.pending.remove(&id);
        self.save()?;

        if let Some(previous) = previous {
            let current = self.snippets[&id].file_name();
            if previous.file_name() != current {
                self.delete_file(&previous.file_name());
            }
        }
        Ok(self.write_file(&id))
    }

    /// Duplicate a snippet under a new id and a new random name.
    pub fn copy(&mut self, key: &str) -> Result<(SnippetConfig, Notice)> {
        let source_id = self.resolve_id(key)?;
        let original = self.snippets[&source_id].clone();

        let mut copy = original.clone();
        copy.common_mut().id.clear();
        copy.common_mut().name = self.fresh_name(copy.kind());
        self.assign_unique_id(&mut copy);

        self.snippets.insert(copy.id().to_string(), copy.clone());
        self.save()?;

        let notice = Notice::success(format!(
            "Copied snippet '{}' to '{}'",
            original.name(),
            copy.name()
        ));
        Ok((copy, notice))
    }

    pub fn rename(&mut self, key: &str, name: &str) -> Result<Notice> {
        let id = self.resolve_id(key)?;
        let mut cfg = self.snippets[&id].clone();
        self.check_name(cfg.kind(), name, Some(&id))?;
        cfg.common_mut().name = name.trim().to_string();
        self.set(cfg)
    }

    /// Drop a snippet from settings, then delete its stylesheet.
    pub fn remove(&mut self, key: &str) -> Result<Notice> {
        let id = self.resolve_id(key)?;
        let Some(cfg) = self.snippets.remove(&id) else {
            return Err(SnippetorError::SnippetNotFound(key.to_string()));
        };
        self.pending.remove(&id);
        self.save()?;
        tracing::info!(id = %id, name = %cfg.name(), "removed snippet");

        let file_name = cfg.file_name();
        match self.files.delete(&file_name) {
            Ok(true) => Ok(Notice::success(format!(
                "Removed snippet '{}' and {file_name}",
                cfg.name()
            ))),
            Ok(false) => Ok(Notice::success(format!("Removed snippet '{}'", cfg.name()))),
            Err(err) => Ok(Notice::failure(format!(
                "Removed snippet '{}' but could not delete {file_name}: {err}",
                cfg.name()
            ))),
        }
    }

    /// Render a snippet and write its stylesheet.
    pub fn generate_css(&mut self, key: &str) -> Result<Notice> {
        let id = self.resolve_id(key)?;
        Ok(self.write_file(&id))
    }

    pub fn render(&self, key: &str) -> Result<String> {
        let cfg = self.get(key)?;
        Ok(self.renderer.render(cfg))
    }

    fn write_file(&self, id: &str) -> Notice {
        let cfg = &self.snippets[id];
        let file_name = cfg.file_name();
        let css = self.renderer.render(cfg);
        match self.files.write(&file_name, &css) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "generated stylesheet");
                Notice::success(format!("Created {file_name}"))
            }
            Err(err) => {
                tracing::warn!(file = %file_name, %err, "failed to write stylesheet");
                Notice::failure(format!("Failed to create {file_name}: {err}"))
            }
        }
    }

    fn delete_file(&self, file_name: &str) {
        if let Err(err) = self.files.delete(file_name) {
            tracing::warn!(file = %file_name, %err, "failed to delete stale stylesheet");
        }
    }

    /// Persist every snippet whose normalized form differs from storage.
    pub fn upgrade_all(&mut self, dry_run: bool) -> Result<UpgradeReport> {
        let upgraded: Vec<UpgradedSnippet> = self
            .pending
            .iter()
            .filter_map(|(id, pending)| {
                let cfg = self.snippets.get(id)?;
                Some(UpgradedSnippet {
                    id: id.clone(),
                    name: cfg.name().to_string(),
                    from: pending.from.clone(),
                    to: cfg
                        .common()
                        .version
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                })
            })
            .collect();
        let report = UpgradeReport {
            dry_run,
            unchanged: self.snippets.len() - upgraded.len(),
            upgraded,
            skipped: self.unreadable.keys().cloned().collect(),
        };

        if !dry_run && !report.upgraded.is_empty() {
            self.save()?;
            tracing::info!(count = report.upgraded.len(), "upgraded snippets");
        }
        Ok(report)
    }

    pub fn validate_task_markers(&self, key: &str) -> Result<Vec<MarkerIssue>> {
        Ok(match self.get(key)? {
            SnippetConfig::Task(cfg) => validate_task_markers(cfg),
            SnippetConfig::Folder(_) => Vec::new(),
        })
    }

    /// Settings blob as it would be persisted.
    pub fn to_settings(&self) -> Result<Value> {
        let mut snippets = Map::new();
        for (id, cfg) in &self.snippets {
            snippets.insert(id.clone(), serde_json::to_value(cfg)?);
        }
        for (key, raw) in &self.unreadable {
            if !snippets.contains_key(key) {
                snippets.insert(key.clone(), raw.clone());
            }
        }

        let mut blob = self.extra.clone();
        blob.insert("snippets".into(), Value::Object(snippets));
        Ok(Value::Object(blob))
    }

    pub fn save(&mut self) -> Result<()> {
        let blob = self.to_settings()?;
        self.store.save(&blob)?;
        self.pending.clear();
        Ok(())
    }

    /// Ids of snippets with unsaved normalization.
    pub fn pending_ids(&self) -> BTreeSet<&str> {
        self.pending.keys().map(String::as_str).collect()
    }
}
