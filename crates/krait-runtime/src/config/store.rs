//! Two-scope settings store: one JSON file under the user's home directory,
//! one under the project root, merged lazily into an effective view.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use tracing::warn;

use super::merge::merge_settings;
use super::schema::{HooksConfig, Settings};

/// Directory holding the settings file at either scope.
pub const CONFIG_DIR: &str = ".krait";
/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.json";

/// Relative path recorded in the project's `.gitignore` for the local file.
const GITIGNORE_ENTRY: &str = ".krait/settings.json";

/// A directory containing any of these is treated as a project root.
const PROJECT_MARKERS: &[&str] = &[".git", CONFIG_DIR, "Cargo.toml", "package.json"];

/// Environment switch that excludes project-local hooks from every merge.
pub const NO_LOCAL_HOOKS_ENV: &str = "KRAIT_NO_LOCAL_HOOKS";

const DEFAULT_MODEL: &str = "claude-sonnet-4";

/// Which of the two settings files an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// `~/.krait/settings.json`, shared across projects.
    Global,
    /// `<project-root>/.krait/settings.json`, kept out of version control.
    Local,
}

/// The three-way result of loading both scopes.
#[derive(Debug, Clone, PartialEq)]
pub struct HooksConfigView {
    pub global: HooksConfig,
    pub local: HooksConfig,
    pub merged: HooksConfig,
}

struct Snapshot {
    global: Settings,
    local: Settings,
    merged: Settings,
}

/// Loads, merges, and persists the two settings files. Reads are lazy and
/// cached; any write invalidates the cache. Constructed once per process.
pub struct ConfigStore {
    global_path: PathBuf,
    local_path: PathBuf,
    project_root: PathBuf,
    allow_local_hooks: bool,
    cache: RwLock<Option<Arc<Snapshot>>>,
}

impl ConfigStore {
    pub fn new(start_dir: &Path, home_dir: &Path, allow_local_hooks: bool) -> Self {
        let project_root = locate_project_root(start_dir);
        Self {
            global_path: home_dir.join(CONFIG_DIR).join(CONFIG_FILE),
            local_path: project_root.join(CONFIG_DIR).join(CONFIG_FILE),
            project_root,
            allow_local_hooks,
            cache: RwLock::new(None),
        }
    }

    /// Construct from the real home directory and the
    /// [`NO_LOCAL_HOOKS_ENV`] security switch.
    pub fn from_env(start_dir: &Path) -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        let allow_local_hooks =
            std::env::var(NO_LOCAL_HOOKS_ENV).map_or(true, |value| value != "true");
        Ok(Self::new(start_dir, &home_dir, allow_local_hooks))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn allow_local_hooks(&self) -> bool {
        self.allow_local_hooks
    }

    pub fn scope_path(&self, scope: ConfigScope) -> &Path {
        match scope {
            ConfigScope::Global => &self.global_path,
            ConfigScope::Local => &self.local_path,
        }
    }

    /// Path of the project settings file, when one exists on disk.
    pub fn project_config_path(&self) -> Option<PathBuf> {
        self.local_path.exists().then(|| self.local_path.clone())
    }

    pub fn read_global(&self) -> Settings {
        read_settings(&self.global_path)
    }

    pub fn read_local(&self) -> Settings {
        read_settings(&self.local_path)
    }

    /// Drop the cached merge; the next read reloads both files.
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        if let Some(snapshot) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            return snapshot.clone();
        }

        let global = self.read_global();
        let local = self.read_local();
        if !self.allow_local_hooks && !local.hooks.is_empty() {
            warn!(
                path = %self.local_path.display(),
                "Local hooks present but disabled by {NO_LOCAL_HOOKS_ENV}"
            );
        }
        let merged = merge_settings(&global, &local, self.allow_local_hooks);
        let snapshot = Arc::new(Snapshot {
            global,
            local,
            merged,
        });

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent reader may have raced us here; either result is a
        // full snapshot of the same files.
        *cache = Some(snapshot.clone());
        snapshot
    }

    /// Effective settings after the two-tier merge.
    pub fn settings(&self) -> Settings {
        self.snapshot().merged.clone()
    }

    /// The sole hook-read surface for the rest of the system.
    pub fn hooks_config(&self) -> HooksConfigView {
        let snapshot = self.snapshot();
        HooksConfigView {
            global: snapshot.global.hooks.clone(),
            local: snapshot.local.hooks.clone(),
            merged: snapshot.merged.hooks.clone(),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.snapshot().merged.api_key.clone()
    }

    pub fn default_model(&self) -> Option<String> {
        self.snapshot().merged.default_model.clone()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.snapshot().merged.temperature
    }

    pub fn system_message(&self) -> Option<String> {
        self.snapshot().merged.system_message.clone()
    }

    pub fn base_url(&self) -> Option<String> {
        self.snapshot().merged.base_url.clone()
    }

    pub fn exclude_patterns(&self) -> Vec<String> {
        self.snapshot().merged.exclude_patterns.clone()
    }

    pub fn include_patterns(&self) -> Vec<String> {
        self.snapshot().merged.include_patterns.clone()
    }

    /// Read-modify-write the global file through `patch`.
    pub fn write_global(&self, patch: impl FnOnce(&mut Settings)) -> Result<()> {
        self.write_scope(ConfigScope::Global, patch)
    }

    /// Read-modify-write the local file through `patch`. Also ensures the
    /// local file stays listed in the project's `.gitignore`.
    pub fn write_local(&self, patch: impl FnOnce(&mut Settings)) -> Result<()> {
        self.write_scope(ConfigScope::Local, patch)
    }

    pub fn write_scope(&self, scope: ConfigScope, patch: impl FnOnce(&mut Settings)) -> Result<()> {
        let path = self.scope_path(scope).to_path_buf();
        let mut settings = read_settings(&path);
        patch(&mut settings);
        write_settings(&path, &settings)?;
        self.invalidate();

        if scope == ConfigScope::Local {
            if let Err(e) = ensure_gitignore_entry(&self.project_root) {
                warn!(error = %e, "Failed to update .gitignore for local settings");
            }
        }
        Ok(())
    }

    /// Replace the `hooks` section of one scope's file.
    pub fn persist_hooks(&self, hooks: HooksConfig, scope: ConfigScope) -> Result<()> {
        self.write_scope(scope, |settings| settings.hooks = hooks)
    }

    pub fn set_default_model(&self, model: impl Into<String>) -> Result<()> {
        let model = model.into();
        self.write_global(|settings| settings.default_model = Some(model))
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) -> Result<()> {
        let api_key = api_key.into();
        self.write_global(|settings| settings.api_key = Some(api_key))
    }

    /// Remove the stored key; delete the global file outright when nothing
    /// else is left in it.
    pub fn clear_api_key(&self) -> Result<()> {
        if !self.global_path.exists() {
            return Ok(());
        }
        let mut settings = read_settings(&self.global_path);
        settings.api_key = None;
        if settings == Settings::default() {
            fs::remove_file(&self.global_path).with_context(|| {
                format!("Failed to remove {}", self.global_path.display())
            })?;
            self.invalidate();
            return Ok(());
        }
        write_settings(&self.global_path, &settings)?;
        self.invalidate();
        Ok(())
    }

    /// Create `<dir>/.krait/settings.json` with starter defaults.
    /// Errors when the file already exists.
    pub fn init_project_config(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if path.exists() {
            anyhow::bail!("Project settings already exist at {}", path.display());
        }

        let settings = Settings {
            default_model: Some(DEFAULT_MODEL.to_string()),
            temperature: Some(1.0),
            exclude_patterns: vec![
                "target/**".to_string(),
                "node_modules/**".to_string(),
                "*.log".to_string(),
            ],
            include_patterns: vec!["src/**".to_string(), "tests/**".to_string()],
            ..Default::default()
        };
        write_settings(&path, &settings)?;
        self.invalidate();
        Ok(path)
    }
}

/// Walk upward from `start` until a directory carries a project marker.
/// Falls back to `start` when the walk hits the filesystem root first.
pub fn locate_project_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if PROJECT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
            return dir.to_path_buf();
        }
    }
    start.to_path_buf()
}

/// Missing file is an empty config; a present-but-unparseable file is an
/// empty config plus a warning. Never an error.
fn read_settings(path: &Path) -> Settings {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read settings file");
            return Settings::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed settings file, using defaults");
            Settings::default()
        }
    }
}

/// Full-file replacement with owner-only permissions.
fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("Failed to encode settings")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }
    Ok(())
}

/// Idempotently append the local settings path to the project's
/// `.gitignore`, preserving a single trailing newline.
fn ensure_gitignore_entry(project_root: &Path) -> Result<()> {
    let path = project_root.join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(existing) => existing,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    if existing.lines().any(|line| line.trim() == GITIGNORE_ENTRY) {
        return Ok(());
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(GITIGNORE_ENTRY);
    updated.push('\n');
    fs::write(&path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
