use crate::errors::ContextError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_DIR_NAME: &str = ".ctxclip";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CACHE_FILE_NAME: &str = "custom_instructions.cache";

/// Folder names skipped anywhere along a file's resolved path. Always active,
/// not configurable.
pub const DEFAULT_EXCLUDED_FOLDERS: &[&str] = &[
    ".git",
    "__pycache__",
    "node_modules",
    ".venv",
    "venv",
    "build",
    "dist",
    ".idea",
    ".vs",
];

/// Seed values for `excluded_types`. Unlike folder names these are ordinary
/// config entries and the user may remove them.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".exe", ".dll", ".so", ".pyc", ".pyo", ".pyd", ".pdf", ".doc", ".docx", ".jpg", ".png",
    ".gif",
];

/// Persisted user settings.
///
/// Path entries are absolute, forward-slash normalized strings, kept sorted
/// and deduplicated. Extension entries are lowercase with a leading dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub included_paths: Vec<String>,
    pub excluded_paths: Vec<String>,
    pub excluded_types: Vec<String>,
    pub custom_instructions_url: String,
    pub use_custom_instructions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            included_paths: Vec::new(),
            excluded_paths: Vec::new(),
            excluded_types: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            custom_instructions_url: String::new(),
            use_custom_instructions: false,
        }
    }
}

impl Config {
    pub fn add_included_path(&mut self, path: &Path) -> bool {
        insert_sorted(&mut self.included_paths, normalize_path_string(path))
    }

    pub fn remove_included_path(&mut self, raw: &str) -> bool {
        remove_entry(&mut self.included_paths, raw)
    }

    pub fn clear_included_paths(&mut self) {
        self.included_paths.clear();
    }

    pub fn add_excluded_path(&mut self, path: &Path) -> bool {
        insert_sorted(&mut self.excluded_paths, normalize_path_string(path))
    }

    pub fn remove_excluded_path(&mut self, raw: &str) -> bool {
        remove_entry(&mut self.excluded_paths, raw)
    }

    /// Normalizes and adds an extension, returning the stored form.
    pub fn add_excluded_type(&mut self, raw: &str) -> Option<String> {
        let ext = normalize_extension(raw)?;
        insert_sorted(&mut self.excluded_types, ext.clone());
        Some(ext)
    }

    pub fn remove_excluded_type(&mut self, raw: &str) -> bool {
        let Some(ext) = normalize_extension(raw) else {
            return false;
        };
        let before = self.excluded_types.len();
        self.excluded_types.retain(|e| e != &ext);
        self.excluded_types.len() != before
    }
}

fn insert_sorted(entries: &mut Vec<String>, value: String) -> bool {
    if entries.contains(&value) {
        return false;
    }
    entries.push(value);
    entries.sort();
    true
}

fn remove_entry(entries: &mut Vec<String>, raw: &str) -> bool {
    let normalized = normalize_path_string(Path::new(raw));
    let before = entries.len();
    entries.retain(|e| e != raw && e != &normalized);
    entries.len() != before
}

/// Resolves a path to its absolute form and renders it with forward slashes.
/// Paths that cannot be canonicalized (not existing yet) are kept as given.
pub fn normalize_path_string(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved.to_string_lossy().replace('\\', "/")
}

/// Lowercases and dot-prefixes an extension; `""` and `"."` yield `None`.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let mut ext = raw.trim().to_lowercase();
    if ext.is_empty() {
        return None;
    }
    if !ext.starts_with('.') {
        ext.insert(0, '.');
    }
    if ext == "." {
        return None;
    }
    Some(ext)
}

/// Owns the on-disk location of the config file and the instructions cache.
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        ConfigStore { config_dir }
    }

    pub fn default_location() -> Result<Self, ContextError> {
        let home = dirs::home_dir()
            .ok_or_else(|| ContextError::ConfigError("Could not determine home directory".to_string()))?;
        Ok(ConfigStore::new(home.join(CONFIG_DIR_NAME)))
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.config_dir.join(CACHE_FILE_NAME)
    }

    /// Loads the persisted config. A missing file yields defaults; a file
    /// that cannot be read or parsed yields defaults with a warning. Unknown
    /// keys are ignored, so older and newer config files both load.
    pub fn load(&self) -> Config {
        let path = self.config_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Config::default();
            }
            Err(e) => {
                warn!("Could not read config at {}: {}", path.display(), e);
                return Config::default();
            }
        };

        match serde_json::from_str::<Config>(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not parse config at {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ContextError> {
        fs::create_dir_all(&self.config_dir)?;
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| ContextError::ConfigError(e.to_string()))?;
        fs::write(self.config_path(), text)?;
        debug!("Config saved to {}", self.config_path().display());
        Ok(())
    }
}
