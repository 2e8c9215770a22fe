use crate::config::{Config, DEFAULT_EXCLUDED_FOLDERS};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

static DEFAULT_FOLDER_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| DEFAULT_EXCLUDED_FOLDERS.iter().copied().collect());

/// Decides whether a file is eligible for inclusion. Every rule is an
/// independent veto; there are no positive include patterns beyond membership
/// in the configured include set the collector walks.
pub struct FilterPolicy {
    excluded_dirs: Vec<PathBuf>,
    excluded_files: Vec<PathBuf>,
    excluded_types: Vec<String>,
}

impl FilterPolicy {
    pub fn new(config: &Config) -> Self {
        let mut excluded_dirs = Vec::new();
        let mut excluded_files = Vec::new();

        for entry in &config.excluded_paths {
            let path = Path::new(entry);
            // Entries that no longer exist on disk have nothing to veto.
            let Ok(resolved) = path.canonicalize() else {
                trace!("Ignoring vanished exclude entry: {}", entry);
                continue;
            };
            if resolved.is_dir() {
                excluded_dirs.push(resolved);
            } else {
                excluded_files.push(resolved);
            }
        }

        FilterPolicy {
            excluded_dirs,
            excluded_files,
            excluded_types: config.excluded_types.clone(),
        }
    }

    pub fn is_included(&self, path: &Path) -> bool {
        let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if self.excluded_dirs.iter().any(|d| resolved.starts_with(d)) {
            trace!("Excluded by path rule (directory): {}", resolved.display());
            return false;
        }
        if self.excluded_files.iter().any(|f| resolved == *f) {
            trace!("Excluded by path rule (file): {}", resolved.display());
            return false;
        }

        if let Some(ext) = resolved.extension().and_then(|e| e.to_str()) {
            let dotted = format!(".{}", ext.to_lowercase());
            if self.excluded_types.iter().any(|t| t == &dotted) {
                trace!("Excluded by extension rule: {}", resolved.display());
                return false;
            }
        }

        // Applies to every segment of the resolved path, so a file is vetoed
        // even when the excluded folder sits above the included root.
        for component in resolved.components() {
            if let Component::Normal(name) = component {
                if name
                    .to_str()
                    .map_or(false, |n| DEFAULT_FOLDER_SET.contains(n))
                {
                    trace!("Excluded by default folder rule: {}", resolved.display());
                    return false;
                }
            }
        }

        true
    }
}
