use crate::config::Config;
use crate::filter::FilterPolicy;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Resolves the configured include set into the effective file list:
/// deduplicated absolute paths, sorted ascending by path string so repeated
/// builds with unchanged inputs produce identical documents.
pub fn collect_files(config: &Config) -> Vec<PathBuf> {
    let policy = FilterPolicy::new(config);
    let mut found: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in &config.included_paths {
        let path = Path::new(entry);
        if path.is_file() {
            if policy.is_included(path) {
                insert_resolved(&mut found, path);
            }
        } else if path.is_dir() {
            debug!("Walking included directory: {}", entry);
            // Exclusion is judged per discovered file, not by pruning
            // directories early.
            for dent in WalkDir::new(path).into_iter().filter_map(|e| match e {
                Ok(dent) => Some(dent),
                Err(err) => {
                    warn!("Error walking {}: {}", entry, err);
                    None
                }
            }) {
                if dent.file_type().is_file() && policy.is_included(dent.path()) {
                    insert_resolved(&mut found, dent.path());
                }
            }
        } else {
            // Entry vanished since it was added; not an error.
            debug!("Skipping missing include entry: {}", entry);
        }
    }

    trace!("Collected {} files", found.len());
    found.into_values().collect()
}

fn insert_resolved(found: &mut BTreeMap<String, PathBuf>, path: &Path) {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let key = resolved.to_string_lossy().replace('\\', "/");
    found.insert(key, resolved);
}
