use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Normalized extension filter. Empty means "allow everything".
pub struct ExtFilter {
    allowed: Vec<String>,
}

impl ExtFilter {
    /// Builds a filter from user-supplied extensions, stripping any
    /// leading dot and lowercasing. Matching is ASCII-case-insensitive.
    pub fn new(exts: &[String]) -> Self {
        let allowed = exts
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn matches(&self, path: &Path) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_ascii_lowercase();
                self.allowed.iter().any(|a| *a == ext)
            }
            None => false,
        }
    }
}

/// Expands path, directory, and glob roots into a deduplicated,
/// lexicographically ordered list of candidate files.
///
/// Traversal policy: glob patterns expand exactly as written (use `**`
/// for recursion); directories are listed one level deep. Roots that
/// match nothing are warned about and skipped.
pub fn collect_files(roots: &[String], exts: &[String]) -> Result<Vec<PathBuf>> {
    let filter = ExtFilter::new(exts);
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();

    for root in roots {
        let path = Path::new(root);
        if path.is_file() {
            if filter.matches(path) {
                found.insert(path.to_path_buf());
            }
        } else if path.is_dir() {
            list_dir(path, &filter, &mut found);
        } else {
            expand_glob(root, &filter, &mut found);
        }
    }

    if found.is_empty() {
        return Err(Error::NoMatch(format!(
            "no files matched {}{}",
            roots.join(", "),
            if exts.is_empty() {
                String::new()
            } else {
                format!(" with extension {}", exts.join(", "))
            }
        )));
    }

    Ok(found.into_iter().collect())
}

/// Lists regular files directly inside a directory (non-recursive)
fn list_dir(dir: &Path, filter: &ExtFilter, found: &mut BTreeSet<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot list directory {:?}: {}", dir, e);
            return;
        }
    };

    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && filter.matches(&path) {
                    found.insert(path);
                }
            }
            Err(e) => log::warn!("Error reading entry in {:?}: {}", dir, e),
        }
    }
}

/// Expands a glob pattern, keeping matching regular files
fn expand_glob(pattern: &str, filter: &ExtFilter, found: &mut BTreeSet<PathBuf>) {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("Skipping invalid pattern {:?}: {}", pattern, e);
            return;
        }
    };

    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() && filter.matches(&path) {
                    found.insert(path);
                }
            }
            Err(e) => log::warn!("Error reading glob entry: {}", e),
        }
    }
}
