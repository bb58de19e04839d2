//! File system walker producing candidate source files.
//!
//! Enumerates files with the tracked extension under one or more roots,
//! pruning entries that match an exclusion pattern. Exclusion is a coarse
//! glob approximation: wildcard characters are stripped and the remainder is
//! matched by substring containment, so `**/venv/**` excludes any path
//! containing `/venv/`.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default tracked source extension.
pub const DEFAULT_EXTENSION: &str = "py";

/// Walker over one or more root directories.
///
/// Each [`walk`](Walker::walk) call performs a fresh traversal; there is no
/// cached state between invocations.
pub struct Walker {
    roots: Vec<PathBuf>,
    exclude: Vec<String>,
    extension: String,
}

impl Walker {
    /// Create a walker for the given roots and exclusion patterns.
    pub fn new(roots: Vec<PathBuf>, exclude: Vec<String>) -> Self {
        Self {
            roots,
            exclude,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Override the tracked file extension (without the leading dot).
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Walk all roots and return absolute paths of candidate files, sorted.
    ///
    /// Directory read failures are logged and skipped; partial results are
    /// acceptable.
    pub fn walk(&self) -> Vec<PathBuf> {
        let stripped = strip_wildcards(&self.exclude);
        let mut files = Vec::new();

        for root in &self.roots {
            let root = match root.canonicalize() {
                Ok(r) => r,
                Err(e) => {
                    warn!(path = ?root, error = %e, "Cannot resolve walk root");
                    continue;
                }
            };

            let patterns = stripped.clone();
            let walker = WalkBuilder::new(&root)
                .follow_links(false)
                .hidden(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .parents(true)
                .filter_entry(move |entry| !is_excluded(entry.path(), &patterns))
                .build();

            for result in walker {
                match result {
                    Ok(entry) => {
                        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
                        if is_file && has_extension(entry.path(), &self.extension) {
                            files.push(entry.into_path());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Walk error");
                    }
                }
            }
        }

        files.sort();
        debug!(count = files.len(), "Walk complete");
        files
    }
}

/// Strip wildcard characters from each pattern, dropping patterns that
/// reduce to nothing.
fn strip_wildcards(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.chars().filter(|c| *c != '*' && *c != '?').collect::<String>())
        .filter(|p| !p.is_empty())
        .collect()
}

fn is_excluded(path: &Path, patterns: &[String]) -> bool {
    let text = path.to_string_lossy();
    patterns.iter().any(|p| text.contains(p.as_str()))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map_or(false, |e| e == extension)
}
