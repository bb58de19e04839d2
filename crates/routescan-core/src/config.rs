//! Configuration for routescan.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Root directories to index
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Exclusion patterns (glob-like; wildcards are stripped and the
    /// remainder matched by substring containment)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Directory holding the durable store blobs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Workspace scope identifier
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Tracked source extension (without the leading dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_exclude() -> Vec<String> {
    [
        "**/.git/**",
        "**/venv/**",
        "**/.venv/**",
        "**/node_modules/**",
        "**/__pycache__/**",
        "**/site-packages/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".routescan")
}

fn default_scope() -> String {
    routescan_indexer::DEFAULT_SCOPE.to_string()
}

fn default_extension() -> String {
    routescan_indexer::DEFAULT_EXTENSION.to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            exclude: default_exclude(),
            data_dir: default_data_dir(),
            scope: default_scope(),
            extension: default_extension(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from the default location, falling back to
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let config_path = default_data_dir().join("config.yaml");

        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_yaml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config file: {}", e);
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Ensure the data directory exists
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
