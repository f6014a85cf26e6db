//! Index configuration for notegraph
//!
//! Configuration is read from an optional `.notegraph.toml` at the
//! repository root, falling back to a per-user config file, then to
//! built-in defaults. Every field is optional in the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotegraphError, Result};

/// Per-root config file name
pub const CONFIG_FILE: &str = ".notegraph.toml";

/// Configuration for index construction and queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Explicit root override (optional; normally the caller resolves the root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_override: Option<PathBuf>,

    /// Hard cap on indexed files; rebuild stops accepting files once reached.
    /// Located paths are sorted before truncation so the cap is deterministic,
    /// but it remains best-effort: which files exist can change between scans.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Maximum directory traversal depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Index time-to-live in milliseconds
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Neighborhood memo time-to-live in milliseconds
    #[serde(default = "default_graph_ttl_ms")]
    pub graph_ttl_ms: u64,

    /// Maximum completion results returned per query
    #[serde(default = "default_result_cap")]
    pub result_cap: usize,

    /// Timeout for the external search tool invocation in milliseconds
    #[serde(default = "default_locate_timeout_ms")]
    pub locate_timeout_ms: u64,

    /// Directory names excluded from traversal
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Markdown file extensions (without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_max_files() -> usize {
    2000
}

fn default_max_depth() -> usize {
    10
}

fn default_ttl_ms() -> u64 {
    30_000
}

fn default_graph_ttl_ms() -> u64 {
    5_000
}

fn default_result_cap() -> usize {
    50
}

fn default_locate_timeout_ms() -> u64 {
    30_000
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        ".obsidian",
        ".cache",
        ".idea",
        ".vscode",
        "node_modules",
        "target",
        "build",
        "dist",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            root_override: None,
            max_files: default_max_files(),
            max_depth: default_max_depth(),
            ttl_ms: default_ttl_ms(),
            graph_ttl_ms: default_graph_ttl_ms(),
            result_cap: default_result_cap(),
            locate_timeout_ms: default_locate_timeout_ms(),
            exclude_dirs: default_exclude_dirs(),
            extensions: default_extensions(),
        }
    }
}

impl IndexConfig {
    /// Resolve configuration for a root: `<root>/.notegraph.toml` if present,
    /// else the per-user config file, else defaults.
    pub fn discover(root: &Path) -> Result<Self> {
        let local = root.join(CONFIG_FILE);
        if local.is_file() {
            return Self::load(&local);
        }
        if let Some(global) = Self::user_config_path() {
            if global.is_file() {
                return Self::load(&global);
            }
        }
        Ok(IndexConfig::default())
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| NotegraphError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Per-user config file location (`~/.config/notegraph/config.toml` on Linux)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("notegraph").join("config.toml"))
    }

    /// Whether a path carries one of the configured markdown extensions
    pub fn is_markdown(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Whether a directory name is on the traversal denylist
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Strip a markdown extension from a link target, if present
    pub fn strip_markdown_extension<'a>(&self, target: &'a str) -> &'a str {
        for ext in &self.extensions {
            let suffix = format!(".{}", ext);
            if target.len() > suffix.len() {
                let (head, tail) = target.split_at(target.len() - suffix.len());
                if tail.eq_ignore_ascii_case(&suffix) {
                    return head;
                }
            }
        }
        target
    }
}
