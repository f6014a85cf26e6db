//! Markdown file discovery
//!
//! Prefers `rg --files` when ripgrep is installed, falling back to a
//! built-in walk. Both paths apply the same extension, denylist, depth,
//! and count filters, so callers see the same logical result set either
//! way and cannot depend on ordering. Discovery is best-effort: external
//! failures are absorbed by the fallback, never surfaced.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::IndexConfig;

/// Name of the preferred external search tool
const SEARCH_TOOL: &str = "rg";

/// Poll interval while waiting for the external tool
const WAIT_POLL: Duration = Duration::from_millis(10);

/// Reasons the external discovery path can fail
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("search tool not found in PATH")]
    ToolMissing,

    #[error("failed to run search tool: {0}")]
    Spawn(std::io::Error),

    #[error("search tool exited with code {code}")]
    ToolFailed { code: i32 },

    #[error("search tool timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Locates markdown files under a root directory
#[derive(Debug, Clone)]
pub struct FileLocator {
    config: IndexConfig,
}

impl FileLocator {
    pub fn new(config: IndexConfig) -> Self {
        FileLocator { config }
    }

    /// Find all markdown files under `root`.
    ///
    /// Returns absolute paths, sorted and truncated at `max_files`.
    /// A missing or non-directory root yields an empty set.
    #[tracing::instrument(skip(self, root), fields(root = %root.display()))]
    pub fn locate(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            return Vec::new();
        }
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

        let mut paths = self
            .locate_external(&root)
            .or_else(|err| {
                debug!(error = %err, "external discovery unavailable, using fallback walk");
                Ok::<_, DiscoveryError>(self.fallback_walk(&root))
            })
            .unwrap_or_default();

        // Sorted before the cap so which-files-win is deterministic
        paths.sort();
        paths.dedup();
        paths.truncate(self.config.max_files);
        paths
    }

    /// Invoke the external search tool, bounded by `locate_timeout_ms`
    pub fn locate_external(&self, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        let tool = which::which(SEARCH_TOOL).map_err(|_| DiscoveryError::ToolMissing)?;

        let mut cmd = Command::new(tool);
        cmd.arg("--files")
            .arg("--no-ignore")
            .arg("--hidden")
            .arg("--max-depth")
            .arg(self.config.max_depth.to_string());
        for ext in &self.config.extensions {
            // Case-insensitive, matching the fallback's extension check
            cmd.arg("--iglob").arg(format!("*.{}", ext));
        }
        for dir in &self.config.exclude_dirs {
            cmd.arg("--glob").arg(format!("!**/{}/**", dir));
        }
        cmd.arg(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .stdin(Stdio::null());

        let mut child = cmd.spawn().map_err(DiscoveryError::Spawn)?;

        // Drain stdout on a separate thread so a large result set cannot
        // fill the pipe and deadlock the timeout loop below.
        let mut stdout = child.stdout.take().ok_or(DiscoveryError::ToolFailed {
            code: -1,
        })?;
        let reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout.read_to_string(&mut buf);
            buf
        });

        let status = self.wait_with_timeout(&mut child)?;
        let output = reader.join().unwrap_or_default();

        // Exit code 1 with no output is the tool's "nothing found", not a failure
        let no_matches = status.code() == Some(1) && output.is_empty();
        if !status.success() && !no_matches {
            return Err(DiscoveryError::ToolFailed {
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|p| self.config.is_markdown(p))
            .collect())
    }

    fn wait_with_timeout(
        &self,
        child: &mut Child,
    ) -> Result<std::process::ExitStatus, DiscoveryError> {
        let timeout_ms = self.config.locate_timeout_ms;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(DiscoveryError::Timeout { timeout_ms });
                    }
                    thread::sleep(WAIT_POLL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DiscoveryError::Spawn(e));
                }
            }
        }
    }

    /// Built-in directory walk applying the same filters as the external path
    pub fn fallback_walk(&self, root: &Path) -> Vec<PathBuf> {
        let config = &self.config;
        WalkDir::new(root)
            .max_depth(config.max_depth)
            .into_iter()
            .filter_entry(|entry| {
                // The root itself is never pruned, whatever it is named
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !config.is_excluded_dir(name))
                    .unwrap_or(true)
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| config.is_markdown(path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;

    fn write_note(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# note\n").unwrap();
    }

    fn locator(config: IndexConfig) -> FileLocator {
        FileLocator::new(config)
    }

    #[test]
    fn test_locate_missing_root_is_empty() {
        let paths = locator(IndexConfig::default()).locate(Path::new("/no/such/dir"));
        assert!(paths.is_empty());
    }

    #[test]
    fn test_fallback_walk_filters_extensions_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "a.md");
        write_note(dir.path(), "sub/b.markdown");
        write_note(dir.path(), "sub/skip.txt");
        write_note(dir.path(), ".git/hidden.md");
        write_note(dir.path(), "node_modules/pkg/readme.md");

        let paths = locator(IndexConfig::default()).locate(dir.path());
        let names: BTreeSet<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, BTreeSet::from(["a.md".into(), "b.markdown".into()]));
    }

    #[test]
    fn test_locate_respects_max_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            write_note(dir.path(), &format!("note-{:02}.md", i));
        }

        let config = IndexConfig {
            max_files: 3,
            ..Default::default()
        };
        let paths = locator(config).locate(dir.path());
        assert_eq!(paths.len(), 3);
        // Sorted order means the lexicographically first files win
        assert!(paths[0].ends_with("note-00.md"));
        assert!(paths[2].ends_with("note-02.md"));
    }

    #[test]
    fn test_locate_respects_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "top.md");
        write_note(dir.path(), "a/b/c/d/deep.md");

        let config = IndexConfig {
            max_depth: 2,
            ..Default::default()
        };
        let paths = locator(config).locate(dir.path());
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("top.md"));
    }

    #[test]
    fn test_locate_returns_sorted_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "zeta.md");
        write_note(dir.path(), "alpha.md");

        let paths = locator(IndexConfig::default()).locate(dir.path());
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.is_absolute()));
        assert!(paths[0] < paths[1]);
    }

    #[test]
    fn test_external_and_fallback_agree_when_tool_present() {
        if which::which(SEARCH_TOOL).is_err() {
            return; // tool not installed on this machine
        }
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "one.md");
        write_note(dir.path(), "sub/two.md");
        write_note(dir.path(), "target/ignored.md");

        let locator = locator(IndexConfig::default());
        let root = dir.path().canonicalize().unwrap();
        let external: BTreeSet<_> = locator.locate_external(&root).unwrap().into_iter().collect();
        let fallback: BTreeSet<_> = locator.fallback_walk(&root).into_iter().collect();
        assert_eq!(external, fallback);
    }
}
