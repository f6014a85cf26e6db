//! Note records and metadata extraction

pub mod frontmatter;
pub mod links;

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::config::IndexConfig;
use frontmatter::parse_frontmatter;
use links::{extract_links, extract_tags};

/// One markdown file's extracted metadata.
///
/// Notes are assembled during an index rebuild and replaced wholesale on
/// the next one; consumers only ever see read-only `Arc<Note>` views.
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    /// Absolute path, unique key
    pub path: PathBuf,
    /// File stem, no extension
    pub file_name: String,
    /// Frontmatter title, defaulting to the file stem
    pub title: String,
    /// Alternate names matched during completion
    pub aliases: BTreeSet<String>,
    /// Lower-cased tags, `/` hierarchy preserved (frontmatter + body)
    pub tags: BTreeSet<String>,
    /// Raw link targets in occurrence order; duplicates allowed
    pub outbound_links: Vec<String>,
    /// Last-observed modification time
    #[serde(skip)]
    pub mtime: Option<SystemTime>,
}

impl Note {
    /// Read and extract metadata from a markdown file
    pub fn read(path: &Path, config: &IndexConfig) -> io::Result<Note> {
        let content = fs::read_to_string(path)?;
        let mtime = fs::metadata(path).and_then(|m| m.modified()).ok();

        let file_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let fm = parse_frontmatter(&content).unwrap_or_default();
        let title = fm.title.unwrap_or_else(|| file_name.clone());

        let mut tags = fm.tags;
        tags.extend(extract_tags(&content));

        let outbound_links = extract_links(&content, &file_name, config);

        Ok(Note {
            path: path.to_path_buf(),
            file_name,
            title,
            aliases: fm.aliases,
            tags,
            outbound_links,
            mtime,
        })
    }

    /// Path relative to the index root, for display and markdown-link insertion
    pub fn relative_path(&self, root: &Path) -> String {
        self.path
            .strip_prefix(root)
            .unwrap_or(&self.path)
            .to_string_lossy()
            .to_string()
    }
}
