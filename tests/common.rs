use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;

pub fn notegraph() -> Command {
    cargo_bin_cmd!("notegraph")
}

/// Write a small interlinked vault:
///
/// - `a.md` (title Alpha, alias first) links to `b`
/// - `b.md` (title Beta) links to `a`
/// - `plain-note.md` has no frontmatter
#[allow(dead_code)]
pub fn create_test_vault(root: &Path) {
    let notes: &[(&str, &str)] = &[
        (
            "a.md",
            "---\ntitle: Alpha\naliases: [first]\ntags: [work/project]\n---\n\nSee [[b]].\n",
        ),
        (
            "b.md",
            "---\ntitle: Beta\ntags: [work/project, ideas]\n---\n\nBack to [[a]].\n",
        ),
        ("plain-note.md", "No frontmatter here, just #inbox text.\n"),
    ];
    for (name, content) in notes {
        fs::write(root.join(name), content).unwrap();
    }
}

/// Write `count` trivially-named notes under `root`
#[allow(dead_code)]
pub fn create_bulk_notes(root: &Path, count: usize) {
    for i in 0..count {
        let content = format!("---\ntitle: Note {}\n---\n\nBody {}.\n", i, i);
        fs::write(root.join(format!("note-{:03}.md", i)), content).unwrap();
    }
}
