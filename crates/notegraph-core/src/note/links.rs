//! Wiki-link, markdown-link, and body-tag extraction

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::IndexConfig;

/// Maximum number of lines scanned per file
pub const MAX_SCAN_LINES: usize = 500;

static WIKI_LINK_RE: OnceLock<Regex> = OnceLock::new();
static MD_LINK_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn wiki_link_re() -> &'static Regex {
    WIKI_LINK_RE.get_or_init(|| {
        Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]+)?\]\]").expect("static wiki link pattern")
    })
}

fn md_link_re() -> &'static Regex {
    MD_LINK_RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("static md link pattern"))
}

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r"(?:^|\s)#([A-Za-z0-9][A-Za-z0-9_/-]*)").expect("static tag pattern")
    })
}

/// Extract link targets from `content`, scanning at most [`MAX_SCAN_LINES`].
///
/// Wiki links yield their trimmed target (display text discarded); a target
/// equal to `self_name` is dropped. Markdown links are kept only when
/// schemeless and either extensionless or carrying a markdown extension,
/// which is stripped. Occurrence order is preserved and duplicates are kept;
/// dedup is the graph layer's concern.
pub fn extract_links(content: &str, self_name: &str, config: &IndexConfig) -> Vec<String> {
    let mut links = Vec::new();

    for line in content.lines().take(MAX_SCAN_LINES) {
        // Collect both syntaxes with their positions so in-line ordering
        // is preserved across the two patterns.
        let mut found: Vec<(usize, String)> = Vec::new();

        for cap in wiki_link_re().captures_iter(line) {
            let target = cap[1].trim();
            if target.is_empty() || target == self_name {
                continue;
            }
            let start = cap.get(0).map(|m| m.start()).unwrap_or(0);
            found.push((start, target.to_string()));
        }

        for cap in md_link_re().captures_iter(line) {
            let target = cap[2].trim();
            let Some(target) = normalize_md_target(target, config) else {
                continue;
            };
            let start = cap.get(0).map(|m| m.start()).unwrap_or(0);
            found.push((start, target));
        }

        found.sort_by_key(|(start, _)| *start);
        links.extend(found.into_iter().map(|(_, target)| target));
    }

    links
}

/// Filter and normalize a markdown link target.
///
/// Returns `None` for external URLs, in-page anchors, and non-markdown
/// file references; otherwise strips a trailing markdown extension.
fn normalize_md_target(target: &str, config: &IndexConfig) -> Option<String> {
    if target.is_empty() || target.starts_with('#') || has_scheme(target) {
        return None;
    }

    let stripped = config.strip_markdown_extension(target);
    if stripped.len() < target.len() {
        // Carried a markdown extension
        return Some(stripped.to_string());
    }

    // Keep only extensionless targets
    let name = target.rsplit('/').next().unwrap_or(target);
    if name.contains('.') {
        return None;
    }
    Some(target.to_string())
}

fn has_scheme(target: &str) -> bool {
    if target.contains("://") {
        return true;
    }
    // mailto:, obsidian:, etc.
    target
        .split_once(':')
        .is_some_and(|(scheme, _)| !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Collect `#tag` and `#nested/tag` tokens from the body, skipping fenced
/// code blocks. Tags are lower-cased; hierarchy is preserved.
pub fn extract_tags(content: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    let mut in_fence = false;

    for line in content.lines().take(MAX_SCAN_LINES) {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        for cap in tag_re().captures_iter(line) {
            let tag = cap[1].trim_end_matches('/');
            // Bare numbers are not tags ("#1 priority")
            if tag.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            tags.insert(tag.to_lowercase());
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(content: &str, self_name: &str) -> Vec<String> {
        extract_links(content, self_name, &IndexConfig::default())
    }

    #[test]
    fn test_wiki_link_basic() {
        assert_eq!(links("See [[other note]].", "me"), vec!["other note"]);
    }

    #[test]
    fn test_wiki_link_display_text_discarded() {
        assert_eq!(links("[[target|shown text]]", "me"), vec!["target"]);
    }

    #[test]
    fn test_self_link_dropped() {
        assert!(links("[[self]]", "self").is_empty());
    }

    #[test]
    fn test_markdown_link_md_extension_stripped() {
        assert_eq!(links("[beta](beta.md)", "a"), vec!["beta"]);
        assert_eq!(links("[b](sub/beta.markdown)", "a"), vec!["sub/beta"]);
    }

    #[test]
    fn test_markdown_link_extensionless_kept() {
        assert_eq!(links("[beta](notes/beta)", "a"), vec!["notes/beta"]);
    }

    #[test]
    fn test_markdown_link_urls_and_anchors_skipped() {
        assert!(links("[site](https://example.com)", "a").is_empty());
        assert!(links("[site](http://example.com/x.md)", "a").is_empty());
        assert!(links("[sec](#heading)", "a").is_empty());
        assert!(links("[mail](mailto:x@y.z)", "a").is_empty());
    }

    #[test]
    fn test_markdown_link_foreign_extension_skipped() {
        assert!(links("![img](diagram.png)", "a").is_empty());
        assert!(links("[data](export.csv)", "a").is_empty());
    }

    #[test]
    fn test_order_preserved_across_syntaxes() {
        let content = "[md](one.md) then [[two]] then [md](three.md)\n[[four]]";
        assert_eq!(links(content, "me"), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_duplicates_not_deduplicated() {
        assert_eq!(links("[[a]] [[a]]", "me"), vec!["a", "a"]);
    }

    #[test]
    fn test_scan_bounded_to_max_lines() {
        let mut content = "x\n".repeat(MAX_SCAN_LINES);
        content.push_str("[[late]]\n");
        assert!(links(&content, "me").is_empty());
    }

    #[test]
    fn test_extract_tags_basic() {
        let tags = extract_tags("Working on #Project and #work/deep stuff");
        assert!(tags.contains("project"));
        assert!(tags.contains("work/deep"));
    }

    #[test]
    fn test_extract_tags_skips_headings_and_numbers() {
        let tags = extract_tags("# Heading\nIssue #42 is closed\n#real-tag");
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("real-tag"));
    }

    #[test]
    fn test_extract_tags_skips_code_fences() {
        let tags = extract_tags("```\n#not-a-tag\n```\n#yes");
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("yes"));
    }
}
