//! Bounded YAML-subset frontmatter parsing
//!
//! Reads only the leading lines of a file and understands exactly the
//! shapes needed for title/alias/tag extraction: scalars, inline arrays,
//! and block lists. Deliberately not a general YAML parser; malformed
//! input degrades to an empty result, never an error.

use std::collections::BTreeSet;

/// Maximum number of leading lines inspected for a frontmatter block
pub const MAX_FRONTMATTER_LINES: usize = 20;

const DELIMITER: &str = "---";
const ALT_TERMINATOR: &str = "...";

/// Extracted frontmatter fields of interest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub aliases: BTreeSet<String>,
    pub tags: BTreeSet<String>,
}

/// Parse a frontmatter block from the leading lines of `content`.
///
/// The block must start with `---` as the first line and end at the next
/// `---` or `...` within the read window; otherwise `None`.
pub fn parse_frontmatter(content: &str) -> Option<Frontmatter> {
    let mut lines = content.lines().take(MAX_FRONTMATTER_LINES);
    if lines.next()?.trim_end() != DELIMITER {
        return None;
    }

    let mut block = Vec::new();
    let mut terminated = false;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == ALT_TERMINATOR {
            terminated = true;
            break;
        }
        block.push(line);
    }
    if !terminated {
        // No terminator in the window: not a frontmatter block
        return None;
    }

    Some(parse_block(&block))
}

fn parse_block(block: &[&str]) -> Frontmatter {
    let mut fm = Frontmatter::default();

    let mut i = 0;
    while i < block.len() {
        let line = block[i];
        i += 1;

        let Some((key, rest)) = split_key_value(line) else {
            continue;
        };

        let values = if rest.is_empty() {
            // Block list: consume following `- item` lines
            let (items, consumed) = collect_list_items(&block[i..]);
            i += consumed;
            items
        } else if rest.starts_with('[') && rest.ends_with(']') {
            parse_inline_array(&rest[1..rest.len() - 1])
        } else {
            vec![strip_quotes(rest).to_string()]
        };

        apply_key(&mut fm, &key, values);
    }

    fm
}

fn apply_key(fm: &mut Frontmatter, key: &str, values: Vec<String>) {
    match key {
        "title" => {
            if let Some(first) = values.into_iter().next() {
                if !first.is_empty() {
                    fm.title = Some(first);
                }
            }
        }
        "aliases" | "alias" => {
            fm.aliases.extend(values.into_iter().filter(|v| !v.is_empty()));
        }
        "tags" => {
            fm.tags.extend(
                values
                    .into_iter()
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_lowercase()),
            );
        }
        _ => {}
    }
}

/// Split a `key: value` line; keys must start in column 0
fn split_key_value(line: &str) -> Option<(String, &str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (key, rest) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key.to_lowercase(), rest.trim()))
}

/// Collect consecutive `- item` lines, returning the items and the number
/// of lines consumed
fn collect_list_items(lines: &[&str]) -> (Vec<String>, usize) {
    let mut items = Vec::new();
    let mut consumed = 0;
    for line in lines {
        let trimmed = line.trim_start();
        let Some(item) = trimmed.strip_prefix("- ").or_else(|| {
            (trimmed == "-").then_some("")
        }) else {
            break;
        };
        consumed += 1;
        let item = strip_quotes(item.trim());
        if !item.is_empty() {
            items.push(item.to_string());
        }
    }
    (items, consumed)
}

fn parse_inline_array(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(|item| strip_quotes(item.trim()).to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_frontmatter() {
        assert_eq!(parse_frontmatter("Just text\n"), None);
        assert_eq!(parse_frontmatter(""), None);
    }

    #[test]
    fn test_delimiter_not_first_line() {
        assert_eq!(parse_frontmatter("\n---\ntitle: X\n---\n"), None);
    }

    #[test]
    fn test_unterminated_block_within_window() {
        let content = format!("---\ntitle: X\n{}", "body\n".repeat(30));
        assert_eq!(parse_frontmatter(&content), None);
    }

    #[test]
    fn test_scalar_title() {
        let fm = parse_frontmatter("---\ntitle: My Note\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("My Note"));
    }

    #[test]
    fn test_quoted_scalar() {
        let fm = parse_frontmatter("---\ntitle: \"Quoted: Title\"\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Quoted: Title"));
    }

    #[test]
    fn test_inline_array_aliases() {
        let fm = parse_frontmatter("---\naliases: [one, 'two', \"three\"]\n---\n").unwrap();
        assert_eq!(fm.aliases, set(&["one", "two", "three"]));
    }

    #[test]
    fn test_scalar_alias() {
        let fm = parse_frontmatter("---\nalias: shortcut\n---\n").unwrap();
        assert_eq!(fm.aliases, set(&["shortcut"]));
    }

    #[test]
    fn test_block_list_tags() {
        let content = "---\ntags:\n  - Work/Project\n  - Ideas\ntitle: T\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.tags, set(&["work/project", "ideas"]));
        assert_eq!(fm.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_alternate_terminator() {
        let fm = parse_frontmatter("---\ntitle: X\n...\nbody\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("X"));
    }

    #[test]
    fn test_tags_lowercased_hierarchy_preserved() {
        let fm = parse_frontmatter("---\ntags: [Deep/Nested/Tag]\n---\n").unwrap();
        assert_eq!(fm.tags, set(&["deep/nested/tag"]));
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let fm = parse_frontmatter("---\ndate: 2024-01-01\ntitle: X\ncustom: y\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("X"));
        assert!(fm.aliases.is_empty());
    }

    #[test]
    fn test_malformed_lines_never_error() {
        let content = "---\n:::\n- dangling\ntitle X no colon? fine:\ntitle: Real\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Real"));
    }

    #[test]
    fn test_empty_inline_array() {
        let fm = parse_frontmatter("---\ntags: []\n---\n").unwrap();
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn test_terminator_beyond_window_is_rejected() {
        let mut content = String::from("---\n");
        for i in 0..MAX_FRONTMATTER_LINES {
            content.push_str(&format!("k{}: v\n", i));
        }
        content.push_str("---\n");
        assert_eq!(parse_frontmatter(&content), None);
    }
}
