//! Ranked completion over the note index
//!
//! Gathers candidate strings per completion context, scores them through
//! the fuzzy matcher, and returns a deterministic, capped ranking.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::error::NotegraphError;
use crate::fuzzy;
use crate::index::NoteIndex;
use crate::note::Note;

/// Where a completion was requested from; selects the candidate pool and
/// the inserted text shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionContext {
    /// Inside `[[...]]` — candidates are file names, titles, and aliases;
    /// the inserted text is the target file name
    WikiLink,
    /// Inside `[...](...)` — candidates are relative paths and titles;
    /// the inserted text is the relative path
    MarkdownLink,
    /// After `#` — candidates are distinct tags
    Tag,
}

impl FromStr for CompletionContext {
    type Err = NotegraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wiki" | "wikilink" => Ok(CompletionContext::WikiLink),
            "markdown" | "md" => Ok(CompletionContext::MarkdownLink),
            "tag" => Ok(CompletionContext::Tag),
            other => Err(NotegraphError::UnknownContext(other.to_string())),
        }
    }
}

impl fmt::Display for CompletionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionContext::WikiLink => write!(f, "wiki"),
            CompletionContext::MarkdownLink => write!(f, "markdown"),
            CompletionContext::Tag => write!(f, "tag"),
        }
    }
}

/// One ranked completion result
#[derive(Debug, Clone, Serialize)]
pub struct CompletionItem {
    /// The candidate string that matched
    pub label: String,
    /// Text to insert at the cursor
    pub insert_text: String,
    /// Source detail (relative path, or note count for tags)
    pub detail: String,
    pub context: CompletionContext,
    pub score: u32,
    /// Originating note metadata; absent for tag items
    #[serde(skip)]
    pub note: Option<Arc<Note>>,
}

/// Candidate-string preference when several strings of one note tie on
/// score: a title reads better than a raw file name, which beats an alias.
const PREF_TITLE: u8 = 0;
const PREF_FILE_NAME: u8 = 1;
const PREF_ALIAS: u8 = 2;

/// Completion queries over a shared [`NoteIndex`]
pub struct CompletionService {
    index: Arc<NoteIndex>,
}

impl CompletionService {
    pub fn new(index: Arc<NoteIndex>) -> Self {
        CompletionService { index }
    }

    /// Rank completion candidates for `query` under the given context.
    ///
    /// An empty query returns every candidate equal-ranked (sorted by
    /// label) up to the result cap.
    #[tracing::instrument(skip(self, root), fields(root = %root.display()))]
    pub fn complete(
        &self,
        query: &str,
        context: CompletionContext,
        root: &Path,
    ) -> Vec<CompletionItem> {
        self.index.ensure_fresh(root);

        let mut items = match context {
            CompletionContext::WikiLink | CompletionContext::MarkdownLink => {
                self.complete_notes(query, context, root)
            }
            CompletionContext::Tag => self.complete_tags(query),
        };

        items.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.label.cmp(&b.label)));
        items.truncate(self.index.config().result_cap);
        items
    }

    fn complete_notes(
        &self,
        query: &str,
        context: CompletionContext,
        root: &Path,
    ) -> Vec<CompletionItem> {
        self.index
            .all_notes()
            .into_iter()
            .filter_map(|note| self.score_note(query, context, root, note))
            .collect()
    }

    /// Compute the note's best candidate string and score; `None` when no
    /// candidate matches a non-empty query.
    fn score_note(
        &self,
        query: &str,
        context: CompletionContext,
        root: &Path,
        note: Arc<Note>,
    ) -> Option<CompletionItem> {
        let rel_path = note.relative_path(root);

        let mut candidates: Vec<(u8, &str)> = vec![(PREF_TITLE, note.title.as_str())];
        match context {
            CompletionContext::WikiLink => {
                candidates.push((PREF_FILE_NAME, note.file_name.as_str()));
                candidates.extend(note.aliases.iter().map(|a| (PREF_ALIAS, a.as_str())));
            }
            CompletionContext::MarkdownLink => {
                candidates.push((PREF_FILE_NAME, rel_path.as_str()));
            }
            CompletionContext::Tag => unreachable!("tag completion has its own path"),
        }

        let (score, label) = if query.is_empty() {
            (0, best_preferred(&candidates))
        } else {
            let mut best: Option<(u32, u8, &str)> = None;
            for (pref, candidate) in &candidates {
                let s = fuzzy::score(query, candidate);
                if s == 0 {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((bs, bp, _)) => s > bs || (s == bs && *pref < bp),
                };
                if better {
                    best = Some((s, *pref, candidate));
                }
            }
            let (s, _, label) = best?;
            (s, label.to_string())
        };

        let insert_text = match context {
            CompletionContext::WikiLink => note.file_name.clone(),
            CompletionContext::MarkdownLink => rel_path.clone(),
            CompletionContext::Tag => unreachable!("tag completion has its own path"),
        };

        Some(CompletionItem {
            label,
            insert_text,
            detail: rel_path,
            context,
            score,
            note: Some(note),
        })
    }

    fn complete_tags(&self, query: &str) -> Vec<CompletionItem> {
        self.index
            .tag_counts()
            .into_iter()
            .filter_map(|(tag, count)| {
                let score = if query.is_empty() {
                    0
                } else {
                    match fuzzy::score(query, &tag) {
                        0 => return None,
                        s => s,
                    }
                };
                Some(CompletionItem {
                    label: tag.clone(),
                    insert_text: tag,
                    detail: format!("{} notes", count),
                    context: CompletionContext::Tag,
                    score,
                    note: None,
                })
            })
            .collect()
    }
}

/// Label for the empty-query case: the most preferred candidate string
fn best_preferred(candidates: &[(u8, &str)]) -> String {
    candidates
        .iter()
        .min_by_key(|(pref, _)| *pref)
        .map(|(_, s)| s.to_string())
        .unwrap_or_default()
}
