//! Fuzzy relevance scoring for completion candidates
//!
//! Pure function over (query, target) pairs. Case-insensitive. Scoring is
//! tiered; the first applicable tier wins and lower tiers are not blended:
//!
//! 1. Exact match: 1000
//! 2. Prefix match: `900 - len(target) + len(query) * 10`
//! 3. Word-boundary match: `700 - len(target) + len(query) * 5`
//! 4. Greedy subsequence walk with consecutive-run bonuses, gap penalties,
//!    and shortness/coverage bonuses
//!
//! A score of 0 means "no match, exclude from results". The empty query is
//! the caller's special case (return all candidates unscored).

const EXACT_SCORE: i64 = 1000;
const PREFIX_BASE: i64 = 900;
const WORD_BOUNDARY_BASE: i64 = 700;
const MATCH_POINTS: i64 = 10;
const CONSECUTIVE_STEP: i64 = 5;
const SHORTNESS_BASE: i64 = 100;
const COVERAGE_WEIGHT: f64 = 50.0;

/// Score `target`'s relevance to `query`; 0 excludes the candidate.
pub fn score(query: &str, target: &str) -> u32 {
    if query.is_empty() || target.is_empty() {
        return 0;
    }

    let query = query.to_lowercase();
    let target = target.to_lowercase();

    if query == target {
        return EXACT_SCORE as u32;
    }

    let q_len = query.chars().count() as i64;
    let t_len = target.chars().count() as i64;

    if target.starts_with(&query) {
        return clamp(PREFIX_BASE - t_len + q_len * MATCH_POINTS);
    }

    if has_word_boundary_match(&target, &query) {
        return clamp(WORD_BOUNDARY_BASE - t_len + q_len * CONSECUTIVE_STEP);
    }

    subsequence_score(&query, &target, q_len, t_len)
}

fn clamp(score: i64) -> u32 {
    score.max(0) as u32
}

/// Does `query` occur in `target` starting at the string start or right
/// after a non-word character?
fn has_word_boundary_match(target: &str, query: &str) -> bool {
    for (idx, _) in target.match_indices(query) {
        if idx == 0 {
            return true;
        }
        let boundary = target[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_alphanumeric() && c != '_');
        if boundary {
            return true;
        }
    }
    false
}

/// Tier 4: walk query characters left-to-right, greedily finding each next
/// character in target at or after the previous match position.
fn subsequence_score(query: &str, target: &str, q_len: i64, t_len: i64) -> u32 {
    let target_chars: Vec<char> = target.chars().collect();

    let mut total: i64 = 0;
    let mut consecutive: i64 = 0;
    let mut next = 0usize; // resume position in target
    let mut matched_any = false;

    for qc in query.chars() {
        let Some(gap) = target_chars[next..].iter().position(|&tc| tc == qc) else {
            return 0; // a query character cannot be found in order
        };

        if matched_any && gap == 0 {
            consecutive += CONSECUTIVE_STEP;
            total += consecutive;
        } else {
            consecutive = 0;
        }

        total += MATCH_POINTS;
        total -= gap as i64;
        next += gap + 1;
        matched_any = true;
    }

    total += SHORTNESS_BASE - t_len;
    total += ((q_len as f64 / t_len as f64) * COVERAGE_WEIGHT) as i64;

    clamp(total)
}
