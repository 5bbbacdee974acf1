//! String similarity measures.
//!
//! Three independent measures, each normalized to `[0, 1]`:
//!
//! - [`sequence_ratio`]: Ratcliff/Obershelp matching-block ratio
//! - [`jaccard_ratio`]: overlap of the distinct characters
//! - [`levenshtein_ratio`]: normalized edit distance
//!
//! All three case-fold and trim their inputs, and return 0.0 when either
//! input is empty. The scorer never uses one of them on its own: wherever a
//! string similarity is needed it takes the arithmetic mean
//! ([`string_similarity`]).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::utils::validation::{clamp_unit, count_to_f64};

/// A normalized similarity measure between two strings.
///
/// Returns a value between 0.0 (nothing in common) and 1.0 (identical).
pub trait SimilarityMeasure: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Stable name used in logs and result breakdowns
    fn name(&self) -> &'static str;
}

/// Ratcliff/Obershelp sequence alignment ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

/// Jaccard overlap of character sets
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardRatio;

/// Levenshtein distance normalized by the longer input
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl SimilarityMeasure for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        sequence_ratio(a, b)
    }

    fn name(&self) -> &'static str {
        "sequence"
    }
}

impl SimilarityMeasure for JaccardRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        jaccard_ratio(a, b)
    }

    fn name(&self) -> &'static str {
        "jaccard"
    }
}

impl SimilarityMeasure for LevenshteinRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        levenshtein_ratio(a, b)
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}

/// Every measure the engine knows about, in reporting order.
pub static MEASURES: [&dyn SimilarityMeasure; 3] =
    [&SequenceRatio, &JaccardRatio, &LevenshteinRatio];

/// Look up a measure by its [`SimilarityMeasure::name`].
#[must_use]
pub fn measure_by_name(name: &str) -> Option<&'static dyn SimilarityMeasure> {
    MEASURES.iter().copied().find(|m| m.name() == name)
}

/// Per-measure scores for one pair of strings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasureScores {
    pub sequence: f64,
    pub jaccard: f64,
    pub levenshtein: f64,
}

impl MeasureScores {
    #[must_use]
    pub fn compute(a: &str, b: &str) -> Self {
        Self {
            sequence: SequenceRatio.similarity(a, b),
            jaccard: JaccardRatio.similarity(a, b),
            levenshtein: LevenshteinRatio.similarity(a, b),
        }
    }

    /// Arithmetic mean of the three measures
    #[must_use]
    pub fn mean(&self) -> f64 {
        clamp_unit((self.sequence + self.jaccard + self.levenshtein) / 3.0)
    }
}

/// Mean of all registered measures.
///
/// # Examples
///
/// ```
/// use endpoint_resolver::matching::similarity::string_similarity;
///
/// assert_eq!(string_similarity("/api/users", "/API/users"), 1.0);
/// assert_eq!(string_similarity("", "/api/users"), 0.0);
/// ```
#[must_use]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let total: f64 = MEASURES.iter().map(|m| m.similarity(a, b)).sum();
    clamp_unit(total / count_to_f64(MEASURES.len()))
}

fn normalize(s: &str) -> Vec<char> {
    s.trim().to_lowercase().chars().collect()
}

/// Ratcliff/Obershelp ratio: `2 * M / (len(a) + len(b))`, where `M` counts
/// the characters covered by recursively chosen longest common blocks.
#[must_use]
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let matched = matching_characters(&a, &b);
    clamp_unit(2.0 * count_to_f64(matched) / count_to_f64(a.len() + b.len()))
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b_index.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_block(a, &b_index, (a_lo, a_hi), (b_lo, b_hi));
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }
    matched
}

/// Longest common block of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
/// Returns `(start_in_a, start_in_b, length)`.
fn longest_block(
    a: &[char],
    b_index: &HashMap<char, Vec<usize>>,
    (a_lo, a_hi): (usize, usize),
    (b_lo, b_hi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

    // run_len[j] = length of the common block ending at a[i - 1], b[j]
    let mut run_len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_run_len = HashMap::new();
        if let Some(positions) = b_index.get(c) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let previous = j
                    .checked_sub(1)
                    .and_then(|p| run_len.get(&p))
                    .copied()
                    .unwrap_or(0);
                let k = previous + 1;
                next_run_len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_len = next_run_len;
    }

    (best_i, best_j, best_size)
}

/// Jaccard similarity of the distinct case-folded characters.
#[must_use]
pub fn jaccard_ratio(a: &str, b: &str) -> f64 {
    let a: HashSet<char> = normalize(a).into_iter().collect();
    let b: HashSet<char> = normalize(b).into_iter().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    clamp_unit(count_to_f64(intersection) / count_to_f64(union))
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, lengths in characters.
#[must_use]
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let distance = strsim::levenshtein(&a, &b);
    let longest = a.chars().count().max(b.chars().count());
    clamp_unit(1.0 - count_to_f64(distance) / count_to_f64(longest))
}
