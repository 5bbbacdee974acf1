use std::collections::HashSet;

use serde::Serialize;

use crate::core::components::{decompose, QueryParams, UrlComponents};
use crate::core::types::{Confidence, ScoringRegime};
use crate::core::volatile::VolatileKeyRules;
use crate::matching::engine::MatcherConfig;
use crate::matching::similarity::MeasureScores;
use crate::utils::validation::{clamp_unit, count_to_f64};

/// Score for identical base URLs when neither side carries a query
pub const EXACT_BASE_NO_QUERY_SCORE: f64 = 0.9;

// Exact-base regime: floor + stable key overlap + value agreement + raw query
const EXACT_BASE_FLOOR: f64 = 0.2;
const KEY_OVERLAP_WEIGHT: f64 = 0.4;
const VALUE_MATCH_WEIGHT: f64 = 0.4;
const RAW_QUERY_WEIGHT: f64 = 0.2;
const LENGTH_DISPARITY_PENALTY: f64 = 0.15;

/// Value length at which the length term of a key weight saturates
const VALUE_LENGTH_SCALE: f64 = 20.0;
/// Token count at which the token term of a key weight saturates
const VALUE_TOKEN_SCALE: f64 = 10.0;

/// Sub-scores behind a [`SimilarityResult`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
    /// Per-measure scores of the base URLs
    pub base: MeasureScores,

    /// Per-measure scores of the raw query strings
    pub query: MeasureScores,

    /// Per-measure scores of the full URLs
    pub full: MeasureScores,

    /// Jaccard overlap of the stable (non-volatile) query keys
    pub key_overlap: f64,

    /// Weighted fraction of shared stable keys whose values agree
    pub value_match: f64,

    /// Penalty subtracted for query length disparity (exact-base regime only)
    pub length_penalty: f64,

    pub regime: ScoringRegime,
}

/// Similarity between two URLs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    /// Mean string similarity of the base URLs
    pub base_similarity: f64,

    /// Mean string similarity of the raw query strings
    pub query_similarity: f64,

    /// Mean string similarity of the full URLs (reported only)
    pub full_similarity: f64,

    /// Base URLs are non-empty and byte-for-byte equal
    pub base_exact_match: bool,

    /// Score used for the match decision
    pub composite_score: f64,

    /// `composite_score >= similarity_threshold`
    pub is_match: bool,

    /// Confidence level derived from the composite score
    pub confidence: Confidence,

    pub detail: MatchDetail,
}

impl SimilarityResult {
    /// Compare two URLs under `config`, treating keys matched by `rules` as
    /// volatile.
    #[must_use]
    pub fn calculate(
        url_a: &str,
        url_b: &str,
        config: &MatcherConfig,
        rules: &VolatileKeyRules,
    ) -> Self {
        let config = config.normalized();
        let a = decompose(url_a);
        let b = decompose(url_b);

        let base_scores = MeasureScores::compute(&a.base_url, &b.base_url);
        let query_scores = MeasureScores::compute(&a.query_raw, &b.query_raw);
        let full_scores = MeasureScores::compute(url_a, url_b);

        let base_similarity = base_scores.mean();
        let query_similarity = query_scores.mean();
        let full_similarity = full_scores.mean();

        let base_exact_match = !a.base_url.is_empty() && a.base_url == b.base_url;

        let agreement = compare_params(&a.query_params, &b.query_params, rules);

        let (regime, length_penalty, composite) = if base_exact_match
            && a.has_empty_query()
            && b.has_empty_query()
        {
            (ScoringRegime::ExactBaseNoQuery, 0.0, EXACT_BASE_NO_QUERY_SCORE)
        } else if base_exact_match {
            let penalty = length_penalty(&a, &b);
            let composite = EXACT_BASE_FLOOR
                + KEY_OVERLAP_WEIGHT * agreement.key_overlap
                + VALUE_MATCH_WEIGHT * agreement.value_match
                + RAW_QUERY_WEIGHT * query_similarity
                - penalty;
            (ScoringRegime::ExactBase, penalty, composite)
        } else {
            let composite =
                base_similarity * config.base_url_weight + query_similarity * config.params_weight;
            (ScoringRegime::Blended, 0.0, composite)
        };

        let composite_score = clamp_unit(composite);
        let is_match = composite_score >= config.similarity_threshold;

        Self {
            base_similarity,
            query_similarity,
            full_similarity,
            base_exact_match,
            composite_score,
            is_match,
            confidence: Confidence::from_score(composite_score),
            detail: MatchDetail {
                base: base_scores,
                query: query_scores,
                full: full_scores,
                key_overlap: agreement.key_overlap,
                value_match: agreement.value_match,
                length_penalty,
                regime,
            },
        }
    }
}

/// Semantic agreement of two query parameter sets
#[derive(Debug, Clone, Copy, PartialEq)]
struct ParamAgreement {
    key_overlap: f64,
    value_match: f64,
}

/// Compare the stable keys of two parameter sets.
///
/// Both scores fall back to 1.0 when neither side has any parsed parameter,
/// and to 0.0 when only volatile or unshared keys exist.
fn compare_params(
    params_a: &QueryParams,
    params_b: &QueryParams,
    rules: &VolatileKeyRules,
) -> ParamAgreement {
    let fallback = if params_a.is_empty() && params_b.is_empty() {
        1.0
    } else {
        0.0
    };

    let stable_a = rules.stable_keys(params_a);
    let stable_b: HashSet<&str> = rules.stable_keys(params_b).into_iter().collect();

    // Shared keys in the order they appear in `params_a`
    let shared: Vec<&str> = stable_a
        .iter()
        .copied()
        .filter(|key| stable_b.contains(key))
        .collect();
    let union = stable_a.len() + stable_b.len() - shared.len();

    let key_overlap = if union == 0 {
        fallback
    } else {
        count_to_f64(shared.len()) / count_to_f64(union)
    };

    if shared.is_empty() {
        return ParamAgreement {
            key_overlap,
            value_match: fallback,
        };
    }

    let mut equal_weight = 0.0;
    let mut total_weight = 0.0;
    for key in shared {
        let values_a = params_a.get(key).unwrap_or_default();
        let values_b = params_b.get(key).unwrap_or_default();

        let weight = complexity_weight(values_a).max(complexity_weight(values_b));
        total_weight += weight;
        if sorted_values(values_a) == sorted_values(values_b) {
            equal_weight += weight;
        }
    }

    ParamAgreement {
        key_overlap,
        value_match: clamp_unit(equal_weight / total_weight),
    }
}

/// Heuristic weight of one side's values for a key.
///
/// `1 + min(1, longest_value / 20) + min(1, alphanumeric_runs / 10)`: long,
/// multi-token values are treated as more identifying than short flags.
fn complexity_weight(values: &[String]) -> f64 {
    let longest = values.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let tokens: usize = values.iter().map(|v| alphanumeric_runs(v)).sum();

    1.0 + (count_to_f64(longest) / VALUE_LENGTH_SCALE).min(1.0)
        + (count_to_f64(tokens) / VALUE_TOKEN_SCALE).min(1.0)
}

fn alphanumeric_runs(value: &str) -> usize {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .count()
}

fn sorted_values(values: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

/// `0.15 * |len_a - len_b| / max(len_a, len_b)` over raw query lengths;
/// zero when either query is empty.
fn length_penalty(a: &UrlComponents, b: &UrlComponents) -> f64 {
    let len_a = a.query_raw.chars().count();
    let len_b = b.query_raw.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    LENGTH_DISPARITY_PENALTY * count_to_f64(len_a.abs_diff(len_b)) / count_to_f64(len_a.max(len_b))
}
