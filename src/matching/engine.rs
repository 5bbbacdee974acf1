use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::volatile::VolatileKeyRules;
use crate::matching::scoring::SimilarityResult;
use crate::utils::validation::{
    normalize_weights, sanitize_threshold, weights_need_replacing, DEFAULT_BASE_URL_WEIGHT,
    DEFAULT_PARAMS_WEIGHT, DEFAULT_SIMILARITY_THRESHOLD,
};

/// Thresholds and weights used by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum composite score for a match
    pub similarity_threshold: f64,
    /// Weight of base-URL similarity when base URLs differ
    pub base_url_weight: f64,
    /// Weight of raw query similarity when base URLs differ
    pub params_weight: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD, // 60%
            base_url_weight: DEFAULT_BASE_URL_WEIGHT,           // 60%
            params_weight: DEFAULT_PARAMS_WEIGHT,               // 40%
        }
    }
}

impl MatcherConfig {
    /// Clamp the threshold into `[0, 1]` and normalize weights to sum to 1.0
    #[must_use]
    pub fn normalized(&self) -> Self {
        let (base_url_weight, params_weight) =
            normalize_weights(self.base_url_weight, self.params_weight);

        Self {
            similarity_threshold: sanitize_threshold(self.similarity_threshold),
            base_url_weight,
            params_weight,
        }
    }

    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = sanitize_threshold(threshold);
        self
    }

    #[must_use]
    pub fn with_weights(mut self, base_url_weight: f64, params_weight: f64) -> Self {
        (self.base_url_weight, self.params_weight) =
            normalize_weights(base_url_weight, params_weight);
        self
    }
}

/// The best candidate found for a target URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMatch {
    /// The candidate URL, as supplied
    pub url: String,

    /// Position of the candidate in the input list
    pub index: usize,

    pub result: SimilarityResult,
}

/// Resolves captured URLs against candidate template URLs.
///
/// A resolver owns its [`MatcherConfig`] and shares a read-only
/// [`VolatileKeyRules`]. Cloning is cheap. The `with_*` methods consume the
/// resolver and return an updated one, so a resolver shared between threads
/// can be reconfigured without locking by building a new one.
#[derive(Debug, Clone)]
pub struct Resolver {
    config: MatcherConfig,
    rules: Arc<VolatileKeyRules>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Create a resolver with the default configuration and rule set
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MatcherConfig::default(),
            rules: VolatileKeyRules::shared_default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    #[must_use]
    pub fn rules(&self) -> &VolatileKeyRules {
        &self.rules
    }

    /// Set the match threshold, clamped to `[0, 1]`
    pub fn set_similarity_threshold(&mut self, threshold: f64) {
        let sanitized = sanitize_threshold(threshold);
        if sanitized != threshold {
            warn!(
                requested = threshold,
                applied = sanitized,
                "similarity threshold outside [0, 1]"
            );
        }
        self.config.similarity_threshold = sanitized;
    }

    /// Set the blended-regime weights, normalized to sum to 1.0
    pub fn set_weights(&mut self, base_url_weight: f64, params_weight: f64) {
        let (base, params) = normalize_weights(base_url_weight, params_weight);
        if weights_need_replacing(base_url_weight, params_weight) {
            warn!(
                requested_base = base_url_weight,
                requested_params = params_weight,
                applied_base = base,
                applied_params = params,
                "invalid scoring weights replaced"
            );
        }
        self.config.base_url_weight = base;
        self.config.params_weight = params;
    }

    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.set_similarity_threshold(threshold);
        self
    }

    #[must_use]
    pub fn with_weights(mut self, base_url_weight: f64, params_weight: f64) -> Self {
        self.set_weights(base_url_weight, params_weight);
        self
    }

    /// Replace the whole configuration; values are normalized on the way in
    #[must_use]
    pub fn with_config(mut self, config: MatcherConfig) -> Self {
        let normalized = config.normalized();
        if normalized != config {
            warn!(?config, ?normalized, "matcher configuration normalized");
        }
        self.config = normalized;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: Arc<VolatileKeyRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Compare two URLs
    #[must_use]
    pub fn score(&self, url_a: &str, url_b: &str) -> SimilarityResult {
        SimilarityResult::calculate(url_a, url_b, &self.config, &self.rules)
    }

    /// Find the best-scoring candidate for `target`.
    ///
    /// Every candidate is scored. The first candidate holding the maximum
    /// composite score wins ties. Returns `None` when the list is empty or
    /// the best score is below the threshold.
    pub fn find_best_match<S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &[S],
    ) -> Option<BestMatch> {
        let mut best: Option<(usize, SimilarityResult)> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let result = self.score(target, candidate.as_ref());
            trace!(
                candidate = candidate.as_ref(),
                score = result.composite_score,
                regime = %result.detail.regime,
                "scored candidate"
            );

            let improves = best
                .as_ref()
                .map_or(true, |(_, current)| result.composite_score > current.composite_score);
            if improves {
                best = Some((index, result));
            }
        }

        let (index, result) = best?;
        let url = candidates[index].as_ref().to_string();

        if !result.is_match {
            debug!(
                target_url = target,
                best = url.as_str(),
                score = result.composite_score,
                threshold = self.config.similarity_threshold,
                "no candidate reached the threshold"
            );
            return None;
        }

        debug!(
            target_url = target,
            matched = url.as_str(),
            score = result.composite_score,
            candidates = candidates.len(),
            "resolved target"
        );
        Some(BestMatch { url, index, result })
    }

    /// Resolve `target` against a template registry's URLs.
    ///
    /// Same as [`Resolver::find_best_match`].
    pub fn resolve<S: AsRef<str>>(&self, target: &str, candidates: &[S]) -> Option<BestMatch> {
        self.find_best_match(target, candidates)
    }

    /// All candidates at or above the threshold, best first, at most `limit`.
    ///
    /// Candidates with equal scores keep their input order.
    pub fn rank_matches<S: AsRef<str>>(
        &self,
        target: &str,
        candidates: &[S],
        limit: usize,
    ) -> Vec<BestMatch> {
        let mut results: Vec<BestMatch> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| BestMatch {
                url: candidate.as_ref().to_string(),
                index,
                result: self.score(target, candidate.as_ref()),
            })
            .filter(|m| m.result.is_match)
            .collect();

        // Sort by composite score descending; sort_by is stable
        results.sort_by(|a, b| {
            b.result
                .composite_score
                .partial_cmp(&a.result.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results.truncate(limit);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://bank.example/api/balance?sessionId=AAA&acct=CON";

    #[test]
    fn test_default_config() {
        let config = MatcherConfig::default();
        assert!((config.similarity_threshold - 0.6).abs() < f64::EPSILON);
        assert!((config.base_url_weight - 0.6).abs() < f64::EPSILON);
        assert!((config.params_weight - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.normalized(), config);
    }

    #[test]
    fn test_config_normalized() {
        let config = MatcherConfig {
            similarity_threshold: 3.0,
            base_url_weight: 1.0,
            params_weight: 3.0,
        }
        .normalized();
        assert!((config.similarity_threshold - 1.0).abs() < f64::EPSILON);
        assert!((config.base_url_weight - 0.25).abs() < f64::EPSILON);
        assert!((config.params_weight - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_best_match_bank_scenario() {
        let resolver = Resolver::new();
        let candidates = [
            "https://other.example/feed",
            "https://bank.example/api/balance?sessionId=ZZZ&acct=CON",
        ];

        let best = resolver.find_best_match(TARGET, &candidates).unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.url, candidates[1]);
        assert!(best.result.base_exact_match);
        assert!((best.result.detail.key_overlap - 1.0).abs() < 1e-9);
        assert!((best.result.detail.value_match - 1.0).abs() < 1e-9);
        assert!(best.result.composite_score >= 0.9);
        assert!(best.result.is_match);
    }

    #[test]
    fn test_find_best_match_none_below_threshold() {
        let resolver = Resolver::new();
        assert!(resolver
            .find_best_match(TARGET, &["https://other.example/feed"])
            .is_none());
    }

    #[test]
    fn test_find_best_match_empty_candidates() {
        let resolver = Resolver::new();
        let candidates: Vec<String> = Vec::new();
        assert!(resolver.find_best_match(TARGET, &candidates).is_none());
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        let resolver = Resolver::new();
        let candidates = vec![
            "https://a.example/x?sessionId=2&q=v".to_string(),
            "https://a.example/x?sessionId=3&q=v".to_string(),
        ];
        let target = "https://a.example/x?sessionId=1&q=v";

        let first = resolver.score(target, &candidates[0]);
        let second = resolver.score(target, &candidates[1]);
        assert!((first.composite_score - second.composite_score).abs() < f64::EPSILON);

        let best = resolver.find_best_match(target, &candidates).unwrap();
        assert_eq!(best.index, 0);
    }

    #[test]
    fn test_later_candidate_can_win() {
        let resolver = Resolver::new();
        let candidates = [
            "https://bank.example/api/balance?acct=SAV",
            "https://bank.example/api/balance?sessionId=ZZZ&acct=CON",
        ];
        let best = resolver.find_best_match(TARGET, &candidates).unwrap();
        assert_eq!(best.index, 1);
    }

    #[test]
    fn test_resolve_matches_find_best_match() {
        let resolver = Resolver::new();
        let candidates = ["https://bank.example/api/balance?sessionId=ZZZ&acct=CON"];
        assert_eq!(
            resolver.resolve(TARGET, &candidates),
            resolver.find_best_match(TARGET, &candidates)
        );
    }

    #[test]
    fn test_set_similarity_threshold_clamps() {
        let mut resolver = Resolver::new();
        resolver.set_similarity_threshold(1.7);
        assert!((resolver.config().similarity_threshold - 1.0).abs() < f64::EPSILON);
        resolver.set_similarity_threshold(-0.5);
        assert!(resolver.config().similarity_threshold.abs() < f64::EPSILON);
        resolver.set_similarity_threshold(0.75);
        resolver.set_similarity_threshold(0.75);
        assert!((resolver.config().similarity_threshold - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_weights_normalizes() {
        let mut resolver = Resolver::new();
        resolver.set_weights(3.0, 1.0);
        assert!((resolver.config().base_url_weight - 0.75).abs() < f64::EPSILON);
        assert!((resolver.config().params_weight - 0.25).abs() < f64::EPSILON);

        resolver.set_weights(0.0, -2.0);
        assert!((resolver.config().base_url_weight - 0.6).abs() < f64::EPSILON);
        assert!((resolver.config().params_weight - 0.4).abs() < f64::EPSILON);

        // an infinite weight is discarded, not treated as dominant
        resolver.set_weights(f64::INFINITY, 1.0);
        assert!(resolver.config().base_url_weight.abs() < f64::EPSILON);
        assert!((resolver.config().params_weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_methods_leave_original_untouched() {
        let original = Resolver::new();
        let strict = original.clone().with_similarity_threshold(0.95);
        assert!((original.config().similarity_threshold - 0.6).abs() < f64::EPSILON);
        assert!((strict.config().similarity_threshold - 0.95).abs() < f64::EPSILON);

        let url = "https://api.example/v1/items";
        assert!(original.score(url, url).is_match);
        assert!(!strict.score(url, url).is_match);
    }

    #[test]
    fn test_with_rules_changes_volatility() {
        let rules = Arc::new(VolatileKeyRules::from_patterns(["^acct$"]).unwrap());
        let resolver = Resolver::new().with_rules(rules);
        let result = resolver.score(
            "https://bank.example/api/balance?acct=A&sessionId=X",
            "https://bank.example/api/balance?acct=B&sessionId=X",
        );
        // sessionId is stable and agrees, acct is ignored
        assert!((result.detail.key_overlap - 1.0).abs() < 1e-9);
        assert!((result.detail.value_match - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_matches_orders_and_limits() {
        let resolver = Resolver::new();
        let candidates = [
            "https://other.example/feed",
            "https://bank.example/api/balance?acct=SAV",
            "https://bank.example/api/balance?sessionId=ZZZ&acct=CON",
            "https://bank.example/api/balance?sessionId=YYY&acct=CON",
        ];

        let ranked = resolver.rank_matches(TARGET, &candidates, 10);
        assert!(ranked.iter().all(|m| m.result.is_match));
        assert!(ranked
            .windows(2)
            .all(|w| w[0].result.composite_score >= w[1].result.composite_score));
        assert_eq!(ranked[0].index, 2);
        assert_eq!(ranked[1].index, 3);
        assert!(ranked.iter().all(|m| m.index != 0));

        let limited = resolver.rank_matches(TARGET, &candidates, 1);
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].index, 2);
    }

    #[test]
    fn test_resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Resolver>();
    }
}
