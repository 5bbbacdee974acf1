//! Centralized numeric validation and helper functions.
//!
//! Every score the engine produces passes through [`clamp_unit`], and every
//! configuration value supplied by a caller passes through one of the
//! sanitizers here before it is stored.

/// Default similarity threshold for declaring a match
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Default weight of base-URL similarity when base URLs differ
pub const DEFAULT_BASE_URL_WEIGHT: f64 = 0.6;

/// Default weight of raw query similarity when base URLs differ
pub const DEFAULT_PARAMS_WEIGHT: f64 = 0.4;

/// Convert a count to f64 for ratio calculations.
///
/// URL and query lengths are far below the f64 mantissa limit, so the
/// precision loss clippy warns about cannot occur in practice.
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Clamp a value into `[0, 1]`. NaN collapses to 0.0.
///
/// # Examples
///
/// ```
/// use endpoint_resolver::utils::validation::clamp_unit;
///
/// assert_eq!(clamp_unit(1.2), 1.0);
/// assert_eq!(clamp_unit(-0.3), 0.0);
/// assert_eq!(clamp_unit(f64::NAN), 0.0);
/// assert_eq!(clamp_unit(0.42), 0.42);
/// ```
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Sanitize a similarity threshold supplied by a caller.
///
/// Out-of-range values are clamped; NaN falls back to
/// [`DEFAULT_SIMILARITY_THRESHOLD`] since there is no nearest bound.
#[must_use]
pub fn sanitize_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        DEFAULT_SIMILARITY_THRESHOLD
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

/// Normalize a pair of weights so they sum to 1.0.
///
/// Negative, NaN and infinite weights count as zero. If nothing positive is
/// left, the default 0.6 / 0.4 split is returned.
///
/// # Examples
///
/// ```
/// use endpoint_resolver::utils::validation::normalize_weights;
///
/// assert_eq!(normalize_weights(3.0, 1.0), (0.75, 0.25));
/// assert_eq!(normalize_weights(0.0, 0.0), (0.6, 0.4));
/// assert_eq!(normalize_weights(-1.0, 2.0), (0.0, 1.0));
/// ```
#[must_use]
pub fn normalize_weights(base_weight: f64, params_weight: f64) -> (f64, f64) {
    let base = sanitize_weight(base_weight);
    let params = sanitize_weight(params_weight);
    let total = base + params;

    if total <= 0.0 || !total.is_finite() {
        return (DEFAULT_BASE_URL_WEIGHT, DEFAULT_PARAMS_WEIGHT);
    }

    (base / total, params / total)
}

/// True when [`normalize_weights`] has to discard or replace part of the
/// requested pair rather than just rescale it.
#[must_use]
pub fn weights_need_replacing(base_weight: f64, params_weight: f64) -> bool {
    !base_weight.is_finite()
        || !params_weight.is_finite()
        || base_weight < 0.0
        || params_weight < 0.0
        || base_weight + params_weight <= 0.0
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}
