use serde::{Deserialize, Serialize};

/// Which composite formula produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRegime {
    /// Identical base URLs, neither side has a query string
    ExactBaseNoQuery,
    /// Identical base URLs, query parameters compared semantically
    ExactBase,
    /// Different base URLs, weighted blend of string similarities
    Blended,
}

impl std::fmt::Display for ScoringRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactBaseNoQuery => write!(f, "exact base, no query"),
            Self::ExactBase => write!(f, "exact base"),
            Self::Blended => write!(f, "blended"),
        }
    }
}

/// Confidence level for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Self::Exact
        } else if score >= 0.85 {
            Self::High
        } else if score >= 0.60 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
