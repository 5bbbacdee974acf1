//! Classification of query keys whose values churn between identical requests.
//!
//! A key is volatile when any rule matches it; there is no partial
//! classification. The default rule set is compiled once per process and
//! shared through an [`Arc`]; callers that need different rules build their
//! own with [`VolatileKeyRules::from_patterns`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::core::components::QueryParams;

/// Default volatile-key patterns, in evaluation order.
pub const DEFAULT_VOLATILE_PATTERNS: &[&str] = &[
    r"(?i)session",
    r"(?i)nonce",
    r"(?i)random",
    r"(?i)timestamp",
    // short tokens only count as whole words: `ts`, `x-ts`, `time`, `sid`
    r"(?i)(?:^|[^a-z0-9])(?:sid|ts|rand|time)(?:$|[^a-z0-9])",
    // camelCase segments: `reqTs`, `requestTime`, `userSid`, `userSID`, `requestTS`
    r"[a-z0-9](?:Sid|Ts|Rand|Time)(?:$|[^a-z0-9])",
    r"[a-z0-9](?:SID|TS|RAND|TIME)(?:$|[^A-Za-z0-9])",
    // session id spellings: `PHPSESSID`, `sessid`, `jsid`
    r"(?i)sess_?id",
    r"(?i)sid$",
    // request clocks written as one word: `reqtime`, `clientts`
    r"(?i)(?:req|request|client|server|sent|now)_?(?:time|ts)$",
    r"(?i)^utm_",
    r"(?i)cache_?bust",
];

static DEFAULT_RULES: Lazy<Arc<VolatileKeyRules>> = Lazy::new(|| {
    Arc::new(
        VolatileKeyRules::from_patterns(DEFAULT_VOLATILE_PATTERNS)
            .expect("default volatile key patterns are valid regexes"),
    )
});

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid volatile key pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Ordered set of regular expressions marking query keys as volatile
#[derive(Debug, Clone)]
pub struct VolatileKeyRules {
    rules: Vec<Regex>,
}

impl VolatileKeyRules {
    /// Compile a rule set from pattern strings.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidPattern` naming the first pattern that does
    /// not compile.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// The process-wide default rule set
    #[must_use]
    pub fn shared_default() -> Arc<Self> {
        Arc::clone(&*DEFAULT_RULES)
    }

    #[must_use]
    pub fn is_volatile(&self, key: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(key))
    }

    /// Keys of `params` that no rule marks volatile, in query order
    #[must_use]
    pub fn stable_keys<'a>(&self, params: &'a QueryParams) -> Vec<&'a str> {
        params.keys().filter(|key| !self.is_volatile(key)).collect()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Regex::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for VolatileKeyRules {
    fn default() -> Self {
        (**DEFAULT_RULES).clone()
    }
}

/// Classify `key` against the default rule set.
///
/// # Examples
///
/// ```
/// use endpoint_resolver::core::volatile::is_volatile;
///
/// assert!(is_volatile("sessionId"));
/// assert!(is_volatile("utm_source"));
/// assert!(!is_volatile("acct"));
/// ```
#[must_use]
pub fn is_volatile(key: &str) -> bool {
    DEFAULT_RULES.is_volatile(key)
}
