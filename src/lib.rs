//! # endpoint-resolver
//!
//! A library for resolving captured HTTP request URLs against a registry of
//! known endpoint templates.
//!
//! Replaying recorded traffic rarely reproduces the exact URL of the original
//! capture. Session identifiers, nonces, timestamps and tracking parameters
//! change on every request, so a literal lookup misses. `endpoint-resolver`
//! scores each candidate template against the target with a composite of
//! string similarity measures and query parameter semantics, and picks the
//! best candidate that clears a configurable threshold.
//!
//! ## Features
//!
//! - **Structural decomposition**: Splits URLs into scheme, host, path and query
//! - **Volatile key detection**: Ignores churning keys like `sessionId` or `utm_source`
//! - **Value weighting**: Long, token-rich parameter values count for more
//! - **Tunable scoring**: Threshold and base/query weights, clamped and normalized
//! - **Ranking**: Best match or an ordered list of all matches
//!
//! ## Example
//!
//! ```rust
//! use endpoint_resolver::Resolver;
//!
//! let resolver = Resolver::new();
//! let candidates = [
//!     "https://bank.example/api/balance?sessionId=BBB&acct=CON",
//!     "https://bank.example/api/balance?sessionId=CCC&acct=SAV",
//! ];
//!
//! let best = resolver
//!     .find_best_match("https://bank.example/api/balance?sessionId=AAA&acct=CON", &candidates)
//!     .unwrap();
//!
//! assert_eq!(best.index, 0);
//! assert!(best.result.base_exact_match);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: URL decomposition, volatile key rules and result classification
//! - [`matching`]: Similarity measures, composite scoring and the resolver
//! - [`config`]: JSON settings for building a resolver
//! - [`utils`]: Numeric validation helpers

pub mod config;
pub mod core;
pub mod matching;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::config::{ConfigError, ResolverSettings};
pub use crate::core::components::{decompose, QueryParams, UrlComponents};
pub use crate::core::types::*;
pub use crate::core::volatile::{RuleError, VolatileKeyRules};
pub use crate::matching::engine::{BestMatch, MatcherConfig, Resolver};
pub use crate::matching::scoring::{MatchDetail, SimilarityResult};
pub use crate::matching::similarity::{string_similarity, MeasureScores};
