//! URL matching engine and scoring algorithms.
//!
//! This module provides the core matching functionality:
//!
//! - [`Resolver`](engine::Resolver): Main entry point for resolving a target URL
//! - [`SimilarityResult`](scoring::SimilarityResult): Detailed similarity scores between two URLs
//! - [`similarity`]: The string similarity measures the scores are built from
//!
//! ## Scoring
//!
//! Each string comparison averages three measures: a Ratcliff/Obershelp
//! sequence ratio, a Jaccard ratio over character sets and a normalized
//! Levenshtein ratio. The composite score then depends on the base URLs:
//!
//! 1. **Same base, no query on either side**: a fixed 0.9
//! 2. **Same base**: 0.2 plus stable key overlap (0.4), weighted value
//!    agreement (0.4) and raw query similarity (0.2), minus a length penalty
//! 3. **Different base**: base similarity and query similarity blended by the
//!    configured weights
//!
//! ## Example
//!
//! ```rust
//! use endpoint_resolver::{MatcherConfig, Resolver};
//!
//! let resolver = Resolver::new().with_config(MatcherConfig::default().with_similarity_threshold(0.8));
//!
//! let result = resolver.score(
//!     "https://shop.example/cart?id=42&nonce=abc",
//!     "https://shop.example/cart?id=42&nonce=xyz",
//! );
//! assert!(result.is_match);
//! assert!(result.composite_score >= 0.85);
//! ```

pub mod engine;
pub mod scoring;
pub mod similarity;
