//! Core data types for URL resolution.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`UrlComponents`](components::UrlComponents): A URL split into scheme, host, path and query
//! - [`QueryParams`](components::QueryParams): Ordered multi-valued query parameters
//! - [`VolatileKeyRules`](volatile::VolatileKeyRules): Patterns for keys whose values churn
//! - [`ScoringRegime`](types::ScoringRegime), [`Confidence`](types::Confidence): Result classification types
//!
//! ## Base URLs
//!
//! Two URLs share a base when scheme, host (including any port) and path are
//! identical. Fragments are dropped and the query string is kept separately:
//!
//! | URL | Base URL |
//! |-----|----------|
//! | `https://a.example/x?q=1` | `https://a.example/x` |
//! | `http://a.example:8080/x#top` | `http://a.example:8080/x` |
//! | `not a url` | *(empty)* |

pub mod components;
pub mod types;
pub mod volatile;
