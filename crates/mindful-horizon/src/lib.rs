//! Wellness scoring and intervention recommendation for MindFullHorizon.
//!
//! The [`wellness`] module holds the pure scoring pipeline (normalizer,
//! recency-weighted aggregator, recommendation rule engine) together with the
//! service, HTTP router and history importer that feed it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod wellness;
