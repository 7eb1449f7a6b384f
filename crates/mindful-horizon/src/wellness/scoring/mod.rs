//! Score normalization and recency-weighted aggregation.
//!
//! Every instrument is mapped onto a common 0-10 wellness scale where higher
//! means better. Aggregation is a pure projection over an immutable snapshot
//! of a user's history; nothing here is stored.

mod aggregator;
mod normalizer;

pub use aggregator::{aggregate, aggregate_window, WindowedScore};
pub use normalizer::normalize;

use super::domain::AssessmentType;

/// Trailing window, in days, used when no override is configured.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Score reported when no record falls inside the window. This is "no data",
/// not "invalid data", and is returned deliberately rather than as an error.
pub const NEUTRAL_WELLNESS_SCORE: f64 = 5.0;

/// Lower and upper bound of the common wellness scale.
pub const WELLNESS_SCALE: (f64, f64) = (0.0, 10.0);

/// Boundary validation errors for raw assessment input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{assessment_type} score {raw_score} is outside the valid range {min}-{max}")]
    InvalidScoreRange {
        assessment_type: AssessmentType,
        raw_score: f64,
        min: f64,
        max: f64,
    },
    #[error("unknown assessment type '{0}'")]
    UnknownAssessmentType(String),
}

impl ScoringError {
    /// Name of the request field that carried the rejected value.
    pub const fn field(&self) -> &'static str {
        match self {
            ScoringError::InvalidScoreRange { .. } => "raw_score",
            ScoringError::UnknownAssessmentType(_) => "assessment_type",
        }
    }
}
