//! Assessment intake, wellness scoring, and intervention recommendation.
//!
//! `scoring` and `recommendation` are pure and hold no state; they can be
//! called from any number of request handlers at once. The service layer adds
//! persistence through [`AssessmentRepository`], gamification hooks through
//! [`CompletionPublisher`], and a freshness-keyed recommendation cache.

mod cache;
pub mod domain;
pub mod import;
pub mod recommendation;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentRecord, AssessmentType, LatestScores, ModuleCompletionSet, ModuleId, UserId,
};
pub use import::{AssessmentHistoryImporter, HistoryImportError};
pub use recommendation::{
    recommend, validate_sequence, InterventionModule, Priority, Recommendation,
    RecommendationEngine, RecommendationThresholds, ThresholdError,
};
pub use report::{build_report, WellnessReport, WellnessTrend};
pub use repository::{
    AssessmentRepository, AssessmentSubmission, AssessmentView, CompletionPublisher,
    CompletionView, ModuleCompletedEvent, PublishError, RepositoryError, WellnessView,
};
pub use router::wellness_router;
pub use scoring::{
    aggregate, aggregate_window, normalize, ScoringError, WindowedScore, DEFAULT_WINDOW_DAYS,
    NEUTRAL_WELLNESS_SCORE,
};
pub use service::{WellnessService, WellnessServiceError};
