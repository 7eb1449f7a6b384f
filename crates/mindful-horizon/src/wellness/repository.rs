use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentRecord, AssessmentType, ModuleCompletionSet, ModuleId, UserId};

/// Storage abstraction so the service can be exercised in isolation.
///
/// Implementations serialize writes per user; the service only ever reads a
/// consistent snapshot of a user's history.
pub trait AssessmentRepository: Send + Sync {
    /// Append a record. Rejects an exact duplicate (same type and timestamp).
    fn append(&self, user: &UserId, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn history(&self, user: &UserId) -> Result<Vec<AssessmentRecord>, RepositoryError>;
    fn completed_modules(&self, user: &UserId) -> Result<ModuleCompletionSet, RepositoryError>;
    /// Returns `true` when the module was newly completed.
    fn record_completion(&self, user: &UserId, module: ModuleId) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("assessment already recorded")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for module completions (points, badges, streaks).
pub trait CompletionPublisher: Send + Sync {
    fn publish(&self, event: ModuleCompletedEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCompletedEvent {
    pub user_id: UserId,
    pub module_id: ModuleId,
    pub module_name: String,
    pub completed_at: DateTime<Utc>,
    pub total_completed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("completion event transport unavailable: {0}")]
    Transport(String),
}

/// Inbound assessment as received from a client, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub assessment_type: String,
    pub raw_score: f64,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub crisis_indicator: bool,
}

/// Stored assessment as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub user_id: UserId,
    pub assessment_type: AssessmentType,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub taken_at: DateTime<Utc>,
    pub crisis_indicator: bool,
}

impl AssessmentView {
    pub(crate) fn from_record(user_id: UserId, record: &AssessmentRecord) -> Self {
        Self {
            user_id,
            assessment_type: record.assessment_type(),
            raw_score: record.raw_score(),
            normalized_score: record
                .assessment_type()
                .normalize_checked(record.raw_score()),
            taken_at: record.taken_at(),
            crisis_indicator: record.crisis_indicator(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellnessView {
    pub user_id: UserId,
    pub as_of: DateTime<Utc>,
    pub wellness_score: f64,
    pub records_in_window: usize,
    pub window_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionView {
    pub user_id: UserId,
    pub module_id: ModuleId,
    pub module_name: &'static str,
    pub newly_completed: bool,
    pub total_completed: usize,
}
