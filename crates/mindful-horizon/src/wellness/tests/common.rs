use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::config::WellnessConfig;
use crate::wellness::domain::{
    AssessmentRecord, AssessmentType, LatestScores, ModuleCompletionSet, ModuleId, UserId,
};
use crate::wellness::repository::{
    AssessmentRepository, AssessmentSubmission, CompletionPublisher, ModuleCompletedEvent,
    PublishError, RepositoryError,
};
use crate::wellness::{wellness_router, WellnessService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn user() -> UserId {
    UserId("student-42".to_string())
}

pub(super) fn record(kind: AssessmentType, raw: f64, days: i64) -> AssessmentRecord {
    AssessmentRecord::new(kind, raw, days_ago(days)).expect("valid record")
}

pub(super) fn latest(entries: &[(AssessmentType, f64)]) -> LatestScores {
    entries
        .iter()
        .fold(LatestScores::new(), |scores, (kind, raw)| {
            scores.with(*kind, *raw)
        })
}

pub(super) fn submission(assessment_type: &str, raw_score: f64, days: i64) -> AssessmentSubmission {
    AssessmentSubmission {
        assessment_type: assessment_type.to_string(),
        raw_score,
        taken_at: Some(days_ago(days)),
        crisis_indicator: false,
    }
}

pub(super) fn wellness_config() -> WellnessConfig {
    WellnessConfig::default()
}

pub(super) fn build_service() -> (
    WellnessService<MemoryRepository, MemoryPublisher>,
    Arc<MemoryRepository>,
    Arc<MemoryPublisher>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let publisher = Arc::new(MemoryPublisher::default());
    let service = WellnessService::new(repository.clone(), publisher.clone(), wellness_config());
    (service, repository, publisher)
}

pub(super) fn router_with_service(
    service: WellnessService<MemoryRepository, MemoryPublisher>,
) -> axum::Router {
    wellness_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    history: Mutex<HashMap<UserId, Vec<AssessmentRecord>>>,
    completions: Mutex<HashMap<UserId, ModuleCompletionSet>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, user: &UserId, records: Vec<AssessmentRecord>) {
        self.history
            .lock()
            .expect("history mutex poisoned")
            .entry(user.clone())
            .or_default()
            .extend(records);
    }
}

impl AssessmentRepository for MemoryRepository {
    fn append(&self, user: &UserId, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.history.lock().expect("history mutex poisoned");
        let entries = guard.entry(user.clone()).or_default();
        let duplicate = entries.iter().any(|existing| {
            existing.assessment_type() == record.assessment_type()
                && existing.taken_at() == record.taken_at()
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        entries.push(record);
        Ok(())
    }

    fn history(&self, user: &UserId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.history.lock().expect("history mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    fn completed_modules(&self, user: &UserId) -> Result<ModuleCompletionSet, RepositoryError> {
        let guard = self.completions.lock().expect("completion mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    fn record_completion(&self, user: &UserId, module: ModuleId) -> Result<bool, RepositoryError> {
        let mut guard = self.completions.lock().expect("completion mutex poisoned");
        Ok(guard.entry(user.clone()).or_default().insert(module))
    }
}

#[derive(Default)]
pub(super) struct MemoryPublisher {
    events: Mutex<Vec<ModuleCompletedEvent>>,
}

impl MemoryPublisher {
    pub(super) fn events(&self) -> Vec<ModuleCompletedEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

impl CompletionPublisher for MemoryPublisher {
    fn publish(&self, event: ModuleCompletedEvent) -> Result<(), PublishError> {
        self.events
            .lock()
            .expect("publisher mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Fails the first `outages` publishes, then delivers like [`MemoryPublisher`].
pub(super) struct FlakyPublisher {
    outages: Mutex<usize>,
    delivered: MemoryPublisher,
}

impl FlakyPublisher {
    pub(super) fn failing(outages: usize) -> Self {
        Self {
            outages: Mutex::new(outages),
            delivered: MemoryPublisher::default(),
        }
    }

    pub(super) fn events(&self) -> Vec<ModuleCompletedEvent> {
        self.delivered.events()
    }
}

impl CompletionPublisher for FlakyPublisher {
    fn publish(&self, event: ModuleCompletedEvent) -> Result<(), PublishError> {
        let mut outages = self.outages.lock().expect("publisher mutex poisoned");
        if *outages > 0 {
            *outages -= 1;
            return Err(PublishError::Transport("broker restarting".to_string()));
        }
        drop(outages);
        self.delivered.publish(event)
    }
}

pub(super) struct OfflinePublisher;

impl CompletionPublisher for OfflinePublisher {
    fn publish(&self, _event: ModuleCompletedEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("queue offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn append(&self, _user: &UserId, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _user: &UserId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn completed_modules(&self, _user: &UserId) -> Result<ModuleCompletionSet, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_completion(&self, _user: &UserId, _module: ModuleId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
