use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use mindful_horizon::wellness::{
    AssessmentRecord, AssessmentRepository, CompletionPublisher, ModuleCompletedEvent,
    ModuleCompletionSet, ModuleId, PublishError, RepositoryError, UserId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    history: Arc<Mutex<HashMap<UserId, Vec<AssessmentRecord>>>>,
    completions: Arc<Mutex<HashMap<UserId, ModuleCompletionSet>>>,
}

impl InMemoryAssessmentRepository {
    /// Replace a user's stored history, e.g. with an imported export.
    pub(crate) fn seed(&self, user: &UserId, records: Vec<AssessmentRecord>) {
        let mut guard = self.history.lock().expect("repository mutex poisoned");
        guard.insert(user.clone(), records);
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn append(&self, user: &UserId, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.history.lock().expect("repository mutex poisoned");
        let entries = guard.entry(user.clone()).or_default();
        if entries.iter().any(|existing| {
            existing.assessment_type() == record.assessment_type()
                && existing.taken_at() == record.taken_at()
        }) {
            return Err(RepositoryError::Conflict);
        }
        entries.push(record);
        Ok(())
    }

    fn history(&self, user: &UserId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.history.lock().expect("repository mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    fn completed_modules(&self, user: &UserId) -> Result<ModuleCompletionSet, RepositoryError> {
        let guard = self.completions.lock().expect("repository mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    fn record_completion(&self, user: &UserId, module: ModuleId) -> Result<bool, RepositoryError> {
        let mut guard = self.completions.lock().expect("repository mutex poisoned");
        Ok(guard.entry(user.clone()).or_default().insert(module))
    }
}

/// Keeps completion events in memory and logs them; stands in for the
/// points and badge pipeline.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCompletionPublisher {
    events: Arc<Mutex<Vec<ModuleCompletedEvent>>>,
}

impl CompletionPublisher for InMemoryCompletionPublisher {
    fn publish(&self, event: ModuleCompletedEvent) -> Result<(), PublishError> {
        info!(
            user = %event.user_id.0,
            module = %event.module_name,
            total_completed = event.total_completed,
            "completion event queued"
        );
        let mut guard = self.events.lock().expect("publisher mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

impl InMemoryCompletionPublisher {
    pub(crate) fn events(&self) -> Vec<ModuleCompletedEvent> {
        self.events.lock().expect("publisher mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_module_id(raw: &str) -> Result<ModuleId, String> {
    raw.trim()
        .parse::<u8>()
        .map(ModuleId)
        .map_err(|err| format!("failed to parse '{raw}' as a module id ({err})"))
}

/// Evaluate a calendar day at its end so that entries logged that day count.
pub(crate) fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default())
        .and_utc()
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use mindful_horizon::wellness::AssessmentType;

    #[test]
    fn parses_dates_and_module_ids() {
        assert_eq!(
            parse_date(" 2025-10-15 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date"))
        );
        assert!(parse_date("15/10/2025").is_err());
        assert_eq!(parse_module_id("4"), Ok(ModuleId(4)));
        assert!(parse_module_id("four").is_err());
    }

    #[test]
    fn end_of_day_includes_same_day_entries() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 15).expect("valid date");
        let as_of = end_of_day(date);
        assert_eq!(as_of.date_naive(), date);
        assert_eq!(as_of.hour(), 23);
    }

    #[test]
    fn repository_rejects_duplicate_records() {
        let repository = InMemoryAssessmentRepository::default();
        let user = UserId("demo".to_string());
        let taken_at = Utc
            .with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let record =
            AssessmentRecord::new(AssessmentType::Gad7, 7.0, taken_at).expect("valid record");

        repository
            .append(&user, record.clone())
            .expect("first append");
        assert!(matches!(
            repository.append(&user, record),
            Err(RepositoryError::Conflict)
        ));
        assert_eq!(repository.history(&user).expect("history").len(), 1);
    }
}
