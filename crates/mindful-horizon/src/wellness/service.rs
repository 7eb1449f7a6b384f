use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::cache::{Freshness, RecommendationCache};
use super::domain::{AssessmentRecord, AssessmentType, LatestScores, ModuleId, UserId};
use super::recommendation::{InterventionModule, Priority, Recommendation, RecommendationEngine};
use super::report::{build_report, WellnessReport};
use super::repository::{
    AssessmentRepository, AssessmentSubmission, AssessmentView, CompletionPublisher,
    CompletionView, ModuleCompletedEvent, PublishError, RepositoryError, WellnessView,
};
use super::scoring::{aggregate_window, ScoringError};
use crate::config::WellnessConfig;

/// Service composing the repository, completion hook, and rule engine.
pub struct WellnessService<R, P> {
    repository: Arc<R>,
    publisher: Arc<P>,
    engine: Arc<RecommendationEngine>,
    window_days: u32,
    cache: RecommendationCache,
    undelivered: Mutex<HashSet<(UserId, ModuleId)>>,
}

impl<R, P> WellnessService<R, P>
where
    R: AssessmentRepository + 'static,
    P: CompletionPublisher + 'static,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>, config: WellnessConfig) -> Self {
        Self {
            repository,
            publisher,
            engine: Arc::new(RecommendationEngine::new(config.thresholds)),
            window_days: config.window_days,
            cache: RecommendationCache::default(),
            undelivered: Mutex::new(HashSet::new()),
        }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Validate and append an assessment. Submissions without a timestamp are
    /// stamped with `received_at`.
    pub fn log_assessment(
        &self,
        user: &UserId,
        submission: AssessmentSubmission,
        received_at: DateTime<Utc>,
    ) -> Result<AssessmentView, WellnessServiceError> {
        let assessment_type: AssessmentType = submission.assessment_type.parse()?;
        let record = AssessmentRecord::new(
            assessment_type,
            submission.raw_score,
            submission.taken_at.unwrap_or(received_at),
        )?
        .flagged(submission.crisis_indicator);

        let view = AssessmentView::from_record(user.clone(), &record);
        self.repository.append(user, record)?;

        info!(
            user = %user.0,
            assessment = %view.assessment_type,
            raw_score = view.raw_score,
            normalized = view.normalized_score,
            "assessment recorded"
        );
        Ok(view)
    }

    /// Mark a catalog module complete and notify the completion hook once.
    /// A completion whose event failed to publish is published again on the
    /// next call for the same module.
    pub fn complete_module(
        &self,
        user: &UserId,
        module_id: ModuleId,
        completed_at: DateTime<Utc>,
    ) -> Result<CompletionView, WellnessServiceError> {
        let module = InterventionModule::from_id(module_id)
            .ok_or(WellnessServiceError::UnknownModule(module_id))?;

        let newly_completed = self.repository.record_completion(user, module_id)?;
        let total_completed = self.repository.completed_modules(user)?.len();

        let key = (user.clone(), module_id);
        let mut undelivered = self
            .undelivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if newly_completed || undelivered.contains(&key) {
            let published = self.publisher.publish(ModuleCompletedEvent {
                user_id: user.clone(),
                module_id,
                module_name: module.label().to_string(),
                completed_at,
                total_completed,
            });
            if let Err(err) = published {
                warn!(
                    user = %user.0,
                    module = module.label(),
                    error = %err,
                    "completion event not delivered"
                );
                undelivered.insert(key);
                return Err(err.into());
            }
            undelivered.remove(&key);
            info!(user = %user.0, module = module.label(), total_completed, "module completed");
        }
        drop(undelivered);

        Ok(CompletionView {
            user_id: user.clone(),
            module_id,
            module_name: module.label(),
            newly_completed,
            total_completed,
        })
    }

    pub fn wellness(
        &self,
        user: &UserId,
        as_of: DateTime<Utc>,
    ) -> Result<WellnessView, WellnessServiceError> {
        let history = self.repository.history(user)?;
        let score = aggregate_window(&history, as_of, self.window_days);

        Ok(WellnessView {
            user_id: user.clone(),
            as_of,
            wellness_score: score.wellness_score,
            records_in_window: score.records_in_window,
            window_days: score.window_days,
        })
    }

    /// Current recommendation, served from cache while no assessment or
    /// completion has been stored since on the same day.
    pub fn recommendation(
        &self,
        user: &UserId,
        as_of: DateTime<Utc>,
    ) -> Result<Recommendation, WellnessServiceError> {
        let history = self.repository.history(user)?;
        let completed = self.repository.completed_modules(user)?;

        let freshness = Freshness {
            assessments_logged: history.len(),
            completed_modules: completed.len(),
            as_of_day: as_of.date_naive(),
        };

        if let Some(cached) = self.cache.get(user, &freshness) {
            debug!(user = %user.0, module = %cached.module_name, "recommendation cache hit");
            return Ok(cached);
        }

        let latest = LatestScores::from_history_as_of(&history, as_of);
        let score = aggregate_window(&history, as_of, self.window_days);
        let recommendation = self
            .engine
            .recommend(&latest, score.wellness_score, &completed);

        if recommendation.priority == Priority::Crisis {
            warn!(user = %user.0, reason = %recommendation.reason, "crisis recommendation issued");
        } else {
            debug!(
                user = %user.0,
                module = %recommendation.module_name,
                priority = recommendation.priority.label(),
                "recommendation computed"
            );
        }

        self.cache
            .put(user.clone(), freshness, recommendation.clone());
        Ok(recommendation)
    }

    pub fn report(
        &self,
        user: &UserId,
        as_of: DateTime<Utc>,
    ) -> Result<WellnessReport, WellnessServiceError> {
        let history = self.repository.history(user)?;
        let completed = self.repository.completed_modules(user)?;
        Ok(build_report(
            &self.engine,
            &history,
            &completed,
            as_of,
            self.window_days,
        ))
    }
}

/// Error raised by the wellness service.
#[derive(Debug, thiserror::Error)]
pub enum WellnessServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("module {0} is not in the intervention catalog")]
    UnknownModule(ModuleId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}
