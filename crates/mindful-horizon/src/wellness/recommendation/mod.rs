mod catalog;
mod config;
mod policy;
mod rules;

pub use catalog::{validate_sequence, InterventionModule};
pub use config::{RecommendationThresholds, ThresholdError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{LatestScores, ModuleCompletionSet, ModuleId};
use rules::RuleContext;

/// Urgency tier attached to a recommendation, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Crisis,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Crisis => "crisis",
        }
    }
}

/// The next intervention to offer a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub module_id: ModuleId,
    pub module_name: String,
    pub reason: String,
    pub priority: Priority,
}

impl Recommendation {
    pub(crate) fn new(module: InterventionModule, priority: Priority, reason: String) -> Self {
        Self {
            module_id: module.id(),
            module_name: module.label().to_string(),
            reason,
            priority,
        }
    }

    pub fn module(&self) -> Option<InterventionModule> {
        InterventionModule::from_id(self.module_id)
    }
}

/// Stateless rule engine applying a threshold table to a user snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendationThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RecommendationThresholds {
        &self.thresholds
    }

    /// Walk the decision table in order and return the first admissible
    /// candidate. Total over its input: an empty snapshot at the neutral
    /// score still yields the foundation recommendation.
    pub fn recommend(
        &self,
        latest: &LatestScores,
        wellness_score: f64,
        completed: &ModuleCompletionSet,
    ) -> Recommendation {
        let context = RuleContext {
            latest,
            wellness_score,
            completed,
            thresholds: &self.thresholds,
        };

        for (rule, evaluate) in rules::DECISION_TABLE {
            let Some(candidate) = evaluate(&context) else {
                continue;
            };

            match policy::contraindication(&candidate, &context) {
                Some(conflict) => {
                    debug!(
                        rule,
                        module = %candidate.module_name,
                        %conflict,
                        "recommendation rejected by contraindication guard"
                    );
                }
                None => return candidate,
            }
        }

        rules::fallback(&context)
    }
}

/// Recommend with the default threshold table.
pub fn recommend(
    latest: &LatestScores,
    wellness_score: f64,
    completed: &ModuleCompletionSet,
) -> Recommendation {
    RecommendationEngine::default().recommend(latest, wellness_score, completed)
}
