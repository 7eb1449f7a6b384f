use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::domain::{AssessmentRecord, LatestScores, ModuleCompletionSet};
use super::recommendation::{Recommendation, RecommendationEngine};
use super::scoring::{aggregate_window, WindowedScore};

/// Days between the current score and the comparison score.
const TREND_LOOKBACK_DAYS: i64 = 7;

/// Minimum score change, on the 0-10 scale, counted as movement.
const TREND_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessTrend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl WellnessTrend {
    pub const fn label(self) -> &'static str {
        match self {
            WellnessTrend::Improving => "Improving",
            WellnessTrend::Stable => "Stable",
            WellnessTrend::Declining => "Declining",
            WellnessTrend::InsufficientData => "Insufficient data",
        }
    }
}

/// Snapshot of a user's standing, the input the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellnessReport {
    pub as_of: DateTime<Utc>,
    pub latest: LatestScores,
    pub current: WindowedScore,
    pub previous_week_score: Option<f64>,
    pub trend: WellnessTrend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_delta: Option<f64>,
    pub completed_modules: ModuleCompletionSet,
    pub recommendation: Recommendation,
}

pub fn build_report(
    engine: &RecommendationEngine,
    records: &[AssessmentRecord],
    completed: &ModuleCompletionSet,
    as_of: DateTime<Utc>,
    window_days: u32,
) -> WellnessReport {
    let latest = LatestScores::from_history_as_of(records, as_of);
    let current = aggregate_window(records, as_of, window_days);
    let previous = aggregate_window(
        records,
        as_of - Duration::days(TREND_LOOKBACK_DAYS),
        window_days,
    );

    let (trend, trend_delta) = if current.has_data() && previous.has_data() {
        let delta = ((current.wellness_score - previous.wellness_score) * 10.0).round() / 10.0;
        let trend = if delta >= TREND_TOLERANCE {
            WellnessTrend::Improving
        } else if delta <= -TREND_TOLERANCE {
            WellnessTrend::Declining
        } else {
            WellnessTrend::Stable
        };
        (trend, Some(delta))
    } else {
        (WellnessTrend::InsufficientData, None)
    };

    let recommendation = engine.recommend(&latest, current.wellness_score, completed);

    WellnessReport {
        as_of,
        latest,
        current,
        previous_week_score: previous.has_data().then_some(previous.wellness_score),
        trend,
        trend_delta,
        completed_modules: completed.clone(),
        recommendation,
    }
}
