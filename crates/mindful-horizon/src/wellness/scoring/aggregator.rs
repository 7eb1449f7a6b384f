use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::domain::AssessmentRecord;
use super::{NEUTRAL_WELLNESS_SCORE, WELLNESS_SCALE};

/// Aggregated score together with how much data backed it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowedScore {
    pub wellness_score: f64,
    pub records_in_window: usize,
    pub window_days: u32,
}

impl WindowedScore {
    pub fn has_data(&self) -> bool {
        self.records_in_window > 0
    }
}

/// Recency-weighted wellness score over the trailing `window_days` ending at `as_of`.
///
/// A record aged `d` whole days weighs `max(1, window_days - d)`, so today's
/// entries dominate and the oldest in-window entries still count. Records
/// dated after `as_of` are ignored. Returns [`NEUTRAL_WELLNESS_SCORE`] when
/// the window is empty. The result is rounded to one decimal.
pub fn aggregate(records: &[AssessmentRecord], as_of: DateTime<Utc>, window_days: u32) -> f64 {
    aggregate_window(records, as_of, window_days).wellness_score
}

pub fn aggregate_window(
    records: &[AssessmentRecord],
    as_of: DateTime<Utc>,
    window_days: u32,
) -> WindowedScore {
    let window = i64::from(window_days);
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut records_in_window = 0;

    for record in records {
        if record.taken_at() > as_of {
            continue;
        }
        let age_days = (as_of - record.taken_at()).num_days();
        if age_days > window {
            continue;
        }

        let weight = (window - age_days).max(1) as f64;
        let normalized = record
            .assessment_type()
            .normalize_checked(record.raw_score());
        weighted_sum += normalized * weight;
        total_weight += weight;
        records_in_window += 1;
    }

    let wellness_score = if records_in_window == 0 {
        NEUTRAL_WELLNESS_SCORE
    } else {
        let (low, high) = WELLNESS_SCALE;
        round_one_decimal(weighted_sum / total_weight).clamp(low, high)
    };

    WindowedScore {
        wellness_score,
        records_in_window,
        window_days,
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::super::super::domain::AssessmentType;
    use super::super::DEFAULT_WINDOW_DAYS;
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn record(kind: AssessmentType, raw: f64, days_ago: i64) -> AssessmentRecord {
        AssessmentRecord::new(kind, raw, now() - Duration::days(days_ago)).expect("valid record")
    }

    #[test]
    fn empty_history_yields_neutral_default() {
        let score = aggregate_window(&[], now(), DEFAULT_WINDOW_DAYS);
        assert_eq!(score.wellness_score, NEUTRAL_WELLNESS_SCORE);
        assert!(!score.has_data());
    }

    #[test]
    fn single_record_returns_its_normalized_value() {
        let history = [record(AssessmentType::DailyMood, 4.0, 3)];
        assert_eq!(aggregate(&history, now(), DEFAULT_WINDOW_DAYS), 8.0);
    }

    #[test]
    fn recent_records_outweigh_older_ones() {
        // GAD-7 5 today (7.62) weighs 30, GAD-7 20 twenty days ago (0.48) weighs 10.
        let history = [
            record(AssessmentType::Gad7, 5.0, 0),
            record(AssessmentType::Gad7, 20.0, 20),
        ];

        let score = aggregate(&history, now(), DEFAULT_WINDOW_DAYS);

        let recent = AssessmentType::Gad7.normalize(5.0).unwrap();
        let older = AssessmentType::Gad7.normalize(20.0).unwrap();
        let midpoint = (recent + older) / 2.0;
        assert!(score > midpoint);
        assert!((recent - score).abs() < (score - older).abs());
        assert_eq!(score, 5.8);
    }

    #[test]
    fn records_outside_window_are_excluded() {
        let history = [
            record(AssessmentType::DailyMood, 5.0, 2),
            record(AssessmentType::DailyMood, 1.0, 31),
        ];

        let score = aggregate_window(&history, now(), DEFAULT_WINDOW_DAYS);
        assert_eq!(score.records_in_window, 1);
        assert_eq!(score.wellness_score, 10.0);
    }

    #[test]
    fn window_boundary_is_inclusive_with_floor_weight() {
        // 30 days old sits on the boundary and keeps the minimum weight of 1.
        let history = [
            record(AssessmentType::DailyMood, 5.0, 0),
            record(AssessmentType::DailyMood, 1.0, 30),
        ];

        let score = aggregate_window(&history, now(), DEFAULT_WINDOW_DAYS);
        assert_eq!(score.records_in_window, 2);
        // (10 * 30 + 2 * 1) / 31 = 9.74
        assert_eq!(score.wellness_score, 9.7);
    }

    #[test]
    fn future_dated_records_are_ignored() {
        let history = [
            record(AssessmentType::Phq9, 27.0, -1),
            record(AssessmentType::Phq9, 0.0, 1),
        ];

        let score = aggregate_window(&history, now(), DEFAULT_WINDOW_DAYS);
        assert_eq!(score.records_in_window, 1);
        assert_eq!(score.wellness_score, 10.0);
    }

    #[test]
    fn mixed_instruments_share_the_scale() {
        let history = [
            record(AssessmentType::Gad7, 21.0, 0),
            record(AssessmentType::DailyMood, 5.0, 0),
        ];

        assert_eq!(aggregate(&history, now(), DEFAULT_WINDOW_DAYS), 5.0);
    }

    #[test]
    fn result_stays_within_scale() {
        let mut history = Vec::new();
        for days_ago in 0..40 {
            history.push(record(AssessmentType::Phq9, (days_ago % 28) as f64, days_ago));
            history.push(record(AssessmentType::DailyMood, 1.0 + (days_ago % 5) as f64, days_ago));
        }

        for window in [1, 7, 30, 90] {
            let score = aggregate(&history, now(), window);
            assert!((0.0..=10.0).contains(&score), "window {window} gave {score}");
        }
    }
}
