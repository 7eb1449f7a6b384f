use super::super::domain::AssessmentType;
use super::ScoringError;

impl AssessmentType {
    /// Map a raw score onto the 0-10 wellness scale.
    ///
    /// GAD-7 and PHQ-9 are symptom scales, so they are inverted; daily mood
    /// (1-5) is doubled. Out-of-range input is rejected, never clamped.
    pub fn normalize(self, raw_score: f64) -> Result<f64, ScoringError> {
        let raw = self.check_raw(raw_score)?;
        Ok(self.normalize_checked(raw))
    }

    pub(crate) fn normalize_checked(self, raw: f64) -> f64 {
        match self {
            AssessmentType::Gad7 => (1.0 - raw / 21.0) * 10.0,
            AssessmentType::Phq9 => (1.0 - raw / 27.0) * 10.0,
            AssessmentType::DailyMood => raw * 2.0,
        }
    }
}

/// Normalize a raw score for an instrument named by string, as received from
/// callers outside the crate.
pub fn normalize(assessment_type: &str, raw_score: f64) -> Result<f64, ScoringError> {
    let kind: AssessmentType = assessment_type.parse()?;
    kind.normalize(raw_score)
}
