use std::path::Path;

use serde::{Deserialize, Serialize};

/// Clinical thresholds consumed by the decision table. Raw thresholds are on
/// the instrument's own scale; wellness thresholds are on the 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub crisis_phq9: f64,
    pub crisis_gad7: Option<f64>,
    pub severe_anxiety_gad7: f64,
    pub moderate_anxiety_gad7: f64,
    pub severe_depression_phq9: f64,
    pub moderate_depression_phq9: f64,
    pub maintenance_wellness: f64,
    pub maintenance_min_completed: usize,
    pub low_wellness: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            crisis_phq9: 24.0,
            crisis_gad7: None,
            severe_anxiety_gad7: 15.0,
            moderate_anxiety_gad7: 10.0,
            severe_depression_phq9: 15.0,
            moderate_depression_phq9: 10.0,
            maintenance_wellness: 8.0,
            maintenance_min_completed: 4,
            low_wellness: 6.0,
        }
    }
}

/// Problems with a threshold table supplied from outside the binary.
#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    #[error("unable to read thresholds file: {0}")]
    Io(#[from] std::io::Error),
    #[error("thresholds file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("threshold '{field}' must be a finite number")]
    NonFinite { field: &'static str },
    #[error("threshold '{lower}' must not exceed '{upper}'")]
    OutOfOrder {
        lower: &'static str,
        upper: &'static str,
    },
    #[error("wellness threshold '{field}' must lie within 0-10")]
    OffScale { field: &'static str },
}

impl RecommendationThresholds {
    /// Load a JSON table; omitted fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ThresholdError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ThresholdError> {
        let thresholds: Self = serde_json::from_str(raw)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        let raw = [
            ("crisis_phq9", Some(self.crisis_phq9)),
            ("crisis_gad7", self.crisis_gad7),
            ("severe_anxiety_gad7", Some(self.severe_anxiety_gad7)),
            ("moderate_anxiety_gad7", Some(self.moderate_anxiety_gad7)),
            ("severe_depression_phq9", Some(self.severe_depression_phq9)),
            ("moderate_depression_phq9", Some(self.moderate_depression_phq9)),
            ("maintenance_wellness", Some(self.maintenance_wellness)),
            ("low_wellness", Some(self.low_wellness)),
        ];
        for (field, value) in raw {
            if value.is_some_and(|value| !value.is_finite()) {
                return Err(ThresholdError::NonFinite { field });
            }
        }

        for (field, value) in [
            ("maintenance_wellness", self.maintenance_wellness),
            ("low_wellness", self.low_wellness),
        ] {
            if !(0.0..=10.0).contains(&value) {
                return Err(ThresholdError::OffScale { field });
            }
        }

        let mut ordering = vec![
            (
                "moderate_anxiety_gad7",
                self.moderate_anxiety_gad7,
                "severe_anxiety_gad7",
                self.severe_anxiety_gad7,
            ),
            (
                "moderate_depression_phq9",
                self.moderate_depression_phq9,
                "severe_depression_phq9",
                self.severe_depression_phq9,
            ),
            (
                "severe_depression_phq9",
                self.severe_depression_phq9,
                "crisis_phq9",
                self.crisis_phq9,
            ),
            (
                "low_wellness",
                self.low_wellness,
                "maintenance_wellness",
                self.maintenance_wellness,
            ),
        ];
        if let Some(crisis_gad7) = self.crisis_gad7 {
            ordering.push((
                "severe_anxiety_gad7",
                self.severe_anxiety_gad7,
                "crisis_gad7",
                crisis_gad7,
            ));
        }

        for (lower, lower_value, upper, upper_value) in ordering {
            if lower_value > upper_value {
                return Err(ThresholdError::OutOfOrder { lower, upper });
            }
        }

        Ok(())
    }
}
