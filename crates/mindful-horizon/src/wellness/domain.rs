use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::ScoringError;

/// Identifier wrapper for tracked users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Catalog identifier of an intervention module.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ModuleId(pub u8);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Screening instruments accepted by the scoring pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum AssessmentType {
    #[serde(rename = "GAD-7")]
    Gad7,
    #[serde(rename = "PHQ-9")]
    Phq9,
    #[serde(rename = "Daily Mood")]
    DailyMood,
}

impl AssessmentType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Gad7, Self::Phq9, Self::DailyMood]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Gad7 => "GAD-7",
            Self::Phq9 => "PHQ-9",
            Self::DailyMood => "Daily Mood",
        }
    }

    /// Inclusive raw score bounds for the instrument.
    pub const fn valid_range(self) -> (f64, f64) {
        match self {
            Self::Gad7 => (0.0, 21.0),
            Self::Phq9 => (0.0, 27.0),
            Self::DailyMood => (1.0, 5.0),
        }
    }

    /// Check a raw score against the instrument's range; NaN and infinities never pass.
    pub fn check_raw(self, raw_score: f64) -> Result<f64, ScoringError> {
        let (min, max) = self.valid_range();
        if raw_score.is_finite() && raw_score >= min && raw_score <= max {
            Ok(raw_score)
        } else {
            Err(ScoringError::InvalidScoreRange {
                assessment_type: self,
                raw_score,
                min,
                max,
            })
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AssessmentType {
    type Err = ScoringError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: String = value
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "gad7" => Ok(Self::Gad7),
            "phq9" => Ok(Self::Phq9),
            "dailymood" | "mood" => Ok(Self::DailyMood),
            _ => Err(ScoringError::UnknownAssessmentType(value.trim().to_string())),
        }
    }
}

impl TryFrom<String> for AssessmentType {
    type Error = ScoringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One completed screening. Raw scores are range-checked at construction, so a
/// record that exists always normalizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedAssessmentRecord")]
pub struct AssessmentRecord {
    assessment_type: AssessmentType,
    raw_score: f64,
    taken_at: DateTime<Utc>,
    crisis_indicator: bool,
}

impl AssessmentRecord {
    pub fn new(
        assessment_type: AssessmentType,
        raw_score: f64,
        taken_at: DateTime<Utc>,
    ) -> Result<Self, ScoringError> {
        let raw_score = assessment_type.check_raw(raw_score)?;
        Ok(Self {
            assessment_type,
            raw_score,
            taken_at,
            crisis_indicator: false,
        })
    }

    /// Mark the record as carrying an explicit crisis indicator (e.g. a
    /// self-harm item answered positively).
    pub fn flagged(mut self, crisis_indicator: bool) -> Self {
        self.crisis_indicator = crisis_indicator;
        self
    }

    pub fn assessment_type(&self) -> AssessmentType {
        self.assessment_type
    }

    pub fn raw_score(&self) -> f64 {
        self.raw_score
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn crisis_indicator(&self) -> bool {
        self.crisis_indicator
    }
}

#[derive(Deserialize)]
struct UncheckedAssessmentRecord {
    assessment_type: String,
    raw_score: f64,
    taken_at: DateTime<Utc>,
    #[serde(default)]
    crisis_indicator: bool,
}

impl TryFrom<UncheckedAssessmentRecord> for AssessmentRecord {
    type Error = ScoringError;

    fn try_from(value: UncheckedAssessmentRecord) -> Result<Self, Self::Error> {
        let assessment_type = value.assessment_type.parse()?;
        Ok(AssessmentRecord::new(assessment_type, value.raw_score, value.taken_at)?
            .flagged(value.crisis_indicator))
    }
}

/// Modules a user has finished. Insert-only; completions are never revoked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCompletionSet(BTreeSet<ModuleId>);

impl ModuleCompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the module was not already present.
    pub fn insert(&mut self, module: ModuleId) -> bool {
        self.0.insert(module)
    }

    pub fn contains(&self, module: ModuleId) -> bool {
        self.0.contains(&module)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ModuleId> for ModuleCompletionSet {
    fn from_iter<I: IntoIterator<Item = ModuleId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[u8; N]> for ModuleCompletionSet {
    fn from(ids: [u8; N]) -> Self {
        ids.into_iter().map(ModuleId).collect()
    }
}

/// Most recent raw score per instrument, the rule engine's view of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestScores {
    pub scores: BTreeMap<AssessmentType, f64>,
    #[serde(default)]
    pub crisis_indicator: bool,
}

impl LatestScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, assessment_type: AssessmentType, raw_score: f64) -> Self {
        self.scores.insert(assessment_type, raw_score);
        self
    }

    pub fn with_crisis_indicator(mut self) -> Self {
        self.crisis_indicator = true;
        self
    }

    pub fn get(&self, assessment_type: AssessmentType) -> Option<f64> {
        self.scores.get(&assessment_type).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && !self.crisis_indicator
    }

    /// Pick the newest record of each type. On equal timestamps the later
    /// entry in `records` wins. The crisis flag is raised when any of the
    /// selected records carries it.
    pub fn from_history(records: &[AssessmentRecord]) -> Self {
        Self::select(records.iter())
    }

    /// Same as [`LatestScores::from_history`], ignoring records taken after
    /// `as_of` the way the window aggregator does.
    pub fn from_history_as_of(records: &[AssessmentRecord], as_of: DateTime<Utc>) -> Self {
        Self::select(records.iter().filter(|record| record.taken_at() <= as_of))
    }

    fn select<'a>(records: impl Iterator<Item = &'a AssessmentRecord>) -> Self {
        let mut newest: BTreeMap<AssessmentType, &AssessmentRecord> = BTreeMap::new();
        for record in records {
            let replace = newest
                .get(&record.assessment_type())
                .map(|current| record.taken_at() >= current.taken_at())
                .unwrap_or(true);
            if replace {
                newest.insert(record.assessment_type(), record);
            }
        }

        Self {
            crisis_indicator: newest.values().any(|record| record.crisis_indicator()),
            scores: newest
                .into_iter()
                .map(|(kind, record)| (kind, record.raw_score()))
                .collect(),
        }
    }
}
