use serde::{Deserialize, Serialize};

use super::super::domain::ModuleId;

/// Fixed catalog of intervention modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionModule {
    Psychoeducation,
    SleepHygiene,
    CognitiveRestructuring,
    MindfulnessPractice,
    BehavioralActivation,
    ExposureTherapy,
    CrisisManagement,
    RelapsePrevention,
}

impl InterventionModule {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Psychoeducation,
            Self::SleepHygiene,
            Self::CognitiveRestructuring,
            Self::MindfulnessPractice,
            Self::BehavioralActivation,
            Self::ExposureTherapy,
            Self::CrisisManagement,
            Self::RelapsePrevention,
        ]
    }

    pub const fn id(self) -> ModuleId {
        match self {
            Self::Psychoeducation => ModuleId(1),
            Self::SleepHygiene => ModuleId(2),
            Self::CognitiveRestructuring => ModuleId(3),
            Self::MindfulnessPractice => ModuleId(4),
            Self::BehavioralActivation => ModuleId(5),
            Self::ExposureTherapy => ModuleId(6),
            Self::CrisisManagement => ModuleId(7),
            Self::RelapsePrevention => ModuleId(8),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Psychoeducation => "Psychoeducation",
            Self::SleepHygiene => "Sleep Hygiene",
            Self::CognitiveRestructuring => "Cognitive Restructuring",
            Self::MindfulnessPractice => "Mindfulness Practice",
            Self::BehavioralActivation => "Behavioral Activation",
            Self::ExposureTherapy => "Exposure Therapy",
            Self::CrisisManagement => "Crisis Management",
            Self::RelapsePrevention => "Relapse Prevention",
        }
    }

    pub fn from_id(id: ModuleId) -> Option<Self> {
        Self::ordered().into_iter().find(|module| module.id() == id)
    }

    /// Modules that may follow this one. An empty slice leaves the next step
    /// unconstrained.
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Psychoeducation => &[Self::SleepHygiene, Self::CognitiveRestructuring],
            Self::SleepHygiene => &[Self::CognitiveRestructuring, Self::BehavioralActivation],
            Self::CognitiveRestructuring => &[Self::MindfulnessPractice, Self::ExposureTherapy],
            Self::MindfulnessPractice => &[
                Self::BehavioralActivation,
                Self::ExposureTherapy,
                Self::RelapsePrevention,
            ],
            Self::BehavioralActivation => &[Self::ExposureTherapy, Self::RelapsePrevention],
            Self::ExposureTherapy => &[Self::RelapsePrevention],
            Self::CrisisManagement => &[],
            Self::RelapsePrevention => &[Self::MindfulnessPractice],
        }
    }
}

/// Check a completed-module sequence against the progression table.
///
/// Each consecutive pair must either start from a module without listed
/// successors (including ids outside the catalog) or land on one of the
/// listed successors.
pub fn validate_sequence(sequence: &[ModuleId]) -> bool {
    sequence.windows(2).all(|pair| {
        let successors = InterventionModule::from_id(pair[0])
            .map(InterventionModule::successors)
            .unwrap_or(&[]);
        if successors.is_empty() {
            return true;
        }
        InterventionModule::from_id(pair[1])
            .map(|next| successors.contains(&next))
            .unwrap_or(false)
    })
}
