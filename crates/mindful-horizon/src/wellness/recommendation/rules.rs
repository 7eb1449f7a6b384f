use super::super::domain::{AssessmentType, LatestScores, ModuleCompletionSet};
use super::catalog::InterventionModule;
use super::config::RecommendationThresholds;
use super::{Priority, Recommendation};

pub(crate) struct RuleContext<'a> {
    pub latest: &'a LatestScores,
    pub wellness_score: f64,
    pub completed: &'a ModuleCompletionSet,
    pub thresholds: &'a RecommendationThresholds,
}

impl RuleContext<'_> {
    pub fn gad7(&self) -> Option<f64> {
        self.latest.get(AssessmentType::Gad7)
    }

    pub fn phq9(&self) -> Option<f64> {
        self.latest.get(AssessmentType::Phq9)
    }

    pub fn severe_depression(&self) -> bool {
        self.phq9()
            .is_some_and(|score| score >= self.thresholds.severe_depression_phq9)
    }

    fn pending(&self, module: InterventionModule) -> bool {
        !self.completed.contains(module.id())
    }

    /// First module in `progression` not yet completed.
    fn next_pending(&self, progression: &[InterventionModule]) -> Option<InterventionModule> {
        progression
            .iter()
            .copied()
            .find(|module| self.pending(*module))
    }
}

pub(crate) type Rule = fn(&RuleContext<'_>) -> Option<Recommendation>;

/// Evaluation order; first admissible match wins.
pub(crate) const DECISION_TABLE: [(&str, Rule); 6] = [
    ("crisis", crisis),
    ("severe_anxiety", severe_anxiety),
    ("severe_depression", severe_depression),
    ("maintenance", maintenance),
    ("moderate_anxiety", moderate_anxiety),
    ("moderate_depression", moderate_depression),
];

fn crisis(context: &RuleContext<'_>) -> Option<Recommendation> {
    let thresholds = context.thresholds;

    let trigger = if let Some(score) = context
        .phq9()
        .filter(|score| *score >= thresholds.crisis_phq9)
    {
        format!(
            "PHQ-9 score {score} meets the crisis threshold of {}",
            thresholds.crisis_phq9
        )
    } else if let Some((score, limit)) = context
        .gad7()
        .zip(thresholds.crisis_gad7)
        .filter(|(score, limit)| score >= limit)
    {
        format!("GAD-7 score {score} meets the crisis threshold of {limit}")
    } else if context.latest.crisis_indicator {
        "a crisis indicator was reported on the latest assessment".to_string()
    } else {
        return None;
    };

    Some(Recommendation::new(
        InterventionModule::CrisisManagement,
        Priority::Crisis,
        format!("{trigger}; immediate support and safety planning are recommended"),
    ))
}

fn severe_anxiety(context: &RuleContext<'_>) -> Option<Recommendation> {
    let score = context
        .gad7()
        .filter(|score| *score >= context.thresholds.severe_anxiety_gad7)?;

    let module = context.next_pending(&[
        InterventionModule::CognitiveRestructuring,
        InterventionModule::MindfulnessPractice,
        InterventionModule::ExposureTherapy,
    ])?;

    let reason = match module {
        InterventionModule::CognitiveRestructuring => format!(
            "Severe anxiety (GAD-7 {score}): cognitive restructuring targets the anxious thinking patterns first"
        ),
        InterventionModule::MindfulnessPractice => format!(
            "Severe anxiety (GAD-7 {score}) persists after cognitive restructuring; mindfulness practice builds tolerance for anxious arousal"
        ),
        _ => format!(
            "Severe anxiety (GAD-7 {score}) persists after cognitive and mindfulness work; graded exposure is the next step"
        ),
    };

    Some(Recommendation::new(module, Priority::High, reason))
}

fn severe_depression(context: &RuleContext<'_>) -> Option<Recommendation> {
    let score = context
        .phq9()
        .filter(|score| *score >= context.thresholds.severe_depression_phq9)?;
    let module = context.next_pending(&[InterventionModule::BehavioralActivation])?;

    Some(Recommendation::new(
        module,
        Priority::High,
        format!(
            "Moderately severe depression (PHQ-9 {score}): behavioral activation re-establishes rewarding daily activity"
        ),
    ))
}

fn maintenance(context: &RuleContext<'_>) -> Option<Recommendation> {
    let thresholds = context.thresholds;
    if context.wellness_score < thresholds.maintenance_wellness
        || context.completed.len() < thresholds.maintenance_min_completed
    {
        return None;
    }

    Some(Recommendation::new(
        InterventionModule::RelapsePrevention,
        Priority::Low,
        format!(
            "Wellness score {:.1} with {} modules completed; relapse prevention consolidates progress",
            context.wellness_score,
            context.completed.len()
        ),
    ))
}

fn moderate_anxiety(context: &RuleContext<'_>) -> Option<Recommendation> {
    let score = context
        .gad7()
        .filter(|score| *score >= context.thresholds.moderate_anxiety_gad7)?;

    let module = context.next_pending(&[
        InterventionModule::CognitiveRestructuring,
        InterventionModule::MindfulnessPractice,
    ])?;

    let reason = match module {
        InterventionModule::CognitiveRestructuring => format!(
            "Moderate anxiety (GAD-7 {score}): cognitive restructuring helps reframe worry"
        ),
        _ => format!(
            "Moderate anxiety (GAD-7 {score}) after cognitive restructuring; mindfulness practice supports day-to-day calm"
        ),
    };

    Some(Recommendation::new(module, Priority::Medium, reason))
}

fn moderate_depression(context: &RuleContext<'_>) -> Option<Recommendation> {
    let score = context
        .phq9()
        .filter(|score| *score >= context.thresholds.moderate_depression_phq9)?;
    let module = context.next_pending(&[InterventionModule::BehavioralActivation])?;

    Some(Recommendation::new(
        module,
        Priority::Medium,
        format!("Moderate depression (PHQ-9 {score}): behavioral activation lifts low mood through scheduled activity"),
    ))
}

pub(crate) fn fallback(context: &RuleContext<'_>) -> Recommendation {
    let low_wellness = context.wellness_score < context.thresholds.low_wellness;
    if low_wellness && context.pending(InterventionModule::SleepHygiene) {
        return Recommendation::new(
            InterventionModule::SleepHygiene,
            Priority::Medium,
            format!(
                "Wellness score {:.1} is below {:.1}; sleep hygiene lays the foundation for further work",
                context.wellness_score, context.thresholds.low_wellness
            ),
        );
    }

    Recommendation::new(
        InterventionModule::RelapsePrevention,
        Priority::Low,
        "No elevated risk signals; relapse prevention keeps coping skills fresh".to_string(),
    )
}
