use super::catalog::InterventionModule;
use super::rules::RuleContext;
use super::Recommendation;

/// Hard clinical constraints applied to every candidate before it is returned.
/// Returns the conflict when the candidate must be withheld.
pub(crate) fn contraindication(
    candidate: &Recommendation,
    context: &RuleContext<'_>,
) -> Option<String> {
    match candidate.module() {
        Some(InterventionModule::ExposureTherapy) if context.severe_depression() => {
            let score = context.phq9().unwrap_or_default();
            Some(format!(
                "exposure therapy is withheld while PHQ-9 {score} meets the severe depression threshold of {}",
                context.thresholds.severe_depression_phq9
            ))
        }
        _ => None,
    }
}
