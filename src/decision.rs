//! Aggregation of impacts into a single bump recommendation.

use crate::core::{Decision, Impact, Severity};

/// Determine the bump level from a list of impacts.
///
/// The level is the strongest bump-affecting severity present. Confidence is
/// the share of bump-affecting impacts carrying that level, and the reasons
/// are those impacts' reasons in discovery order. Advisory `warn` impacts
/// take no part in either.
pub fn decide(impacts: &[Impact]) -> Decision {
    let counted: Vec<&Impact> = impacts
        .iter()
        .filter(|i| i.severity.affects_bump())
        .collect();
    if counted.is_empty() {
        return Decision::none();
    }

    let count_of = |severity: Severity| counted.iter().filter(|i| i.severity == severity).count();
    let level = Severity::BUMP_LEVELS
        .into_iter()
        .find(|&s| count_of(s) > 0)
        .unwrap_or(Severity::Patch);

    let reasons: Vec<String> = counted
        .iter()
        .filter(|i| i.severity == level)
        .map(|i| i.reason.clone())
        .collect();
    let confidence = reasons.len() as f64 / counted.len() as f64;

    Decision {
        level: Some(level),
        confidence,
        reasons,
    }
}
