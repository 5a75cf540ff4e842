use super::risk::is_age_appropriate_risk;
use crate::domain::profile::UserProfile;

const EMERGENCY_POINTS: f64 = 25.0;
const TARGET_EMERGENCY_MONTHS: f64 = 6.0;

/// Composite 0..=100 score: emergency fund (25), savings rate (30), debt (20),
/// age-appropriate risk (15), goal clarity (10).
pub fn financial_health_score(
    profile: &UserProfile,
    emergency_months: f64,
    savings_rate: f64,
) -> u32 {
    let emergency = EMERGENCY_POINTS * emergency_months.clamp(0.0, TARGET_EMERGENCY_MONTHS)
        / TARGET_EMERGENCY_MONTHS;

    let savings = if savings_rate >= 30.0 {
        30.0
    } else if savings_rate >= 20.0 {
        25.0
    } else if savings_rate >= 10.0 {
        15.0
    } else if savings_rate >= 5.0 {
        8.0
    } else {
        0.0
    };

    let debt = if profile.loans().has_loans() { 10.0 } else { 20.0 };

    let risk_fit = if is_age_appropriate_risk(profile.age(), profile.risk_tolerance()) {
        15.0
    } else {
        8.0
    };

    let goal_len = profile.goals().trim().chars().count();
    let clarity = if goal_len > 20 {
        10.0
    } else if goal_len > 5 {
        5.0
    } else {
        0.0
    };

    let total: f64 = emergency + savings + debt + risk_fit + clarity;
    total.round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{profile_with, reference_profile};
    use serde_json::json;

    #[test]
    fn reference_profile_score() {
        // 25 * 2/6 + 30 + 20 + 15 + 10 = 83.33
        assert_eq!(financial_health_score(&reference_profile(), 2.0, 50.0), 83);
    }

    #[test]
    fn emergency_points_are_linear_and_capped() {
        let p = reference_profile();
        let at_three = financial_health_score(&p, 3.0, 50.0);
        let at_six = financial_health_score(&p, 6.0, 50.0);
        let at_twelve = financial_health_score(&p, 12.0, 50.0);
        assert_eq!(at_three, 88);
        assert_eq!(at_six, 100);
        assert_eq!(at_twelve, 100);
    }

    #[test]
    fn weak_profile_scores_low_but_not_negative() {
        let p = profile_with(json!({
            "loans": "Yes",
            "age": 60,
            "risk_tolerance": "Aggressive",
            "goals": "rich",
        }));
        // 0 + 0 + 10 + 8 + 0
        assert_eq!(financial_health_score(&p, 0.0, 2.0), 18);
    }
}
