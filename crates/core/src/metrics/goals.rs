use super::projections::required_monthly_sip;
use serde::{Deserialize, Serialize};

const RETIREMENT_AGE: u32 = 60;
const RETIREMENT_RETURN: f64 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Retirement,
    Home,
    Education,
    Travel,
    Emergency,
    Business,
    Marriage,
    Children,
}

impl GoalKind {
    /// Detection order; the first detected goal becomes the priority goal.
    pub const ALL: [GoalKind; 8] = [
        Self::Retirement,
        Self::Home,
        Self::Education,
        Self::Travel,
        Self::Emergency,
        Self::Business,
        Self::Marriage,
        Self::Children,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retirement => "retirement",
            Self::Home => "home",
            Self::Education => "education",
            Self::Travel => "travel",
            Self::Emergency => "emergency",
            Self::Business => "business",
            Self::Marriage => "marriage",
            Self::Children => "children",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Retirement => &["retirement", "retire", "pension"],
            Self::Home => &["home", "house", "property", "real estate"],
            Self::Education => &["education", "study", "college", "university", "school"],
            Self::Travel => &["travel", "trip", "vacation", "holiday"],
            Self::Emergency => &["emergency", "fund", "safety"],
            Self::Business => &["business", "startup", "entrepreneur"],
            Self::Marriage => &["marriage", "wedding", "family"],
            Self::Children => &["children", "kids", "child"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSuggestion {
    pub goal: GoalKind,
    pub title: String,
    pub timeline_years: u32,
    pub monthly_investment: f64,
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAnalysis {
    pub detected_goals: Vec<GoalKind>,
    pub recommendations: Vec<GoalSuggestion>,
    pub priority_goal: String,
}

pub fn detect_goals(goals: &str) -> Vec<GoalKind> {
    let text = goals.to_lowercase();
    GoalKind::ALL
        .into_iter()
        .filter(|g| g.keywords().iter().any(|k| text.contains(k)))
        .collect()
}

/// Monthly SIP needed for a corpus of 25 years of 70% of `monthly_income`.
pub fn retirement_monthly_need(monthly_income: f64, years_to_retirement: u32) -> f64 {
    let corpus = monthly_income * 0.7 * 12.0 * 25.0;
    required_monthly_sip(corpus, RETIREMENT_RETURN, years_to_retirement).round()
}

pub fn analyze_goals(goals: &str, age: u32, disposable_income: f64) -> GoalAnalysis {
    let detected_goals = detect_goals(goals);
    let mut recommendations = Vec::new();

    for goal in &detected_goals {
        match goal {
            GoalKind::Retirement => {
                let years = RETIREMENT_AGE.saturating_sub(age).max(5);
                recommendations.push(GoalSuggestion {
                    goal: *goal,
                    title: "Retirement Planning".to_string(),
                    timeline_years: years,
                    monthly_investment: retirement_monthly_need(disposable_income, years),
                    strategy: "Balanced growth portfolio with gradual shift to conservative"
                        .to_string(),
                });
            }
            GoalKind::Home => recommendations.push(GoalSuggestion {
                goal: *goal,
                title: "Home Purchase".to_string(),
                timeline_years: if age < 35 { 5 } else { 3 },
                monthly_investment: disposable_income * 0.3,
                strategy: "Conservative growth with liquid funds".to_string(),
            }),
            GoalKind::Education => recommendations.push(GoalSuggestion {
                goal: *goal,
                title: "Education Fund".to_string(),
                timeline_years: if detected_goals.contains(&GoalKind::Children) {
                    10
                } else {
                    2
                },
                monthly_investment: disposable_income * 0.25,
                strategy: "Moderate growth with education-specific funds".to_string(),
            }),
            _ => {}
        }
    }

    let priority_goal = detected_goals
        .first()
        .map_or("wealth_building", |g| g.as_str())
        .to_string();

    GoalAnalysis {
        detected_goals,
        recommendations,
        priority_goal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::projections::sip_future_value;

    #[test]
    fn detects_in_vocabulary_order() {
        let goals = detect_goals("Buying a HOUSE, then retirement");
        assert_eq!(goals, vec![GoalKind::Retirement, GoalKind::Home]);
        assert!(detect_goals("nothing specific").is_empty());
    }

    #[test]
    fn retirement_need_uses_annuity_inversion() {
        let need = retirement_monthly_need(25_000.0, 30);
        let corpus = 25_000.0 * 0.7 * 12.0 * 25.0;
        let fv = sip_future_value(need, 0.12, 30);
        assert!((fv - corpus).abs() / corpus < 1e-3);
    }

    #[test]
    fn suggestions_for_reference_goals() {
        let a = analyze_goals("Retirement planning and buying a house", 30, 25_000.0);
        assert_eq!(a.priority_goal, "retirement");
        assert_eq!(a.recommendations.len(), 2);
        assert_eq!(a.recommendations[0].timeline_years, 30);
        assert_eq!(a.recommendations[1].title, "Home Purchase");
        assert_eq!(a.recommendations[1].timeline_years, 5);
        assert_eq!(a.recommendations[1].monthly_investment, 7_500.0);
    }

    #[test]
    fn education_timeline_depends_on_children() {
        let a = analyze_goals("college fund for my kids", 40, 10_000.0);
        let edu = a
            .recommendations
            .iter()
            .find(|r| r.goal == GoalKind::Education)
            .unwrap();
        assert_eq!(edu.timeline_years, 10);
        let b = analyze_goals("university study", 22, 10_000.0);
        assert_eq!(b.recommendations[0].timeline_years, 2);
    }

    #[test]
    fn retirement_horizon_has_a_floor() {
        let a = analyze_goals("retire soon", 58, 10_000.0);
        assert_eq!(a.recommendations[0].timeline_years, 5);
    }

    #[test]
    fn no_goals_means_wealth_building() {
        let a = analyze_goals("get rich", 30, 1_000.0);
        assert_eq!(a.priority_goal, "wealth_building");
        assert!(a.recommendations.is_empty());
    }
}
