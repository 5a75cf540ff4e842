//! Questionnaire progress as a plain value. Every transition consumes the
//! current context and hands back the next one, so callers can keep it
//! anywhere (a cookie, a request body, a local variable).

use crate::domain::profile::UserProfile;
use crate::domain::recommendation::Recommendation;
use crate::validation::{parse_profile, validate_step, FieldMap};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    IncomeAndLoans,
    PersonalProfile,
    InvestmentsAndGoals,
}

impl FormStep {
    pub const ALL: [FormStep; 3] = [
        Self::IncomeAndLoans,
        Self::PersonalProfile,
        Self::InvestmentsAndGoals,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::IncomeAndLoans => "Income & Loans",
            Self::PersonalProfile => "Personal Profile",
            Self::InvestmentsAndGoals => "Investments & Goals",
        }
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::IncomeAndLoans => &["salary", "loans", "expenses"],
            Self::PersonalProfile => &["age", "risk_tolerance", "time_horizon"],
            Self::InvestmentsAndGoals => &["existing_investments", "goals", "emergency_fund"],
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::IncomeAndLoans => 0,
            Self::PersonalProfile => 1,
            Self::InvestmentsAndGoals => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    fn previous(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    fn owns(field: &str) -> bool {
        Self::ALL.iter().any(|s| s.fields().contains(&field))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub step: FormStep,
    pub form: FieldMap,
    /// Recommendation from the last successful submit, kept so a page
    /// reload can show it without asking the advisor again.
    #[serde(default)]
    pub last_result: Option<Recommendation>,
}

impl Default for SessionContext {
    fn default() -> Self {
        let form = json!({
            "salary": 0.0,
            "loans": "No",
            "expenses": 0.0,
            "emergency_fund": 0.0,
            "age": 18,
            "risk_tolerance": "Moderate",
            "time_horizon": "5-10 years",
            "existing_investments": "",
            "goals": "",
        });
        Self {
            step: FormStep::IncomeAndLoans,
            form: form.as_object().cloned().unwrap_or_default(),
            last_result: None,
        }
    }
}

/// Outcome of a step change: the context to carry forward plus anything the
/// user has to fix before moving on.
#[derive(Debug, Clone)]
pub struct Transition {
    pub context: SessionContext,
    pub errors: Vec<String>,
}

impl SessionContext {
    pub fn reset() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: &str, value: Value) -> Result<Self, String> {
        if !FormStep::owns(field) {
            return Err(format!("unknown questionnaire field: {field}"));
        }
        self.form.insert(field.to_string(), value);
        self.last_result = None;
        Ok(self)
    }

    pub fn with_fields(self, fields: &FieldMap) -> Result<Self, String> {
        fields
            .iter()
            .try_fold(self, |ctx, (k, v)| ctx.with_field(k, v.clone()))
    }

    /// Advances when the current step's fields pass validation.
    pub fn next(self) -> Transition {
        let errors = validate_step(self.step, &self.form);
        let step = if errors.is_empty() {
            self.step.next()
        } else {
            self.step
        };
        Transition {
            context: Self { step, ..self },
            errors,
        }
    }

    pub fn back(self) -> Self {
        Self {
            step: self.step.previous(),
            ..self
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.step == FormStep::InvestmentsAndGoals
    }

    pub fn with_result(self, recommendation: Recommendation) -> Self {
        Self {
            last_result: Some(recommendation),
            ..self
        }
    }

    /// Only offered on the last step: validates that step, then the whole form.
    pub fn submit(&self) -> Result<UserProfile, Vec<String>> {
        if !self.is_last_step() {
            return Err(vec![format!(
                "Complete the remaining steps before submitting (currently on {}).",
                self.step.title()
            )]);
        }
        let errors = validate_step(self.step, &self.form);
        if !errors.is_empty() {
            return Err(errors);
        }
        parse_profile(&self.form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SessionContext {
        let answers = json!({
            "salary": 80000,
            "expenses": 30000,
            "loans": "Yes",
            "age": 35,
            "risk_tolerance": "Aggressive",
            "time_horizon": ">10 years",
            "goals": "Children's education and retirement",
        });
        SessionContext::default()
            .with_fields(answers.as_object().unwrap())
            .unwrap()
    }

    #[test]
    fn default_form_does_not_pass_first_step() {
        let t = SessionContext::default().next();
        assert_eq!(t.context.step, FormStep::IncomeAndLoans);
        assert_eq!(t.errors, vec!["Please enter a valid monthly salary."]);
    }

    #[test]
    fn walks_all_steps_and_submits() {
        let t1 = filled().next();
        assert!(t1.errors.is_empty());
        assert_eq!(t1.context.step, FormStep::PersonalProfile);
        let t2 = t1.context.next();
        assert_eq!(t2.context.step, FormStep::InvestmentsAndGoals);
        let t3 = t2.context.next();
        assert!(t3.context.is_last_step());
        let profile = t3.context.submit().unwrap();
        assert_eq!(profile.age(), 35);
    }

    #[test]
    fn submit_is_refused_before_the_last_step() {
        let ctx = filled().next().context;
        assert_eq!(ctx.step, FormStep::PersonalProfile);
        let errors = ctx.submit().unwrap_err();
        assert_eq!(
            errors,
            vec!["Complete the remaining steps before submitting (currently on Personal Profile)."]
        );
    }

    #[test]
    fn back_stops_at_first_step() {
        let ctx = filled().next().context.back().back();
        assert_eq!(ctx.step, FormStep::IncomeAndLoans);
    }

    #[test]
    fn transitions_do_not_touch_the_previous_value() {
        let before = filled();
        let after = before.clone().next().context;
        assert_eq!(before.step, FormStep::IncomeAndLoans);
        assert_ne!(before, after);
    }

    #[test]
    fn editing_an_answer_drops_the_cached_result() {
        use crate::domain::recommendation::RiskLevel;
        use std::collections::BTreeMap;

        let rec = Recommendation::from_parts(
            BTreeMap::from([("Cash/FD".to_string(), 100.0)]),
            "Keep everything liquid for now.".to_string(),
            "Build the emergency fund first.".to_string(),
            RiskLevel::Conservative,
            chrono::Utc::now(),
        );
        let ctx = filled().with_result(rec);
        assert!(ctx.last_result.is_some());
        let ctx = ctx.with_field("age", json!(40)).unwrap();
        assert!(ctx.last_result.is_none());
        assert!(SessionContext::reset().last_result.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SessionContext::default()
            .with_field("password", json!("x"))
            .is_err());
    }

    #[test]
    fn context_round_trips_through_json() {
        let ctx = filled().next().context;
        let v = serde_json::to_value(&ctx).unwrap();
        assert_eq!(v["step"], json!("personal_profile"));
        let back: SessionContext = serde_json::from_value(v).unwrap();
        assert_eq!(back, ctx);
    }
}
