//! Questionnaire input checks. Nothing here fails: callers get every
//! violation at once as display-ready messages.

use crate::domain::profile::{Loans, RiskTolerance, TimeHorizon, UserProfile};
use crate::session::FormStep;
use serde_json::{Map, Value};

pub type FieldMap = Map<String, Value>;

/// Returns every violation in `fields`; an empty list means the input is acceptable.
pub fn validate_fields(fields: &FieldMap) -> Vec<String> {
    parse_profile(fields).err().unwrap_or_default()
}

/// Validates `fields` and builds the profile when there are no violations.
pub fn parse_profile(fields: &FieldMap) -> Result<UserProfile, Vec<String>> {
    let mut errors = Vec::new();

    let salary = match number_field(fields, "salary") {
        Some(v) => {
            if v <= 0.0 {
                errors.push("Salary must be greater than 0.".to_string());
            }
            Some(v)
        }
        None => {
            errors.push("Invalid salary value.".to_string());
            None
        }
    };

    let expenses = match number_field(fields, "expenses") {
        Some(v) => {
            if v < 0.0 {
                errors.push("Expenses cannot be negative.".to_string());
            }
            if salary.map_or(false, |s| v >= s) {
                errors.push(
                    "Expenses should be less than salary for meaningful investment advice."
                        .to_string(),
                );
            }
            Some(v)
        }
        None => {
            errors.push("Invalid expenses value.".to_string());
            None
        }
    };

    let age = match integer_field(fields, "age") {
        Some(v) => {
            if v < 18 {
                errors.push("Age must be 18 or older.".to_string());
            }
            if v > 100 {
                errors.push("Age must be 100 or younger.".to_string());
            }
            u32::try_from(v).ok()
        }
        None => {
            errors.push("Invalid age value.".to_string());
            None
        }
    };

    let risk_tolerance = enum_field::<RiskTolerance>(fields, "risk_tolerance");
    if risk_tolerance.is_none() {
        errors.push(format!(
            "Invalid risk tolerance. Must be one of: {}",
            join_labels(RiskTolerance::ALL.iter().map(|r| r.as_str()))
        ));
    }

    let time_horizon = enum_field::<TimeHorizon>(fields, "time_horizon");
    if time_horizon.is_none() {
        errors.push(format!(
            "Invalid time horizon. Must be one of: {}",
            join_labels(TimeHorizon::ALL.iter().map(|h| h.as_str()))
        ));
    }

    let goals = text_field(fields, "goals");
    if goals.is_none() {
        errors.push("Financial goals cannot be empty.".to_string());
    }

    let loans = enum_field::<Loans>(fields, "loans");
    if loans.is_none() {
        errors.push("Please specify if you have any loans by selecting Yes or No.".to_string());
    }

    let emergency_fund = match fields.get("emergency_fund") {
        None | Some(Value::Null) => Some(0.0),
        Some(v) => match coerce_number(v) {
            Some(n) if n < 0.0 => {
                errors.push("Emergency fund cannot be negative.".to_string());
                None
            }
            Some(n) => Some(n),
            None => {
                errors.push("Invalid emergency fund value.".to_string());
                None
            }
        },
    };

    match (
        salary,
        expenses,
        age,
        risk_tolerance,
        time_horizon,
        loans,
        goals,
        emergency_fund,
    ) {
        (
            Some(salary),
            Some(expenses),
            Some(age),
            Some(risk_tolerance),
            Some(time_horizon),
            Some(loans),
            Some(goals),
            Some(emergency_fund),
        ) if errors.is_empty() => Ok(UserProfile::new_unchecked(
            salary,
            expenses,
            age,
            risk_tolerance,
            time_horizon,
            loans,
            goals,
            text_field(fields, "existing_investments"),
            emergency_fund,
        )),
        _ => Err(errors),
    }
}

/// Lighter per-step checks used while moving through the questionnaire.
pub fn validate_step(step: FormStep, fields: &FieldMap) -> Vec<String> {
    let mut errors = Vec::new();
    for field in step.fields() {
        match *field {
            "salary" if !number_field(fields, "salary").map_or(false, |v| v > 0.0) => {
                errors.push("Please enter a valid monthly salary.".to_string());
            }
            "expenses" if !number_field(fields, "expenses").map_or(false, |v| v >= 0.0) => {
                errors.push("Please enter your minimum monthly expenses.".to_string());
            }
            "age" if !integer_field(fields, "age").map_or(false, |v| v >= 18) => {
                errors.push("Age must be 18 or older.".to_string());
            }
            "risk_tolerance" if enum_field::<RiskTolerance>(fields, field).is_none() => {
                errors.push("Select a valid risk tolerance.".to_string());
            }
            "time_horizon" if enum_field::<TimeHorizon>(fields, field).is_none() => {
                errors.push("Select a valid investment time horizon.".to_string());
            }
            "goals" if text_field(fields, "goals").is_none() => {
                errors.push("Please enter at least one financial goal.".to_string());
            }
            "loans" if enum_field::<Loans>(fields, field).is_none() => {
                errors.push("Please specify if you have any loans.".to_string());
            }
            _ => {}
        }
    }
    errors
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

/// Missing numeric fields count as 0; present but unparseable ones are `None`.
fn number_field(fields: &FieldMap, key: &str) -> Option<f64> {
    match fields.get(key) {
        None => Some(0.0),
        Some(v) => coerce_number(v),
    }
}

fn integer_field(fields: &FieldMap, key: &str) -> Option<i64> {
    match fields.get(key) {
        None => Some(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    }
}

fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn enum_field<T: std::str::FromStr>(fields: &FieldMap, key: &str) -> Option<T> {
    fields.get(key)?.as_str()?.parse::<T>().ok()
}

fn text_field(fields: &FieldMap, key: &str) -> Option<String> {
    let s = fields.get(key)?.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}
