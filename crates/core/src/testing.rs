use crate::domain::profile::UserProfile;
use crate::validation::parse_profile;
use serde_json::{json, Value};

pub(crate) fn reference_fields() -> Value {
    json!({
        "salary": 50000,
        "expenses": 25000,
        "age": 30,
        "risk_tolerance": "Moderate",
        "time_horizon": "5-10 years",
        "loans": "No",
        "goals": "Retirement planning and buying a house",
        "emergency_fund": 50000,
    })
}

pub(crate) fn reference_profile() -> UserProfile {
    profile_with(json!({}))
}

/// Reference answers with `overrides` applied on top.
pub(crate) fn profile_with(overrides: Value) -> UserProfile {
    let mut fields = reference_fields();
    if let (Some(base), Some(extra)) = (fields.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    let map = fields.as_object().cloned().unwrap_or_default();
    parse_profile(&map).unwrap_or_else(|errors| panic!("invalid test profile: {errors:?}"))
}
