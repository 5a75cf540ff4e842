use crate::domain::profile::UserProfile;
use crate::domain::recommendation::{determine_risk_level, Recommendation};
use crate::metrics::FinancialMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const REQUIRED_FIELDS: [&str; 3] = ["allocations", "narrative", "next_steps"];
const MIN_TEXT_LEN: usize = 10;
const ALLOCATION_TOTAL_RANGE: std::ops::RangeInclusive<f64> = 99.0..=101.0;

/// Shape-checked advisor output: allocation labels with percentages plus
/// free-text guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorPayload {
    pub allocations: BTreeMap<String, f64>,
    pub narrative: String,
    pub next_steps: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} must be a string")]
    NotAString(&'static str),
    #[error("{field} must be at least 10 characters")]
    TooShort { field: &'static str },
    #[error("Allocations must be a dictionary")]
    NotAMapping,
    #[error("Allocation values must be numbers (label {label:?})")]
    NonNumericAllocation { label: String },
    #[error("Duplicate allocation label {label:?}")]
    DuplicateAllocation { label: String },
    #[error("Allocations cannot be empty")]
    EmptyAllocations,
    #[error("Allocation for {label:?} is negative ({value})")]
    NegativeAllocation { label: String, value: f64 },
    #[error("Allocation percentages must sum to 100% (got {total}%)")]
    AllocationTotal { total: f64 },
}

impl PayloadError {
    /// Name of the offending payload field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NotAnObject => "payload",
            Self::MissingField(f) | Self::NotAString(f) => *f,
            Self::TooShort { field } => *field,
            _ => "allocations",
        }
    }
}

/// Checks that `value` carries the three advisor keys with the right types.
pub fn validate_payload(value: &Value) -> Result<AdvisorPayload, PayloadError> {
    let obj = value.as_object().ok_or(PayloadError::NotAnObject)?;
    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(PayloadError::MissingField(field));
        }
    }

    let raw_allocations = obj["allocations"]
        .as_object()
        .ok_or(PayloadError::NotAMapping)?;
    let mut allocations = BTreeMap::new();
    for (label, v) in raw_allocations {
        let pct = v.as_f64().ok_or_else(|| PayloadError::NonNumericAllocation {
            label: label.clone(),
        })?;
        let key = label.trim().to_string();
        if allocations.contains_key(&key) {
            return Err(PayloadError::DuplicateAllocation { label: key });
        }
        allocations.insert(key, pct);
    }

    let narrative = text_field(obj, "narrative")?;
    let next_steps = text_field(obj, "next_steps")?;

    Ok(AdvisorPayload {
        allocations,
        narrative,
        next_steps,
    })
}

fn text_field(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, PayloadError> {
    let s = obj[field]
        .as_str()
        .ok_or(PayloadError::NotAString(field))?
        .trim()
        .to_string();
    if s.chars().count() < MIN_TEXT_LEN {
        return Err(PayloadError::TooShort { field });
    }
    Ok(s)
}

impl AdvisorPayload {
    pub fn allocation_total(&self) -> f64 {
        self.allocations.values().sum()
    }

    pub fn validate_and_into_recommendation(
        self,
        risk_score: f64,
        generated_at: DateTime<Utc>,
    ) -> Result<Recommendation, PayloadError> {
        if self.allocations.is_empty() {
            return Err(PayloadError::EmptyAllocations);
        }
        if let Some((label, value)) = self.allocations.iter().find(|(_, v)| **v < 0.0) {
            return Err(PayloadError::NegativeAllocation {
                label: label.clone(),
                value: *value,
            });
        }
        let total = self.allocation_total();
        if !ALLOCATION_TOTAL_RANGE.contains(&total) {
            return Err(PayloadError::AllocationTotal { total });
        }

        Ok(Recommendation::from_parts(
            self.allocations,
            self.narrative,
            self.next_steps,
            determine_risk_level(risk_score),
            generated_at,
        ))
    }
}

/// Combines computed metrics with an advisor payload into the final
/// recommendation.
pub fn assemble(
    profile: &UserProfile,
    metrics: &FinancialMetrics,
    payload: &Value,
    generated_at: DateTime<Utc>,
) -> Result<Recommendation, PayloadError> {
    let parsed = validate_payload(payload)?;
    let recommendation =
        parsed.validate_and_into_recommendation(metrics.risk_score, generated_at)?;
    tracing::debug!(
        age = profile.age(),
        risk_tolerance = %profile.risk_tolerance(),
        risk_score = metrics.risk_score,
        risk_level = %recommendation.risk_level(),
        buckets = recommendation.allocations().len(),
        "assembled recommendation"
    );
    Ok(recommendation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::RiskLevel;
    use crate::metrics::{calculate_metrics, RiskScoreStrategy};
    use crate::testing::reference_profile;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn valid_payload() -> Value {
        json!({
            "narrative": "Keep a balanced mix of equity and debt funds.",
            "allocations": {"Equity": 60, "Debt": 30.5, "Gold": 9.5},
            "next_steps": "Start a monthly SIP and top up the emergency fund."
        })
    }

    #[test]
    fn assembles_valid_payload() {
        let profile = reference_profile();
        let metrics = calculate_metrics(&profile, &[], RiskScoreStrategy::Simple, now());
        let rec = assemble(&profile, &metrics, &valid_payload(), now()).unwrap();
        assert_eq!(rec.allocations().len(), 3);
        assert_eq!(rec.allocations()["Debt"], 30.5);
        assert_eq!(rec.generated_at(), now());
        // Simple score for the reference profile: 2.0 * 0.7 * 1.2 = 1.68.
        assert_eq!(rec.risk_level(), RiskLevel::ModerateConservative);
    }

    #[test]
    fn rejects_missing_narrative_by_name() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("narrative");
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(err, PayloadError::MissingField("narrative"));
        assert_eq!(err.field(), "narrative");
        assert_eq!(err.to_string(), "Missing required field: narrative");
    }

    #[test]
    fn rejects_non_numeric_allocation() {
        let payload = json!({
            "narrative": "Keep a balanced mix of equity and debt funds.",
            "allocations": {"Equity": "sixty", "Debt": 40},
            "next_steps": "Start a monthly SIP and top up the emergency fund."
        });
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(
            err,
            PayloadError::NonNumericAllocation {
                label: "Equity".to_string()
            }
        );
    }

    #[test]
    fn rejects_labels_that_collide_after_trimming() {
        let payload = json!({
            "narrative": "Keep a balanced mix of equity and debt funds.",
            "allocations": {"Equity": 60, " Equity ": 40},
            "next_steps": "Start a monthly SIP and top up the emergency fund."
        });
        let err = validate_payload(&payload).unwrap_err();
        assert_eq!(
            err,
            PayloadError::DuplicateAllocation {
                label: "Equity".to_string()
            }
        );
        assert_eq!(err.field(), "allocations");
    }

    #[test]
    fn rejects_allocations_that_are_not_a_mapping() {
        let payload = json!({
            "narrative": "Keep a balanced mix of equity and debt funds.",
            "allocations": [60, 40],
            "next_steps": "Start a monthly SIP and top up the emergency fund."
        });
        assert_eq!(validate_payload(&payload).unwrap_err(), PayloadError::NotAMapping);
    }

    #[test]
    fn rejects_totals_outside_tolerance() {
        let payload = AdvisorPayload {
            allocations: BTreeMap::from([("Equity".to_string(), 60.0), ("Debt".to_string(), 30.0)]),
            narrative: "Keep a balanced mix.".to_string(),
            next_steps: "Start a monthly SIP.".to_string(),
        };
        let err = payload.validate_and_into_recommendation(2.0, now()).unwrap_err();
        assert!(matches!(err, PayloadError::AllocationTotal { total } if total == 90.0));
    }

    #[test]
    fn accepts_totals_within_tolerance() {
        let payload = AdvisorPayload {
            allocations: BTreeMap::from([("Equity".to_string(), 60.4), ("Debt".to_string(), 40.0)]),
            narrative: "Keep a balanced mix.".to_string(),
            next_steps: "Start a monthly SIP.".to_string(),
        };
        assert!(payload.validate_and_into_recommendation(2.0, now()).is_ok());
    }

    #[test]
    fn rejects_negative_allocation() {
        let payload = AdvisorPayload {
            allocations: BTreeMap::from([("Equity".to_string(), 110.0), ("Cash".to_string(), -10.0)]),
            narrative: "Keep a balanced mix.".to_string(),
            next_steps: "Start a monthly SIP.".to_string(),
        };
        let err = payload.validate_and_into_recommendation(2.0, now()).unwrap_err();
        assert_eq!(err.field(), "allocations");
        assert!(matches!(err, PayloadError::NegativeAllocation { .. }));
    }
}
