use crate::domain::profile::{RiskTolerance, TimeHorizon};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Two risk-score scales are in use. `Simple` keeps scores near 0.4..4.2 and
/// lines up with the risk-level label thresholds; `Enhanced` spreads scores
/// over roughly 0.3..12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskScoreStrategy {
    #[default]
    Simple,
    Enhanced,
}

impl RiskScoreStrategy {
    pub fn score(self, risk: RiskTolerance, age: u32, horizon: TimeHorizon) -> f64 {
        match self {
            Self::Simple => simple_risk_score(risk, age, horizon),
            Self::Enhanced => enhanced_risk_score(risk, age, horizon),
        }
    }
}

impl FromStr for RiskScoreStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "enhanced" => Ok(Self::Enhanced),
            other => Err(format!("unknown risk score strategy: {other}")),
        }
    }
}

pub fn simple_risk_score(risk: RiskTolerance, age: u32, horizon: TimeHorizon) -> f64 {
    let base = match risk {
        RiskTolerance::Conservative => 1.0,
        RiskTolerance::Moderate => 2.0,
        RiskTolerance::Aggressive => 3.0,
    };
    let age_factor = ((100.0 - age as f64) / 100.0).max(0.5);
    let horizon_factor = match horizon {
        TimeHorizon::Short => 0.8,
        TimeHorizon::Medium => 1.0,
        TimeHorizon::Long => 1.2,
        TimeHorizon::VeryLong => 1.4,
    };
    super::round_to(base * age_factor * horizon_factor, 2)
}

pub fn enhanced_risk_score(risk: RiskTolerance, age: u32, horizon: TimeHorizon) -> f64 {
    let base = match risk {
        RiskTolerance::Conservative => 2.0,
        RiskTolerance::Moderate => 5.0,
        RiskTolerance::Aggressive => 8.0,
    };
    let age_factor = ((80.0 - age as f64) / 80.0).max(0.3);
    let horizon_factor = match horizon {
        TimeHorizon::Short => 0.5,
        TimeHorizon::Medium => 0.8,
        TimeHorizon::Long => 1.2,
        TimeHorizon::VeryLong => 1.5,
    };
    super::round_to(base * age_factor * horizon_factor, 1)
}

/// Whether the stated tolerance fits the usual band for the age.
pub fn is_age_appropriate_risk(age: u32, risk: RiskTolerance) -> bool {
    use RiskTolerance::*;
    if age < 30 {
        matches!(risk, Moderate | Aggressive)
    } else if age < 50 {
        matches!(risk, Moderate | Conservative)
    } else {
        risk == Conservative
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCapacity {
    High,
    Medium,
    Low,
}

impl RiskCapacity {
    pub fn description(self) -> &'static str {
        match self {
            Self::High => "High - Can take significant investment risks",
            Self::Medium => "Medium - Moderate risk capacity",
            Self::Low => "Low - Should focus on capital preservation",
        }
    }
}

/// Financial capacity to absorb losses, from income level, age and expense ratio.
pub fn assess_risk_capacity(salary: f64, expenses: f64, age: u32) -> RiskCapacity {
    let income = if salary > 100_000.0 {
        RiskCapacity::High
    } else if salary > 50_000.0 {
        RiskCapacity::Medium
    } else {
        RiskCapacity::Low
    };
    let by_age = if age < 35 {
        RiskCapacity::High
    } else if age < 50 {
        RiskCapacity::Medium
    } else {
        RiskCapacity::Low
    };
    let expense_ratio = if salary > 0.0 { expenses / salary } else { 1.0 };
    let by_expenses = if expense_ratio < 0.6 {
        RiskCapacity::High
    } else if expense_ratio < 0.8 {
        RiskCapacity::Medium
    } else {
        RiskCapacity::Low
    };

    let factors = [income, by_age, by_expenses];
    let high = factors.iter().filter(|f| **f == RiskCapacity::High).count();
    let medium = factors.iter().filter(|f| **f == RiskCapacity::Medium).count();
    if high >= 2 {
        RiskCapacity::High
    } else if high + medium >= 2 {
        RiskCapacity::Medium
    } else {
        RiskCapacity::Low
    }
}
