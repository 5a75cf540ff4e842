use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] = [Self::Conservative, Self::Moderate, Self::Aggressive];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Aggressive => "Aggressive",
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown risk tolerance: {s}"))
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeHorizon {
    #[serde(rename = "<3 years")]
    Short,
    #[serde(rename = "3-5 years")]
    Medium,
    #[serde(rename = "5-10 years")]
    Long,
    #[serde(rename = ">10 years")]
    VeryLong,
}

impl TimeHorizon {
    pub const ALL: [TimeHorizon; 4] = [Self::Short, Self::Medium, Self::Long, Self::VeryLong];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "<3 years",
            Self::Medium => "3-5 years",
            Self::Long => "5-10 years",
            Self::VeryLong => ">10 years",
        }
    }

    /// Number of years used for projections over this horizon.
    pub fn years(self) -> u32 {
        match self {
            Self::Short => 3,
            Self::Medium => 5,
            Self::Long => 10,
            Self::VeryLong => 20,
        }
    }
}

impl FromStr for TimeHorizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown time horizon: {s}"))
    }
}

impl fmt::Display for TimeHorizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loans {
    Yes,
    No,
}

impl Loans {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn has_loans(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl FromStr for Loans {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Self::Yes),
            "No" => Ok(Self::No),
            other => Err(format!("loans must be Yes or No (got {other})")),
        }
    }
}

/// A validated questionnaire submission. Monetary values are monthly INR.
///
/// Only [`crate::validation::parse_profile`] builds one, so every instance
/// satisfies the field ranges checked there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    salary: f64,
    expenses: f64,
    age: u32,
    risk_tolerance: RiskTolerance,
    time_horizon: TimeHorizon,
    loans: Loans,
    goals: String,
    existing_investments: Option<String>,
    emergency_fund: f64,
}

impl UserProfile {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_unchecked(
        salary: f64,
        expenses: f64,
        age: u32,
        risk_tolerance: RiskTolerance,
        time_horizon: TimeHorizon,
        loans: Loans,
        goals: String,
        existing_investments: Option<String>,
        emergency_fund: f64,
    ) -> Self {
        Self {
            salary,
            expenses,
            age,
            risk_tolerance,
            time_horizon,
            loans,
            goals,
            existing_investments,
            emergency_fund,
        }
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn expenses(&self) -> f64 {
        self.expenses
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn risk_tolerance(&self) -> RiskTolerance {
        self.risk_tolerance
    }

    pub fn time_horizon(&self) -> TimeHorizon {
        self.time_horizon
    }

    pub fn loans(&self) -> Loans {
        self.loans
    }

    pub fn goals(&self) -> &str {
        &self.goals
    }

    pub fn existing_investments(&self) -> Option<&str> {
        self.existing_investments.as_deref()
    }

    pub fn emergency_fund(&self) -> f64 {
        self.emergency_fund
    }

    pub fn snapshot(&self, created_at: DateTime<Utc>) -> ProfileSnapshot {
        ProfileSnapshot {
            salary: self.salary,
            expenses: self.expenses,
            created_at,
        }
    }
}

/// The slice of a previously stored profile used for trend detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub salary: f64,
    pub expenses: f64,
    pub created_at: DateTime<Utc>,
}
