use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    EarlyCareer,
    WealthBuilding,
    WealthAccumulation,
    PreRetirement,
    RetirementPlanning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleStage {
    pub stage: LifeStage,
    pub focus_areas: Vec<String>,
    pub risk_capacity: String,
    pub recommended_equity_allocation: u32,
}

pub fn lifecycle_stage(age: u32) -> LifecycleStage {
    let (stage, focus, risk_capacity): (_, [&str; 3], _) = if age < 25 {
        (
            LifeStage::EarlyCareer,
            ["Emergency fund building", "Skill development", "Basic investing"],
            "High",
        )
    } else if age < 35 {
        (
            LifeStage::WealthBuilding,
            ["Aggressive investing", "Career advancement", "Major purchases"],
            "High to Moderate",
        )
    } else if age < 45 {
        (
            LifeStage::WealthAccumulation,
            ["Diversified portfolio", "Education planning", "Insurance review"],
            "Moderate",
        )
    } else if age < 55 {
        (
            LifeStage::PreRetirement,
            ["Retirement planning", "Risk reduction", "Estate planning"],
            "Moderate to Low",
        )
    } else {
        (
            LifeStage::RetirementPlanning,
            ["Capital preservation", "Income generation", "Legacy planning"],
            "Low",
        )
    };

    LifecycleStage {
        stage,
        focus_areas: focus.iter().map(|s| s.to_string()).collect(),
        risk_capacity: risk_capacity.to_string(),
        recommended_equity_allocation: 100u32.saturating_sub(age).max(20),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSuggestion {
    pub kind: String,
    pub description: String,
    pub tax_benefit: String,
    pub allocation: String,
}

impl TaxSuggestion {
    fn new(kind: &str, description: &str, tax_benefit: &str, allocation: &str) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.to_string(),
            tax_benefit: tax_benefit.to_string(),
            allocation: allocation.to_string(),
        }
    }
}

/// Indian tax-advantaged instruments worth considering at this age and capacity.
pub fn tax_suggestions(age: u32, monthly_investment_capacity: f64) -> Vec<TaxSuggestion> {
    let mut out = Vec::new();
    if monthly_investment_capacity * 12.0 >= 50_000.0 {
        out.push(TaxSuggestion::new(
            "ELSS Investment",
            "Invest ₹1.5L in ELSS funds for 80C tax benefits",
            "Up to ₹46,800 tax savings",
            "15-20% of equity allocation",
        ));
    }
    if age < 45 {
        out.push(TaxSuggestion::new(
            "PPF Investment",
            "Maximum ₹1.5L annual PPF investment",
            "Triple tax benefit (EEE status)",
            "5-10% of total investment",
        ));
    }
    if age < 50 {
        out.push(TaxSuggestion::new(
            "NPS Investment",
            "Additional ₹50K in NPS for extra 80CCD(1B) benefit",
            "Additional ₹15,600 tax savings",
            "10-15% for retirement corpus",
        ));
    }
    out
}
