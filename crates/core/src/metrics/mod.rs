//! Per-submission financial metrics. Everything here is pure arithmetic over a
//! validated profile; zero denominators yield 0 instead of failing.

pub mod goals;
pub mod health;
pub mod lifecycle;
pub mod projections;
pub mod risk;
pub mod trends;

use crate::domain::profile::{ProfileSnapshot, RiskTolerance, TimeHorizon, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use goals::{GoalAnalysis, GoalKind};
pub use lifecycle::{LifecycleStage, TaxSuggestion};
pub use projections::Projections;
pub use risk::{RiskCapacity, RiskScoreStrategy};
pub use trends::{ExpenseTrendKind, IncomeTrendKind, Trend};

const LIFESTYLE_MAX_AGE: u32 = 30;
const LIFESTYLE_MIN_DISPOSABLE: f64 = 10_000.0;
const LIFESTYLE_SHARE: f64 = 0.2;
const LIFESTYLE_CAP: f64 = 5_000.0;
const EMERGENCY_TARGET_MONTHS: f64 = 6.0;
const LOAN_DEBT_TO_INCOME: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub salary: f64,
    pub expenses: f64,
    pub disposable_income: f64,
    pub lifestyle_allocation: f64,
    pub investment_capacity: f64,
    /// Advisory only; allocation math uses `investment_capacity`.
    pub adjusted_investment_capacity: f64,

    pub emergency_fund_current: f64,
    pub emergency_fund_months: f64,
    pub emergency_fund_target: f64,
    pub emergency_fund_gap: f64,

    pub financial_health_score: u32,
    pub lifecycle_stage: LifecycleStage,
    pub income_trend: Trend<IncomeTrendKind>,
    pub expense_trend: Trend<ExpenseTrendKind>,

    pub goal_analysis: GoalAnalysis,
    pub tax_suggestions: Vec<TaxSuggestion>,
    pub projections: Projections,

    pub risk_score: f64,
    pub risk_score_strategy: RiskScoreStrategy,
    pub risk_capacity: RiskCapacity,

    pub savings_rate: f64,
    pub expense_ratio: f64,
    pub debt_to_income: f64,

    pub analysis_date: DateTime<Utc>,
    pub user_age: u32,
    pub time_horizon: TimeHorizon,
    pub risk_tolerance: RiskTolerance,
}

/// Derives every metric for `profile`. `history` holds earlier profiles of the
/// same user, newest first; only the first few are used.
pub fn calculate_metrics(
    profile: &UserProfile,
    history: &[ProfileSnapshot],
    strategy: RiskScoreStrategy,
    now: DateTime<Utc>,
) -> FinancialMetrics {
    let salary = profile.salary();
    let expenses = profile.expenses();

    let disposable_income = (salary - expenses).max(0.0);
    let lifestyle_allocation = lifestyle_allocation(profile.age(), disposable_income);
    let investment_capacity = disposable_income - lifestyle_allocation;
    let adjusted_investment_capacity = investment_capacity
        * risk_multiplier(profile.risk_tolerance())
        * horizon_multiplier(profile.time_horizon());

    let emergency_fund_months = ratio(profile.emergency_fund(), expenses);
    let emergency_fund_target = EMERGENCY_TARGET_MONTHS * expenses;
    let emergency_fund_gap = (emergency_fund_target - profile.emergency_fund()).max(0.0);

    let savings_rate = ratio(disposable_income, salary) * 100.0;
    let expense_ratio = ratio(expenses, salary) * 100.0;

    let financial_health_score =
        health::financial_health_score(profile, emergency_fund_months, savings_rate);

    FinancialMetrics {
        salary,
        expenses,
        disposable_income,
        lifestyle_allocation,
        investment_capacity,
        adjusted_investment_capacity,
        emergency_fund_current: profile.emergency_fund(),
        emergency_fund_months: round_to(emergency_fund_months, 1),
        emergency_fund_target,
        emergency_fund_gap,
        financial_health_score,
        lifecycle_stage: lifecycle::lifecycle_stage(profile.age()),
        income_trend: trends::income_trend(history, salary),
        expense_trend: trends::expense_trend(history, expenses),
        goal_analysis: goals::analyze_goals(profile.goals(), profile.age(), disposable_income),
        tax_suggestions: lifecycle::tax_suggestions(profile.age(), investment_capacity),
        projections: projections::project(investment_capacity, profile.time_horizon().years()),
        risk_score: strategy.score(
            profile.risk_tolerance(),
            profile.age(),
            profile.time_horizon(),
        ),
        risk_score_strategy: strategy,
        risk_capacity: risk::assess_risk_capacity(salary, expenses, profile.age()),
        savings_rate,
        expense_ratio,
        debt_to_income: if profile.loans().has_loans() {
            LOAN_DEBT_TO_INCOME
        } else {
            0.0
        },
        analysis_date: now,
        user_age: profile.age(),
        time_horizon: profile.time_horizon(),
        risk_tolerance: profile.risk_tolerance(),
    }
}

/// Discretionary carve-out for young earners with room to spare.
pub fn lifestyle_allocation(age: u32, disposable_income: f64) -> f64 {
    if age <= LIFESTYLE_MAX_AGE && disposable_income > LIFESTYLE_MIN_DISPOSABLE {
        (disposable_income * LIFESTYLE_SHARE).min(LIFESTYLE_CAP)
    } else {
        0.0
    }
}

fn risk_multiplier(risk: RiskTolerance) -> f64 {
    match risk {
        RiskTolerance::Conservative => 0.7,
        RiskTolerance::Moderate => 1.0,
        RiskTolerance::Aggressive => 1.3,
    }
}

fn horizon_multiplier(horizon: TimeHorizon) -> f64 {
    match horizon {
        TimeHorizon::Short => 0.6,
        TimeHorizon::Medium => 0.9,
        TimeHorizon::Long => 1.1,
        TimeHorizon::VeryLong => 1.3,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
