use crate::advisor::AdvisorRequest;
use crate::domain::profile::UserProfile;
use crate::metrics::FinancialMetrics;

const SYSTEM: &str = "\
You are a careful financial advisor focused on portfolio diversification.
- Never recommend individual stocks or trading strategies.
- Talk about asset classes and sectors, risk management and goal-based planning.
- Explain your reasoning in plain, educational language.
- Use only the information the user provided.";

const RULES: &str = "\
Investing rules to draw on:
1. Rule of 100: roughly 100 minus age in equities, the rest in fixed income.
2. Hold 3 to 6 months of expenses as an emergency fund before investing.
3. Diversify across equities, bonds, real estate and gold.
4. Match the portfolio to the stated risk tolerance.
5. Money needed soon belongs in conservative assets; long horizons can take more risk.
6. Review and rebalance regularly.
7. Invest on a schedule instead of timing the market.
8. Prefer low-cost index funds and ETFs.
9. Keep tax treatment of gains in mind.
10. Tie every investment to a stated goal.";

const RESPONSE_FORMAT: &str = "Respond strictly as one JSON object of the form \
{\"narrative\": string, \"allocations\": {label: number}, \"next_steps\": string}. \
Allocation percentages must add up to 100.";

/// Deterministic prompt for one profile: the same inputs always produce the
/// same request.
pub fn build_request(profile: &UserProfile, metrics: &FinancialMetrics) -> AdvisorRequest {
    AdvisorRequest {
        system: SYSTEM.to_string(),
        user: user_prompt(profile, metrics),
    }
}

fn user_prompt(profile: &UserProfile, metrics: &FinancialMetrics) -> String {
    format!(
        "User profile:\n\
- Monthly salary: {salary} (INR)\n\
- Monthly expenses: {expenses} (INR)\n\
- Loans: {loans}\n\
- Age: {age}\n\
- Risk tolerance: {risk}\n\
- Time horizon: {horizon}\n\
- Existing investments: {existing}\n\
- Emergency fund: {fund} (INR)\n\
- Goals: {goals}\n\n\
Computed metrics:\n\
- Investment capacity: {capacity} (INR per month)\n\
- Risk score: {risk_score}\n\
- Financial health score: {health}/100\n\
- Emergency fund coverage: {months} months\n\
- Priority goal: {priority}\n\n\
All monetary values are in INR.\n\n\
{RULES}\n\n\
Cite the rules that matter most for this user, give tips tailored to their age, \
risk tolerance, goals and horizon, propose a percentage allocation by asset class, \
a short narrative explaining it, and 2-3 concrete next steps.\n\n\
{RESPONSE_FORMAT}",
        salary = profile.salary(),
        expenses = profile.expenses(),
        loans = profile.loans().as_str(),
        age = profile.age(),
        risk = profile.risk_tolerance(),
        horizon = profile.time_horizon(),
        existing = profile.existing_investments().unwrap_or("None"),
        fund = profile.emergency_fund(),
        goals = profile.goals(),
        capacity = metrics.investment_capacity,
        risk_score = metrics.risk_score,
        health = metrics.financial_health_score,
        months = metrics.emergency_fund_months,
        priority = metrics.goal_analysis.priority_goal,
    )
}
