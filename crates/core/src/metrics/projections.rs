use serde::{Deserialize, Serialize};

pub const INFLATION_RATE: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Conservative,
    Moderate,
    Aggressive,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Self::Conservative, Self::Moderate, Self::Aggressive];

    pub fn annual_return(self) -> f64 {
        match self {
            Self::Conservative => 0.08,
            Self::Moderate => 0.12,
            Self::Aggressive => 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario: Scenario,
    pub annual_return: f64,
    pub nominal_value: f64,
    pub real_value: f64,
    pub total_invested: f64,
    pub gains: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projections {
    pub time_horizon_years: u32,
    pub monthly_investment: f64,
    pub inflation_rate: f64,
    pub scenarios: Vec<ScenarioProjection>,
}

/// Future value of an ordinary annuity of `monthly` paid for `years`, with
/// `annual_rate` compounded monthly: `PMT * ((1 + r)^n - 1) / r`.
pub fn sip_future_value(monthly: f64, annual_rate: f64, years: u32) -> f64 {
    let r = annual_rate / 12.0;
    let n = (years * 12) as i32;
    if r == 0.0 {
        return monthly * n as f64;
    }
    monthly * (((1.0 + r).powi(n) - 1.0) / r)
}

/// Monthly contribution needed to reach `target` (inverse of [`sip_future_value`]).
pub fn required_monthly_sip(target: f64, annual_rate: f64, years: u32) -> f64 {
    if years == 0 {
        return 0.0;
    }
    let per_unit = sip_future_value(1.0, annual_rate, years);
    if per_unit == 0.0 {
        return 0.0;
    }
    target / per_unit
}

/// Deflates `nominal` by `inflation` compounded annually over `years`.
pub fn real_value(nominal: f64, inflation: f64, years: u32) -> f64 {
    nominal / (1.0 + inflation).powi(years as i32)
}

pub fn project(monthly_investment: f64, years: u32) -> Projections {
    let months = (years * 12) as f64;
    let scenarios = Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let annual_return = scenario.annual_return();
            let fv = sip_future_value(monthly_investment, annual_return, years);
            let invested = monthly_investment * months;
            ScenarioProjection {
                scenario,
                annual_return,
                nominal_value: fv.round(),
                real_value: real_value(fv, INFLATION_RATE, years).round(),
                total_invested: invested.round(),
                gains: (fv - invested).round(),
            }
        })
        .collect();

    Projections {
        time_horizon_years: years,
        monthly_investment,
        inflation_rate: INFLATION_RATE,
        scenarios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_value_matches_annuity_formula() {
        let fv = sip_future_value(10_000.0, 0.12, 10);
        let expected = 10_000.0 * ((1.01f64.powi(120) - 1.0) / 0.01);
        assert!((fv - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_rate_is_plain_sum() {
        assert_eq!(sip_future_value(500.0, 0.0, 2), 12_000.0);
    }

    #[test]
    fn required_sip_inverts_future_value() {
        let monthly = required_monthly_sip(1_000_000.0, 0.12, 15);
        let fv = sip_future_value(monthly, 0.12, 15);
        assert!((fv - 1_000_000.0).abs() < 1e-3);
        assert_eq!(required_monthly_sip(1_000_000.0, 0.12, 0), 0.0);
    }

    #[test]
    fn projection_has_three_scenarios_with_deflated_values() {
        let p = project(10_000.0, 10);
        assert_eq!(p.scenarios.len(), 3);
        let moderate = &p.scenarios[1];
        assert_eq!(moderate.scenario, Scenario::Moderate);
        assert_eq!(moderate.total_invested, 1_200_000.0);
        let expected_real = sip_future_value(10_000.0, 0.12, 10) / 1.06f64.powi(10);
        assert!((moderate.real_value - expected_real.round()).abs() < 1e-9);
        assert!(moderate.real_value < moderate.nominal_value);
        assert_eq!(moderate.gains, moderate.nominal_value - moderate.total_invested);
    }
}
