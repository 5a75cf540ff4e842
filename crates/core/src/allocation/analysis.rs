use super::AssetClass;
use crate::metrics::projections::sip_future_value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_EXPECTED_RETURN: f64 = 8.0;
const DEFAULT_VOLATILITY: f64 = 15.0;

/// Long-run reference figures per asset class, in percent per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReturnRow {
    pub asset: AssetClass,
    pub expected_return: f64,
    pub volatility: f64,
}

pub fn risk_return_table() -> Vec<RiskReturnRow> {
    AssetClass::ALL
        .into_iter()
        .map(|asset| RiskReturnRow {
            asset,
            expected_return: expected_return(asset),
            volatility: volatility(asset),
        })
        .collect()
}

fn expected_return(asset: AssetClass) -> f64 {
    match asset {
        AssetClass::LargeCapStocks => 12.0,
        AssetClass::MidCapStocks => 14.0,
        AssetClass::SmallCapStocks => 16.0,
        AssetClass::InternationalStocks => 10.0,
        AssetClass::GovernmentBonds => 7.0,
        AssetClass::CorporateBonds => 8.5,
        AssetClass::GoldCommodities => 8.0,
        AssetClass::CashFd => 6.0,
        AssetClass::RealEstate => 11.0,
    }
}

fn volatility(asset: AssetClass) -> f64 {
    match asset {
        AssetClass::LargeCapStocks => 15.0,
        AssetClass::MidCapStocks => 20.0,
        AssetClass::SmallCapStocks => 25.0,
        AssetClass::InternationalStocks => 18.0,
        AssetClass::GovernmentBonds => 5.0,
        AssetClass::CorporateBonds => 7.0,
        AssetClass::GoldCommodities => 20.0,
        AssetClass::CashFd => 1.0,
        AssetClass::RealEstate => 12.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortfolioRiskClass {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub equity_percent: f64,
    pub debt_percent: f64,
    pub alternative_percent: f64,
    pub risk_class: PortfolioRiskClass,
    pub expected_annual_return: f64,
    pub estimated_volatility: f64,
    pub diversification_score: u32,
    pub liquid_percent: f64,
    pub illiquid_percent: f64,
}

/// Summarises any label -> percent mapping. Labels are matched exactly, then by
/// keyword; anything still unknown counts as an alternative with default
/// return and volatility.
pub fn portfolio_analysis(allocations: &BTreeMap<String, f64>) -> PortfolioAnalysis {
    let mut equity = 0.0;
    let mut debt = 0.0;
    let mut alternative = 0.0;
    let mut weighted_return = 0.0;
    let mut weighted_volatility = 0.0;
    let mut liquid = 0.0;
    let mut illiquid = 0.0;

    for (label, pct) in allocations {
        let asset = AssetClass::classify_label(label);
        match asset {
            Some(a) if a.is_equity() => equity += pct,
            Some(a) if a.is_debt() => debt += pct,
            _ => alternative += pct,
        }
        weighted_return += pct * asset.map_or(DEFAULT_EXPECTED_RETURN, expected_return) / 100.0;
        weighted_volatility += pct * asset.map_or(DEFAULT_VOLATILITY, volatility) / 100.0;
        match asset {
            Some(AssetClass::CashFd | AssetClass::LargeCapStocks | AssetClass::GovernmentBonds) => {
                liquid += pct
            }
            Some(AssetClass::RealEstate | AssetClass::SmallCapStocks) => illiquid += pct,
            _ => {}
        }
    }

    let risk_class = if equity >= 70.0 {
        PortfolioRiskClass::Aggressive
    } else if equity >= 50.0 {
        PortfolioRiskClass::Moderate
    } else {
        PortfolioRiskClass::Conservative
    };

    PortfolioAnalysis {
        equity_percent: round1(equity),
        debt_percent: round1(debt),
        alternative_percent: round1(alternative),
        risk_class,
        expected_annual_return: round1(weighted_return),
        estimated_volatility: round1(weighted_volatility),
        diversification_score: diversification_score(allocations),
        liquid_percent: round1(liquid),
        illiquid_percent: round1(illiquid),
    }
}

/// 0..=100: up to 50 for the number of funded buckets, up to 50 for low
/// concentration (Herfindahl index).
pub fn diversification_score(allocations: &BTreeMap<String, f64>) -> u32 {
    if allocations.is_empty() {
        return 0;
    }
    let funded = allocations.values().filter(|v| **v > 0.0).count() as f64;
    let herfindahl: f64 = allocations.values().map(|v| (v / 100.0).powi(2)).sum();
    let asset_score = (funded * 8.0).min(50.0);
    let concentration_score = (50.0 - (herfindahl - 0.2) * 100.0).clamp(0.0, 50.0);
    (asset_score + concentration_score) as u32
}

/// Historical shock applied per asset group, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Shock {
    name: &'static str,
    equity: f64,
    debt: f64,
    gold: f64,
}

const SHOCKS: [Shock; 3] = [
    Shock { name: "2008 Financial Crisis", equity: -40.0, debt: 10.0, gold: 20.0 },
    Shock { name: "COVID-19 Crash", equity: -25.0, debt: 5.0, gold: 15.0 },
    Shock { name: "Inflation Spike", equity: -10.0, debt: -15.0, gold: 30.0 },
];

const MIN_RECOVERY_MONTHS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    pub scenario: String,
    pub impact_percent: f64,
    /// Value of one year of contributions after the shock.
    pub portfolio_value: f64,
    pub recovery_months: u32,
}

/// Replays the historical shocks against `allocations`, assuming one year of
/// `monthly_investment` is already invested. Cash, real estate and unknown
/// labels are left untouched.
pub fn stress_test(allocations: &BTreeMap<String, f64>, monthly_investment: f64) -> Vec<StressResult> {
    let mut equity = 0.0;
    let mut debt = 0.0;
    let mut gold = 0.0;
    for (label, pct) in allocations {
        match AssetClass::classify_label(label) {
            Some(a) if a.is_equity() => equity += pct,
            Some(a) if a.is_debt() => debt += pct,
            Some(AssetClass::GoldCommodities) => gold += pct,
            _ => {}
        }
    }

    let invested = monthly_investment * 12.0;
    SHOCKS
        .iter()
        .map(|shock| {
            let impact = (equity * shock.equity + debt * shock.debt + gold * shock.gold) / 100.0;
            StressResult {
                scenario: shock.name.to_string(),
                impact_percent: round1(impact),
                portfolio_value: (invested * (1.0 + impact / 100.0)).round(),
                recovery_months: (impact.abs() * 2.0).max(MIN_RECOVERY_MONTHS).round() as u32,
            }
        })
        .collect()
}

const BASE_RETURN: f64 = 0.12;
const RETURN_LEVELS: [f64; 5] = [0.08, 0.10, 0.12, 0.14, 0.16];
const CONTRIBUTION_LEVELS: [f64; 5] = [0.8, 0.9, 1.0, 1.1, 1.2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    /// Annual return, as a fraction.
    AnnualReturn,
    /// Multiplier on the monthly contribution, at the base return.
    Contribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub variable: SensitivityVariable,
    pub level: f64,
    pub future_value: f64,
}

/// Future value of the SIP when the return or the contribution moves around
/// the 12% base case.
pub fn sensitivity(monthly_investment: f64, years: u32) -> Vec<SensitivityPoint> {
    let by_return = RETURN_LEVELS.into_iter().map(|rate| SensitivityPoint {
        variable: SensitivityVariable::AnnualReturn,
        level: rate,
        future_value: sip_future_value(monthly_investment, rate, years).round(),
    });
    let by_contribution = CONTRIBUTION_LEVELS.into_iter().map(|mult| SensitivityPoint {
        variable: SensitivityVariable::Contribution,
        level: mult,
        future_value: sip_future_value(monthly_investment * mult, BASE_RETURN, years).round(),
    });
    by_return.chain(by_contribution).collect()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::generate_allocation;
    use crate::domain::profile::{RiskTolerance, TimeHorizon};

    #[test]
    fn analyses_generated_allocation() {
        let a = generate_allocation(30, RiskTolerance::Moderate, TimeHorizon::Long, 83);
        let analysis = portfolio_analysis(&a.labelled());
        assert_eq!(analysis.risk_class, PortfolioRiskClass::Aggressive);
        let split = analysis.equity_percent + analysis.debt_percent + analysis.alternative_percent;
        assert!((split - 100.0).abs() < 0.2);
        assert!(analysis.expected_annual_return > 8.0);
        assert!(analysis.diversification_score > 50);
    }

    #[test]
    fn free_text_labels_map_to_asset_classes() {
        let allocations = BTreeMap::from([
            ("Stocks (ETFs)".to_string(), 50.0),
            ("Bonds".to_string(), 25.0),
            ("Real Estate".to_string(), 15.0),
            ("Cash Equivalents".to_string(), 10.0),
        ]);
        let analysis = portfolio_analysis(&allocations);
        assert_eq!(analysis.equity_percent, 50.0);
        assert_eq!(analysis.debt_percent, 25.0);
        assert_eq!(analysis.alternative_percent, 25.0);
        assert_eq!(analysis.risk_class, PortfolioRiskClass::Moderate);
        assert_eq!(analysis.liquid_percent, 85.0);
        assert_eq!(analysis.illiquid_percent, 15.0);
    }

    #[test]
    fn unknown_labels_use_defaults() {
        let allocations = BTreeMap::from([
            ("Venture Fund".to_string(), 50.0),
            ("Art".to_string(), 50.0),
        ]);
        let analysis = portfolio_analysis(&allocations);
        assert_eq!(analysis.alternative_percent, 100.0);
        assert_eq!(analysis.expected_annual_return, 8.0);
        assert_eq!(analysis.risk_class, PortfolioRiskClass::Conservative);
    }

    #[test]
    fn concentration_lowers_diversification() {
        let single = BTreeMap::from([("Cash/FD".to_string(), 100.0)]);
        let spread: BTreeMap<_, _> = AssetClass::ALL
            .iter()
            .take(5)
            .map(|a| (a.label().to_string(), 20.0))
            .collect();
        assert!(diversification_score(&single) < diversification_score(&spread));
        assert_eq!(diversification_score(&BTreeMap::new()), 0);
    }

    #[test]
    fn stress_test_applies_each_shock() {
        let allocations = BTreeMap::from([
            ("Equity".to_string(), 70.0),
            ("Debt".to_string(), 20.0),
            ("Gold/Commodities".to_string(), 10.0),
        ]);
        let results = stress_test(&allocations, 20000.0);
        assert_eq!(results.len(), 3);

        // 70 * -40% + 20 * 10% + 10 * 20% = -24%.
        let crisis = &results[0];
        assert_eq!(crisis.scenario, "2008 Financial Crisis");
        assert_eq!(crisis.impact_percent, -24.0);
        assert_eq!(crisis.portfolio_value, 182400.0);
        assert_eq!(crisis.recovery_months, 48);

        // 70 * -10% + 20 * -15% + 10 * 30% = -7%.
        assert_eq!(results[2].impact_percent, -7.0);
        assert_eq!(results[2].recovery_months, 14);
    }

    #[test]
    fn cash_only_portfolio_rides_out_shocks() {
        let allocations = BTreeMap::from([("Cash/FD".to_string(), 100.0)]);
        for r in stress_test(&allocations, 1000.0) {
            assert_eq!(r.impact_percent, 0.0);
            assert_eq!(r.portfolio_value, 12000.0);
            assert_eq!(r.recovery_months, 6);
        }
    }

    #[test]
    fn sensitivity_grows_with_return_and_contribution() {
        let points = sensitivity(10000.0, 10);
        assert_eq!(points.len(), 10);
        let (by_return, by_contribution): (Vec<&SensitivityPoint>, Vec<&SensitivityPoint>) = points
            .iter()
            .partition(|p| p.variable == SensitivityVariable::AnnualReturn);
        assert!(by_return.windows(2).all(|w| w[0].future_value < w[1].future_value));
        assert!(by_contribution.windows(2).all(|w| w[0].future_value < w[1].future_value));

        // Both axes meet at the 12% base case with the full contribution.
        let base = sip_future_value(10000.0, 0.12, 10).round();
        assert_eq!(by_return[2].future_value, base);
        assert_eq!(by_contribution[2].future_value, base);
    }

    #[test]
    fn reference_table_covers_every_asset() {
        let table = risk_return_table();
        assert_eq!(table.len(), AssetClass::ALL.len());
        assert!(table.iter().all(|r| r.expected_return > 0.0 && r.volatility > 0.0));
    }
}
