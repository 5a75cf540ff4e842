//! Rule-based asset allocation: an age-driven equity share, nudged by risk
//! tolerance, horizon and financial health, then spread over fixed templates.

pub mod analysis;

use crate::domain::profile::{RiskTolerance, TimeHorizon};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MIN_EQUITY: i32 = 10;
pub const MAX_EQUITY: i32 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    #[serde(rename = "Large Cap Stocks")]
    LargeCapStocks,
    #[serde(rename = "Mid Cap Stocks")]
    MidCapStocks,
    #[serde(rename = "Small Cap Stocks")]
    SmallCapStocks,
    #[serde(rename = "International Stocks")]
    InternationalStocks,
    #[serde(rename = "Government Bonds")]
    GovernmentBonds,
    #[serde(rename = "Corporate Bonds")]
    CorporateBonds,
    #[serde(rename = "Gold/Commodities")]
    GoldCommodities,
    #[serde(rename = "Cash/FD")]
    CashFd,
    #[serde(rename = "Real Estate")]
    RealEstate,
}

impl AssetClass {
    pub const ALL: [AssetClass; 9] = [
        Self::LargeCapStocks,
        Self::MidCapStocks,
        Self::SmallCapStocks,
        Self::InternationalStocks,
        Self::GovernmentBonds,
        Self::CorporateBonds,
        Self::GoldCommodities,
        Self::CashFd,
        Self::RealEstate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LargeCapStocks => "Large Cap Stocks",
            Self::MidCapStocks => "Mid Cap Stocks",
            Self::SmallCapStocks => "Small Cap Stocks",
            Self::InternationalStocks => "International Stocks",
            Self::GovernmentBonds => "Government Bonds",
            Self::CorporateBonds => "Corporate Bonds",
            Self::GoldCommodities => "Gold/Commodities",
            Self::CashFd => "Cash/FD",
            Self::RealEstate => "Real Estate",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }

    /// Exact label first, then keywords for free-text labels such as
    /// "Stocks (ETFs)" or "Cash Equivalents".
    pub fn classify_label(label: &str) -> Option<Self> {
        if let Some(asset) = Self::from_label(label.trim()) {
            return Some(asset);
        }
        let l = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| l.contains(w));
        if has(&["real estate", "reit", "property"]) {
            Some(Self::RealEstate)
        } else if has(&["gold", "commodit"]) {
            Some(Self::GoldCommodities)
        } else if has(&["international", "global", "foreign"]) {
            Some(Self::InternationalStocks)
        } else if has(&["small cap"]) {
            Some(Self::SmallCapStocks)
        } else if has(&["mid cap"]) {
            Some(Self::MidCapStocks)
        } else if has(&["stock", "equit", "etf", "share", "index"]) {
            Some(Self::LargeCapStocks)
        } else if has(&["corporate"]) {
            Some(Self::CorporateBonds)
        } else if has(&["bond", "debt", "gilt", "fixed income"]) {
            Some(Self::GovernmentBonds)
        } else if has(&["cash", "fd", "deposit", "liquid", "money market"]) {
            Some(Self::CashFd)
        } else {
            None
        }
    }

    pub fn is_equity(self) -> bool {
        matches!(
            self,
            Self::LargeCapStocks
                | Self::MidCapStocks
                | Self::SmallCapStocks
                | Self::InternationalStocks
        )
    }

    pub fn is_debt(self) -> bool {
        matches!(self, Self::GovernmentBonds | Self::CorporateBonds)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationTemplate {
    Aggressive,
    Moderate,
    Conservative,
}

impl AllocationTemplate {
    pub fn for_equity(equity_percent: i32) -> Self {
        if equity_percent >= 60 {
            Self::Aggressive
        } else if equity_percent >= 40 {
            Self::Moderate
        } else {
            Self::Conservative
        }
    }

    /// Un-normalised bucket weights: fixed shares of the equity and residual
    /// percentages, each with a floor.
    fn raw_buckets(self, equity_percent: i32) -> Vec<(AssetClass, f64)> {
        use AssetClass::*;
        let e = equity_percent as f64;
        let rest = 100.0 - e;
        match self {
            Self::Aggressive => vec![
                (LargeCapStocks, (e * 0.4).max(25.0)),
                (MidCapStocks, (e * 0.25).max(15.0)),
                (SmallCapStocks, (e * 0.15).max(10.0)),
                (InternationalStocks, (e * 0.2).max(10.0)),
                (GovernmentBonds, (rest * 0.6).max(10.0)),
                (CorporateBonds, (rest * 0.3).max(5.0)),
                (GoldCommodities, 5.0),
                (CashFd, (rest * 0.1).max(5.0)),
            ],
            Self::Moderate => vec![
                (LargeCapStocks, (e * 0.5).max(20.0)),
                (MidCapStocks, (e * 0.3).max(10.0)),
                (InternationalStocks, (e * 0.2).max(10.0)),
                (GovernmentBonds, (rest * 0.5).max(15.0)),
                (CorporateBonds, (rest * 0.3).max(10.0)),
                (GoldCommodities, 10.0),
                (CashFd, (rest * 0.2).max(10.0)),
            ],
            Self::Conservative => vec![
                (LargeCapStocks, (e * 0.6).max(15.0)),
                (MidCapStocks, (e * 0.4).max(5.0)),
                (GovernmentBonds, (rest * 0.4).max(25.0)),
                (CorporateBonds, (rest * 0.3).max(20.0)),
                (GoldCommodities, 15.0),
                (CashFd, (rest * 0.3).max(15.0)),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAllocation {
    pub equity_percent: i32,
    pub template: AllocationTemplate,
    /// Percentages to one decimal, summing to exactly 100.
    pub buckets: Vec<(AssetClass, f64)>,
}

impl SuggestedAllocation {
    pub fn total(&self) -> f64 {
        self.buckets.iter().map(|(_, v)| v).sum()
    }

    pub fn labelled(&self) -> BTreeMap<String, f64> {
        self.buckets
            .iter()
            .map(|(a, v)| (a.label().to_string(), *v))
            .collect()
    }
}

/// Equity share before the template split, always within
/// [`MIN_EQUITY`]..=[`MAX_EQUITY`].
pub fn equity_percent(
    age: u32,
    risk: RiskTolerance,
    horizon: TimeHorizon,
    health_score: u32,
) -> i32 {
    let age = i32::try_from(age).unwrap_or(i32::MAX);
    let base = 110i32.saturating_sub(age).clamp(20, 90);

    let risk_adj = match risk {
        RiskTolerance::Conservative => -15,
        RiskTolerance::Moderate => 0,
        RiskTolerance::Aggressive => 15,
    };
    let horizon_adj = match horizon {
        TimeHorizon::Short => -20,
        TimeHorizon::Medium => -10,
        TimeHorizon::Long => 5,
        TimeHorizon::VeryLong => 10,
    };
    let health_adj = if health_score >= 80 {
        10
    } else if health_score < 50 {
        -10
    } else {
        0
    };

    (base + risk_adj + horizon_adj + health_adj).clamp(MIN_EQUITY, MAX_EQUITY)
}

pub fn generate_allocation(
    age: u32,
    risk: RiskTolerance,
    horizon: TimeHorizon,
    health_score: u32,
) -> SuggestedAllocation {
    let equity = equity_percent(age, risk, horizon, health_score);
    let template = AllocationTemplate::for_equity(equity);
    let buckets = normalize(template.raw_buckets(equity));
    tracing::debug!(age, equity, ?template, "generated allocation");
    SuggestedAllocation {
        equity_percent: equity,
        template,
        buckets,
    }
}

/// Scales weights to 100 and rounds to tenths with largest-remainder
/// apportionment, so the rounded values still add up to exactly 100.0.
fn normalize(raw: Vec<(AssetClass, f64)>) -> Vec<(AssetClass, f64)> {
    let total: f64 = raw.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return raw.into_iter().map(|(a, _)| (a, 0.0)).collect();
    }

    let scaled: Vec<f64> = raw.iter().map(|(_, v)| v * 1000.0 / total).collect();
    let mut tenths: Vec<i64> = scaled.iter().map(|v| v.floor() as i64).collect();
    let assigned: i64 = tenths.iter().sum();

    let mut order: Vec<usize> = (0..scaled.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = scaled[a] - scaled[a].floor();
        let rb = scaled[b] - scaled[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    let leftover = usize::try_from(1000 - assigned).unwrap_or(0);
    for &i in order.iter().take(leftover) {
        tenths[i] += 1;
    }

    raw.into_iter()
        .zip(tenths)
        .map(|((asset, _), t)| (asset, t as f64 / 10.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_to_one_hundred_for_all_inputs() {
        for age in 18..=100 {
            for risk in RiskTolerance::ALL {
                for horizon in TimeHorizon::ALL {
                    for health in [0, 49, 50, 79, 80, 100] {
                        let a = generate_allocation(age, risk, horizon, health);
                        assert!((a.total() - 100.0).abs() <= 0.1, "{a:?}");
                        assert!(a.buckets.iter().all(|(_, v)| *v >= 0.0));
                        assert!((MIN_EQUITY..=MAX_EQUITY).contains(&a.equity_percent));
                    }
                }
            }
        }
    }

    #[test]
    fn equity_clamps_at_extremes() {
        let hi = equity_percent(18, RiskTolerance::Aggressive, TimeHorizon::VeryLong, 100);
        assert_eq!(hi, MAX_EQUITY);
        let lo = equity_percent(100, RiskTolerance::Conservative, TimeHorizon::Short, 0);
        assert_eq!(lo, MIN_EQUITY);
        let extreme = equity_percent(u32::MAX, RiskTolerance::Moderate, TimeHorizon::Long, 60);
        assert_eq!(extreme, 25);
    }

    #[test]
    fn reference_profile_is_aggressive_template() {
        // 110 - 30 = 80, +0 risk, +5 horizon, +10 health -> 95 -> 85
        let a = generate_allocation(30, RiskTolerance::Moderate, TimeHorizon::Long, 83);
        assert_eq!(a.equity_percent, 85);
        assert_eq!(a.template, AllocationTemplate::Aggressive);
        assert_eq!(a.buckets.len(), 8);
        assert_eq!(a.buckets[0].0, AssetClass::LargeCapStocks);
    }

    #[test]
    fn template_bands() {
        assert_eq!(AllocationTemplate::for_equity(60), AllocationTemplate::Aggressive);
        assert_eq!(AllocationTemplate::for_equity(59), AllocationTemplate::Moderate);
        assert_eq!(AllocationTemplate::for_equity(40), AllocationTemplate::Moderate);
        assert_eq!(AllocationTemplate::for_equity(39), AllocationTemplate::Conservative);
        let c = generate_allocation(70, RiskTolerance::Conservative, TimeHorizon::Short, 40);
        assert_eq!(c.template, AllocationTemplate::Conservative);
        assert_eq!(c.buckets.len(), 6);
    }

    #[test]
    fn normalization_is_exact_to_the_tenth() {
        let raw = vec![
            (AssetClass::LargeCapStocks, 1.0),
            (AssetClass::MidCapStocks, 1.0),
            (AssetClass::CashFd, 1.0),
        ];
        let n = normalize(raw);
        let tenths: i64 = n.iter().map(|(_, v)| (v * 10.0).round() as i64).sum();
        assert_eq!(tenths, 1000);
        assert_eq!(n[0].1, 33.4);
        assert_eq!(n[2].1, 33.3);
    }

    #[test]
    fn labels_round_trip() {
        for a in AssetClass::ALL {
            assert_eq!(AssetClass::from_label(a.label()), Some(a));
        }
        let v = serde_json::to_value(AssetClass::CashFd).unwrap();
        assert_eq!(v, serde_json::json!("Cash/FD"));
    }

    #[test]
    fn free_text_labels_are_classified_by_keyword() {
        assert_eq!(AssetClass::classify_label("Stocks (ETFs)"), Some(AssetClass::LargeCapStocks));
        assert_eq!(AssetClass::classify_label("Debt Funds"), Some(AssetClass::GovernmentBonds));
        assert_eq!(AssetClass::classify_label("Cash Equivalents"), Some(AssetClass::CashFd));
        assert_eq!(AssetClass::classify_label("REITs"), Some(AssetClass::RealEstate));
        assert_eq!(AssetClass::classify_label(" Gold/Commodities "), Some(AssetClass::GoldCommodities));
        assert_eq!(AssetClass::classify_label("Venture Fund"), None);
    }
}
