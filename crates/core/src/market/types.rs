use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolClass {
    Stocks,
    Bonds,
    Commodities,
    Crypto,
    IndianStocks,
    Unknown,
}

impl SymbolClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::Bonds => "bonds",
            Self::Commodities => "commodities",
            Self::Crypto => "crypto",
            Self::IndianStocks => "indian_stocks",
            Self::Unknown => "unknown",
        }
    }

    fn symbols(self) -> &'static [&'static str] {
        match self {
            Self::Stocks => &["SPY", "VTI", "VXUS", "VEA", "VWO"],
            Self::Bonds => &["BND", "VGIT", "VGLT", "VTEB"],
            Self::Commodities => &["GLD", "SLV", "VNQ"],
            Self::Crypto => &["BTC-USD", "ETH-USD"],
            Self::IndianStocks => &["INFY", "TCS.NS", "RELIANCE.NS"],
            Self::Unknown => &[],
        }
    }
}

const TRACKED: [SymbolClass; 5] = [
    SymbolClass::Stocks,
    SymbolClass::Bonds,
    SymbolClass::Commodities,
    SymbolClass::Crypto,
    SymbolClass::IndianStocks,
];

/// Broad ETFs and indices tracked by default, in class order.
pub fn default_symbols() -> Vec<&'static str> {
    TRACKED.iter().flat_map(|c| c.symbols().iter().copied()).collect()
}

pub fn classify_symbol(symbol: &str) -> SymbolClass {
    TRACKED
        .into_iter()
        .find(|c| c.symbols().contains(&symbol))
        .unwrap_or(SymbolClass::Unknown)
}

/// Wire shape returned by the quote endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    pub symbol: String,
    pub current_price: f64,
    #[serde(default)]
    pub previous_close: Option<f64>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub asset_class: SymbolClass,
    pub current_price: f64,
    pub previous_close: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn from_response(resp: QuoteResponse, fetched_at: DateTime<Utc>) -> Self {
        let previous_close = resp.previous_close.unwrap_or(resp.current_price);
        let change_percent = if previous_close != 0.0 {
            (resp.current_price - previous_close) / previous_close * 100.0
        } else {
            0.0
        };
        Self {
            asset_class: classify_symbol(&resp.symbol),
            symbol: resp.symbol,
            current_price: round2(resp.current_price),
            previous_close: round2(previous_close),
            change_percent: round2(change_percent),
            volume: resp.volume.unwrap_or(0),
            market_cap: resp.market_cap,
            sector: resp.sector,
            industry: resp.industry,
            fetched_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub count: usize,
    pub avg_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub symbol: String,
    pub change_percent: f64,
    pub current_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_symbols: usize,
    pub by_asset_class: BTreeMap<SymbolClass, ClassSummary>,
    pub top_gainers: Vec<Mover>,
    pub top_losers: Vec<Mover>,
}

const MOVERS: usize = 5;

/// Groups quotes by class and picks up to five gainers and losers.
pub fn summarize(quotes: &[Quote]) -> MarketSummary {
    let mut totals: BTreeMap<SymbolClass, (usize, f64)> = BTreeMap::new();
    for q in quotes {
        let entry = totals.entry(q.asset_class).or_default();
        entry.0 += 1;
        entry.1 += q.change_percent;
    }
    let by_asset_class = totals
        .into_iter()
        .map(|(class, (count, total))| {
            (
                class,
                ClassSummary {
                    count,
                    avg_change: round2(total / count as f64),
                },
            )
        })
        .collect();

    let mut sorted: Vec<&Quote> = quotes.iter().collect();
    sorted.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
    let mover = |q: &&Quote| Mover {
        symbol: q.symbol.clone(),
        change_percent: q.change_percent,
        current_price: q.current_price,
    };

    MarketSummary {
        total_symbols: quotes.len(),
        by_asset_class,
        top_gainers: sorted
            .iter()
            .take(MOVERS)
            .filter(|q| q.change_percent > 0.0)
            .map(mover)
            .collect(),
        top_losers: sorted
            .iter()
            .rev()
            .take(MOVERS)
            .filter(|q| q.change_percent < 0.0)
            .map(mover)
            .collect(),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
