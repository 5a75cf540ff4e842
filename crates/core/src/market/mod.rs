pub mod cache;
pub mod provider;
pub mod types;

pub use cache::QuoteCache;
pub use provider::{HttpQuoteProvider, QuoteProvider};
pub use types::{classify_symbol, default_symbols, summarize, MarketSummary, Quote, SymbolClass};
