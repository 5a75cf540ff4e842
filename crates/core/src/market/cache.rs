use crate::market::provider::QuoteProvider;
use crate::market::types::Quote;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_TTL_SECS: u64 = 300;

struct Entry {
    fetched_at: Instant,
    quotes: Vec<Quote>,
}

/// Holds the last fetched quotes and refetches on read once they are older
/// than the TTL.
pub struct QuoteCache {
    provider: Arc<dyn QuoteProvider>,
    symbols: Vec<String>,
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl QuoteCache {
    pub fn new(provider: Arc<dyn QuoteProvider>, symbols: Vec<String>, ttl: Duration) -> Self {
        Self {
            provider,
            symbols,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// TTL from `MARKET_DATA_TTL_SECS`, default five minutes.
    pub fn ttl_from_env() -> Duration {
        let secs = std::env::var("MARKET_DATA_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS);
        Duration::from_secs(secs)
    }

    pub async fn quotes(&self) -> Vec<Quote> {
        self.quotes_with_refresh_flag().await.0
    }

    /// Quotes plus whether this call went to the provider.
    pub async fn quotes_with_refresh_flag(&self) -> (Vec<Quote>, bool) {
        let mut guard = self.entry.lock().await;
        if let Some(entry) = guard.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return (entry.quotes.clone(), false);
            }
        }

        let symbols: Vec<&str> = self.symbols.iter().map(String::as_str).collect();
        let quotes = self.provider.fetch_quotes(&symbols).await;
        tracing::debug!(
            provider = self.provider.provider_name(),
            requested = symbols.len(),
            fetched = quotes.len(),
            "refreshed quote cache"
        );
        *guard = Some(Entry {
            fetched_at: Instant::now(),
            quotes: quotes.clone(),
        });
        (quotes, true)
    }

    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }
}
