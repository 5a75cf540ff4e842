use crate::config::Settings;
use crate::market::types::{Quote, QuoteResponse};
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PATH: &str = "/v1/quote";

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;

    /// Fetches each symbol in turn. A symbol that fails is logged and left
    /// out; the call itself never fails.
    async fn fetch_quotes(&self, symbols: &[&str]) -> Vec<Quote> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.fetch_quote(symbol).await {
                Ok(q) => quotes.push(q),
                Err(err) => {
                    tracing::warn!(provider = self.provider_name(), %symbol, error = %err, "quote fetch failed; skipping symbol");
                }
            }
        }
        quotes
    }
}

#[derive(Debug, Clone)]
pub struct HttpQuoteProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
}

impl HttpQuoteProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_market_data_base_url()?.to_string();
        let api_key = settings.market_data_api_key.clone();

        let timeout_secs = std::env::var("MARKET_DATA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let path = std::env::var("MARKET_DATA_QUOTE_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<QuoteResponse>(&text)
            .with_context(|| format!("market data response is not a quote: {text}"))?;
        anyhow::ensure!(
            parsed.symbol.eq_ignore_ascii_case(symbol),
            "market data symbol mismatch: asked {symbol}, got {}",
            parsed.symbol
        );
        anyhow::ensure!(
            parsed.current_price.is_finite() && parsed.current_price > 0.0,
            "market data price must be positive"
        );
        Ok(Quote::from_response(parsed, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::QuoteResponse;
    use serde_json::json;

    struct Flaky;

    #[async_trait::async_trait]
    impl QuoteProvider for Flaky {
        fn provider_name(&self) -> &'static str {
            "flaky"
        }

        async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
            anyhow::ensure!(symbol != "BAD", "no data for {symbol}");
            let resp: QuoteResponse =
                serde_json::from_value(json!({"symbol": symbol, "current_price": 10.0}))?;
            Ok(Quote::from_response(resp, Utc::now()))
        }
    }

    #[tokio::test]
    async fn failing_symbols_are_skipped() {
        let quotes = Flaky.fetch_quotes(&["SPY", "BAD", "GLD"]).await;
        let symbols: Vec<_> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, ["SPY", "GLD"]);
        assert_eq!(quotes[0].previous_close, 10.0);
    }

    #[test]
    fn url_joins_base_and_path() {
        let settings = Settings {
            market_data_base_url: Some("https://quotes.example.com/".to_string()),
            ..Settings::default()
        };
        let provider = HttpQuoteProvider::from_settings(&settings).unwrap();
        assert!(provider.url().starts_with("https://quotes.example.com/"));
        assert!(provider.headers().unwrap().is_empty());
    }
}
