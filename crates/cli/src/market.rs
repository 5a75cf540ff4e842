use finplan_core::config::Settings;
use finplan_core::market::{default_symbols, summarize, HttpQuoteProvider, QuoteProvider};
use finplan_core::storage::market_data::upsert_quotes;

pub async fn run(settings: &Settings, pool: Option<&sqlx::PgPool>) -> anyhow::Result<()> {
    let provider = HttpQuoteProvider::from_settings(settings)?;
    let symbols = default_symbols();
    let quotes = provider.fetch_quotes(&symbols).await;
    tracing::info!(requested = symbols.len(), fetched = quotes.len(), "fetched quotes");

    println!("{}", serde_json::to_string_pretty(&summarize(&quotes))?);

    if let Some(pool) = pool {
        let affected = upsert_quotes(pool, &quotes).await?;
        tracing::info!(affected, "stored market data");
    }
    Ok(())
}
