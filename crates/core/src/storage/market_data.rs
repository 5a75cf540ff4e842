use crate::market::Quote;
use anyhow::Context;
use serde_json::json;

const UPSERT_BATCH: usize = 100;

/// Upserts one row per symbol and trading day; a later fetch on the same
/// day overwrites the earlier one.
pub async fn upsert_quotes(pool: &sqlx::PgPool, quotes: &[Quote]) -> anyhow::Result<u64> {
    if quotes.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let mut affected: u64 = 0;
    for chunk in quotes.chunks(UPSERT_BATCH) {
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO market_data (symbol, quote_date, asset_class, current_price, previous_close, \
             change_percent, volume, market_cap, additional_data, last_updated) ",
        );
        qb.push_values(chunk, |mut b, q| {
            b.push_bind(q.symbol.as_str())
                .push_bind(q.fetched_at.date_naive())
                .push_bind(q.asset_class.as_str())
                .push_bind(q.current_price)
                .push_bind(q.previous_close)
                .push_bind(q.change_percent)
                .push_bind(q.volume)
                .push_bind(q.market_cap)
                .push_bind(json!({"sector": q.sector, "industry": q.industry}))
                .push_bind(q.fetched_at);
        });
        qb.push(
            " ON CONFLICT (symbol, quote_date) DO UPDATE \
               SET asset_class = EXCLUDED.asset_class, current_price = EXCLUDED.current_price, \
                   previous_close = EXCLUDED.previous_close, change_percent = EXCLUDED.change_percent, \
                   volume = EXCLUDED.volume, market_cap = EXCLUDED.market_cap, \
                   additional_data = EXCLUDED.additional_data, last_updated = EXCLUDED.last_updated",
        );

        let res = qb
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch upsert market_data failed")?;
        affected += res.rows_affected();
    }

    tx.commit().await.context("commit transaction failed")?;
    tracing::debug!(quotes = quotes.len(), affected, "market_data upsert");
    Ok(affected)
}
