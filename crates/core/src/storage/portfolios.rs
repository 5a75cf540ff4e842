use crate::advisor::AdvisorSource;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::Recommendation;
use crate::metrics::FinancialMetrics;
use crate::storage::{profiles, users};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::types::Json;
use std::collections::BTreeMap;
use uuid::Uuid;

pub struct NewPortfolio<'a> {
    pub username: &'a str,
    pub profile: &'a UserProfile,
    pub metrics: &'a FinancialMetrics,
    pub recommendation: &'a Recommendation,
    pub source: AdvisorSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistedPortfolio {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub portfolio_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRecord {
    pub id: Uuid,
    pub financial_profile_id: Uuid,
    pub allocations: BTreeMap<String, f64>,
    pub metrics: Value,
    pub narrative: String,
    pub next_steps: String,
    pub risk_level: String,
    pub advisor_source: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PortfolioRow {
    id: Uuid,
    financial_profile_id: Uuid,
    allocations: Json<BTreeMap<String, f64>>,
    metrics: Json<Value>,
    narrative: String,
    next_steps: String,
    risk_level: String,
    advisor_source: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PortfolioRow> for PortfolioRecord {
    fn from(row: PortfolioRow) -> Self {
        Self {
            id: row.id,
            financial_profile_id: row.financial_profile_id,
            allocations: row.allocations.0,
            metrics: row.metrics.0,
            narrative: row.narrative,
            next_steps: row.next_steps,
            risk_level: row.risk_level,
            advisor_source: row.advisor_source,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const SELECT_PORTFOLIO: &str = "SELECT p.id, p.financial_profile_id, p.allocations, p.metrics, p.narrative, p.next_steps, \
     p.risk_level, p.advisor_source, p.is_active, p.created_at \
     FROM portfolios p JOIN users u ON u.id = p.user_id \
     WHERE u.username = $1 \
     ORDER BY p.created_at DESC";

/// Stores user, profile and portfolio in one transaction and marks earlier
/// portfolios of the user inactive. Nothing is written if any step fails.
pub async fn persist_portfolio(
    pool: &sqlx::PgPool,
    new: NewPortfolio<'_>,
) -> anyhow::Result<PersistedPortfolio> {
    let created_at = new.recommendation.generated_at();
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let user_id = users::ensure_user(&mut tx, new.username).await?;
    let profile_id = profiles::insert_profile(&mut tx, user_id, new.profile, created_at).await?;

    sqlx::query("UPDATE portfolios SET is_active = FALSE WHERE user_id = $1 AND is_active")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("deactivate previous portfolios failed")?;

    let portfolio_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO portfolios \
         (id, user_id, financial_profile_id, allocations, metrics, narrative, next_steps, risk_level, advisor_source, is_active, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)",
    )
    .bind(portfolio_id)
    .bind(user_id)
    .bind(profile_id)
    .bind(Json(new.recommendation.allocations()))
    .bind(Json(new.metrics))
    .bind(new.recommendation.narrative())
    .bind(new.recommendation.next_steps())
    .bind(new.recommendation.risk_level().as_str())
    .bind(new.source.as_str())
    .bind(created_at)
    .execute(&mut *tx)
    .await
    .context("insert portfolios failed")?;

    tx.commit().await.context("commit transaction failed")?;

    tracing::info!(username = new.username, %user_id, %portfolio_id, source = %new.source, "persisted portfolio");
    Ok(PersistedPortfolio {
        user_id,
        profile_id,
        portfolio_id,
    })
}

pub async fn latest_portfolio(
    pool: &sqlx::PgPool,
    username: &str,
) -> anyhow::Result<Option<PortfolioRecord>> {
    let sql = format!("{SELECT_PORTFOLIO} LIMIT 1");
    let row: Option<PortfolioRow> = sqlx::query_as(&sql)
        .bind(username.trim())
        .fetch_optional(pool)
        .await
        .with_context(|| format!("select latest portfolio for {username} failed"))?;
    Ok(row.map(PortfolioRecord::from))
}

pub async fn list_portfolios(
    pool: &sqlx::PgPool,
    username: &str,
    limit: i64,
) -> anyhow::Result<Vec<PortfolioRecord>> {
    let sql = format!("{SELECT_PORTFOLIO} LIMIT $2");
    let rows: Vec<PortfolioRow> = sqlx::query_as(&sql)
        .bind(username.trim())
        .bind(limit.max(1))
        .fetch_all(pool)
        .await
        .with_context(|| format!("select portfolios for {username} failed"))?;
    Ok(rows.into_iter().map(PortfolioRecord::from).collect())
}
