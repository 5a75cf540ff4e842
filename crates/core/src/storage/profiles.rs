use crate::domain::profile::{ProfileSnapshot, UserProfile};
use crate::metrics::trends::MAX_HISTORY;
use anyhow::Context;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub async fn insert_profile(
    conn: &mut sqlx::PgConnection,
    user_id: Uuid,
    profile: &UserProfile,
    created_at: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let age = i32::try_from(profile.age()).context("age out of range for storage")?;

    sqlx::query(
        "INSERT INTO financial_profiles \
         (id, user_id, salary, expenses, emergency_fund, age, risk_tolerance, time_horizon, loans, goals, existing_investments, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(id)
    .bind(user_id)
    .bind(profile.salary())
    .bind(profile.expenses())
    .bind(profile.emergency_fund())
    .bind(age)
    .bind(profile.risk_tolerance().as_str())
    .bind(profile.time_horizon().as_str())
    .bind(profile.loans().as_str())
    .bind(profile.goals())
    .bind(profile.existing_investments())
    .bind(created_at)
    .execute(&mut *conn)
    .await
    .context("insert financial_profiles failed")?;

    Ok(id)
}

/// Earlier profiles of `username`, newest first, capped at the trend window.
pub async fn recent_profiles(
    pool: &sqlx::PgPool,
    username: &str,
    limit: usize,
) -> anyhow::Result<Vec<ProfileSnapshot>> {
    let limit = i64::try_from(limit.min(MAX_HISTORY)).unwrap_or(MAX_HISTORY as i64);
    let rows: Vec<(f64, f64, DateTime<Utc>)> = sqlx::query_as(
        "SELECT p.salary, p.expenses, p.created_at \
         FROM financial_profiles p JOIN users u ON u.id = p.user_id \
         WHERE u.username = $1 \
         ORDER BY p.created_at DESC \
         LIMIT $2",
    )
    .bind(username.trim())
    .bind(limit)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select recent profiles for {username} failed"))?;

    Ok(rows
        .into_iter()
        .map(|(salary, expenses, created_at)| ProfileSnapshot {
            salary,
            expenses,
            created_at,
        })
        .collect())
}
