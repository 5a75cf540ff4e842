use anyhow::Context;
use finplan_core::export::{export_report, ReportInput};
use finplan_core::pipeline::Planner;
use finplan_core::storage::portfolios::{persist_portfolio, NewPortfolio};
use finplan_core::storage::profiles::recent_profiles;
use finplan_core::validation::{parse_profile, FieldMap};
use std::path::Path;

pub struct Options<'a> {
    pub planner: &'a Planner,
    pub pool: Option<&'a sqlx::PgPool>,
    pub input: &'a Path,
    pub user: Option<&'a str>,
    pub export: Option<&'a Path>,
}

pub fn read_fields(path: &Path) -> anyhow::Result<FieldMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read {} failed", path.display()))?;
    parse_fields(&text).with_context(|| format!("parse {} failed", path.display()))
}

fn parse_fields(text: &str) -> anyhow::Result<FieldMap> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("questionnaire must be a JSON object"),
    }
}

pub async fn run(opts: Options<'_>) -> anyhow::Result<()> {
    let fields = read_fields(opts.input)?;
    let profile = match parse_profile(&fields) {
        Ok(p) => p,
        Err(errors) => {
            for e in &errors {
                eprintln!("- {e}");
            }
            anyhow::bail!("questionnaire has {} validation error(s)", errors.len());
        }
    };

    let history = match (opts.pool, opts.user) {
        (Some(pool), Some(user)) => recent_profiles(pool, user, 5).await?,
        _ => Vec::new(),
    };

    let submission = opts.planner.run(profile, &history).await?;
    println!("{}", serde_json::to_string_pretty(&submission)?);

    if let Some(path) = opts.export {
        let bytes = export_report(&ReportInput {
            username: opts.user,
            profile: &submission.profile,
            metrics: &submission.metrics,
            recommendation: &submission.recommendation,
        })?;
        std::fs::write(path, bytes).with_context(|| format!("write {} failed", path.display()))?;
        tracing::info!(path = %path.display(), "wrote report");
    }

    match (opts.pool, opts.user) {
        (Some(pool), Some(user)) => {
            let ids = persist_portfolio(
                pool,
                NewPortfolio {
                    username: user,
                    profile: &submission.profile,
                    metrics: &submission.metrics,
                    recommendation: &submission.recommendation,
                    source: submission.source,
                },
            )
            .await?;
            tracing::info!(portfolio_id = %ids.portfolio_id, "saved portfolio");
        }
        _ => tracing::info!("portfolio not saved (dry run or no --user)"),
    }

    Ok(())
}
