use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finplan_core::advisor::anthropic::AnthropicAdvisor;
use finplan_core::advisor::Advisor;
use finplan_core::config::Settings;
use finplan_core::pipeline::Planner;

mod market;
mod recommend;

#[derive(Debug, Parser)]
#[command(name = "finplan", about = "Personal finance questionnaire and portfolio advice")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a questionnaire JSON file and list every problem.
    Validate {
        #[arg(long)]
        input: PathBuf,
    },

    /// Produce a recommendation for a questionnaire JSON file.
    Recommend {
        #[arg(long)]
        input: PathBuf,

        /// Store the result under this username (needs DATABASE_URL).
        #[arg(long)]
        user: Option<String>,

        /// Do everything except writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Skip the advisor call and use the static fallback payload.
        #[arg(long)]
        offline: bool,

        /// Write the report archive (CSV sheets in a zip) to this path.
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Fetch quotes for the default symbols and print a market summary.
    Market {
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored portfolios for a user, newest first.
    History {
        #[arg(long)]
        user: String,

        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let res = run(args.command, &settings).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
    }
    res
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Validate { input } => {
            let fields = recommend::read_fields(&input)?;
            let errors = finplan_core::validation::validate_fields(&fields);
            if errors.is_empty() {
                println!("valid");
                return Ok(());
            }
            for e in &errors {
                println!("- {e}");
            }
            anyhow::bail!("{} validation error(s) in {}", errors.len(), input.display())
        }
        Command::Recommend {
            input,
            user,
            dry_run,
            offline,
            export,
        } => {
            let advisor = if offline {
                Advisor::offline()
            } else {
                Advisor::new(Arc::new(AnthropicAdvisor::from_settings(settings)?))
            };
            let planner = Planner::new(advisor, settings.risk_score_strategy);
            let pool = if dry_run || user.is_none() {
                None
            } else {
                Some(connect(settings).await?)
            };
            recommend::run(recommend::Options {
                planner: &planner,
                pool: pool.as_ref(),
                input: &input,
                user: user.as_deref(),
                export: export.as_deref(),
            })
            .await
        }
        Command::Market { dry_run } => {
            let pool = if dry_run {
                None
            } else {
                Some(connect(settings).await?)
            };
            market::run(settings, pool.as_ref()).await
        }
        Command::History { user, limit } => {
            let pool = connect(settings).await?;
            if finplan_core::storage::users::find_user(&pool, &user).await?.is_none() {
                anyhow::bail!("unknown user {user}");
            }
            let records =
                finplan_core::storage::portfolios::list_portfolios(&pool, &user, limit).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
    }
}

async fn connect(settings: &Settings) -> anyhow::Result<sqlx::PgPool> {
    let db_url = settings.require_database_url()?;
    let pool = finplan_core::storage::connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;
    finplan_core::storage::migrate(&pool).await?;
    Ok(pool)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recommend_flags() {
        let args = Args::try_parse_from([
            "finplan", "recommend", "--input", "me.json", "--user", "asha", "--offline", "--export",
            "out.zip",
        ])
        .unwrap();
        let Command::Recommend {
            input,
            user,
            dry_run,
            offline,
            export,
        } = args.command
        else {
            panic!("expected recommend");
        };
        assert_eq!(input, PathBuf::from("me.json"));
        assert_eq!(user.as_deref(), Some("asha"));
        assert!(!dry_run);
        assert!(offline);
        assert_eq!(export, Some(PathBuf::from("out.zip")));
    }

    #[test]
    fn history_limit_defaults_to_ten() {
        let args = Args::try_parse_from(["finplan", "history", "--user", "asha"]).unwrap();
        assert!(matches!(args.command, Command::History { limit: 10, .. }));
    }
}
