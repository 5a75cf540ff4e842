pub mod advisor;
pub mod allocation;
pub mod domain;
pub mod export;
pub mod format;
pub mod market;
pub mod metrics;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod testing;

pub mod config {
    use crate::metrics::RiskScoreStrategy;
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
        pub risk_score_strategy: RiskScoreStrategy,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let risk_score_strategy = match std::env::var("RISK_SCORE_STRATEGY") {
                Ok(s) if !s.trim().is_empty() => s
                    .trim()
                    .parse::<RiskScoreStrategy>()
                    .map_err(anyhow::Error::msg)
                    .context("invalid RISK_SCORE_STRATEGY")?,
                _ => RiskScoreStrategy::default(),
            };

            Ok(Self {
                database_url: non_empty_env("DATABASE_URL"),
                anthropic_api_key: non_empty_env("ANTHROPIC_API_KEY"),
                sentry_dsn: non_empty_env("SENTRY_DSN"),
                market_data_base_url: non_empty_env("MARKET_DATA_BASE_URL"),
                market_data_api_key: non_empty_env("MARKET_DATA_API_KEY"),
                risk_score_strategy,
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_market_data_base_url(&self) -> anyhow::Result<&str> {
            self.market_data_base_url
                .as_deref()
                .context("MARKET_DATA_BASE_URL is required")
        }
    }

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn require_reports_the_missing_variable() {
            let settings = Settings::default();
            let err = settings.require_anthropic_api_key().unwrap_err();
            assert_eq!(err.to_string(), "ANTHROPIC_API_KEY is required");
            assert!(settings.require_database_url().is_err());
            assert_eq!(settings.risk_score_strategy, RiskScoreStrategy::Simple);
        }
    }
}
