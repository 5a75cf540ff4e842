pub mod anthropic;
pub mod error;
pub mod json;
pub mod prompt;

use crate::domain::contract::AdvisorPayload;
use crate::domain::profile::UserProfile;
use crate::metrics::FinancialMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AdvisorRequest {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
}

/// Text-generation backend. Returns the raw model output; parsing is done by
/// [`Advisor`].
#[async_trait::async_trait]
pub trait AdvisorClient: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(&self, request: &AdvisorRequest) -> anyhow::Result<String>;
}

/// Where the payload behind a recommendation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorSource {
    Model,
    Fallback,
}

impl AdvisorSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for AdvisorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisorOutcome {
    /// The model answered with a well-shaped payload.
    Parsed(AdvisorPayload),
    /// The model answered but nothing usable could be read from it.
    Fallback { payload: AdvisorPayload, reason: String },
    /// The call itself failed or no backend is configured.
    Error(String),
}

impl AdvisorOutcome {
    /// Payload to assemble from. Errors resolve to the static fallback.
    pub fn into_payload(self) -> (AdvisorPayload, AdvisorSource) {
        match self {
            Self::Parsed(payload) => (payload, AdvisorSource::Model),
            Self::Fallback { payload, .. } => (payload, AdvisorSource::Fallback),
            Self::Error(_) => (fallback_payload(), AdvisorSource::Fallback),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Fallback { reason, .. } | Self::Error(reason) => Some(reason),
        }
    }
}

/// Canned diversified mix used whenever the model cannot be used.
pub fn fallback_payload() -> AdvisorPayload {
    AdvisorPayload {
        allocations: BTreeMap::from([
            ("Stocks (ETFs)".to_string(), 50.0),
            ("Bonds".to_string(), 25.0),
            ("Real Estate".to_string(), 15.0),
            ("Cash Equivalents".to_string(), 10.0),
        ]),
        narrative: "Based on your profile, we recommend a diversified allocation across stocks, \
                    bonds, real estate, and cash equivalents."
            .to_string(),
        next_steps: "Consider reviewing your goals periodically and adjusting your allocation \
                     as your financial situation changes."
            .to_string(),
    }
}

#[derive(Clone, Default)]
pub struct Advisor {
    client: Option<Arc<dyn AdvisorClient>>,
}

impl Advisor {
    pub fn new(client: Arc<dyn AdvisorClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Advisor that never calls out and always answers with the fallback.
    pub fn offline() -> Self {
        Self { client: None }
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    /// Never fails: transport and parse problems are folded into the outcome.
    pub async fn advise(&self, profile: &UserProfile, metrics: &FinancialMetrics) -> AdvisorOutcome {
        let Some(client) = &self.client else {
            return AdvisorOutcome::Error("advisor is offline".to_string());
        };

        let request = prompt::build_request(profile, metrics);
        match client.complete(&request).await {
            Ok(text) => {
                let outcome = json::classify(&text);
                if let AdvisorOutcome::Fallback { reason, .. } = &outcome {
                    tracing::warn!(provider = ?client.provider(), %reason, "advisor output unusable; using fallback");
                }
                outcome
            }
            Err(err) => {
                tracing::warn!(provider = ?client.provider(), error = %err, "advisor call failed; using fallback");
                AdvisorOutcome::Error(format!("{err:#}"))
            }
        }
    }
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor")
            .field("provider", &self.client.as_ref().map(|c| c.provider()))
            .finish()
    }
}
