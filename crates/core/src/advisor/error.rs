use crate::advisor::Provider;
use serde_json::Value;
use std::fmt;

/// Advisor backend failure with enough context to debug a bad reply.
#[derive(Debug, Clone)]
pub struct AdvisorDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub status: Option<u16>,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl AdvisorDiagnosticsError {
    /// Transport errors and 429/5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.stage == "transport"
            || self
                .status
                .map_or(false, |s| s == 429 || (500..600).contains(&s))
    }
}

impl fmt::Display for AdvisorDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "advisor error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for AdvisorDiagnosticsError {}
