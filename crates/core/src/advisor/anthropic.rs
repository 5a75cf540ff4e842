use crate::advisor::error::AdvisorDiagnosticsError;
use crate::advisor::{AdvisorClient, AdvisorRequest, Provider};
use crate::config::Settings;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: u32 = 2;
const TEMPERATURE: f32 = 0.3;

const TOOL_NAME_EMIT_ADVICE: &str = "emit_advice";

#[derive(Debug, Clone)]
pub struct AnthropicAdvisor {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

impl AnthropicAdvisor {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = env_or("ANTHROPIC_MAX_TOKENS", DEFAULT_MAX_TOKENS);
        let timeout_secs = env_or("ANTHROPIC_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let max_retries = env_or("ANTHROPIC_MAX_RETRIES", DEFAULT_MAX_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
            max_retries,
        })
    }

    async fn create_message(
        &self,
        req: &CreateMessageRequest,
    ) -> Result<CreateMessageResponse, AdvisorDiagnosticsError> {
        let diagnostics = |stage: &'static str,
                           status: Option<u16>,
                           detail: String,
                           raw_output: Option<String>| AdvisorDiagnosticsError {
            provider: Provider::Anthropic,
            stage,
            status,
            detail,
            raw_output,
            raw_response_json: None,
        };

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| diagnostics("request", None, format!("invalid api key header: {e}"), None))?;
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| diagnostics("transport", None, e.to_string(), None))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| diagnostics("transport", Some(status.as_u16()), e.to_string(), None))?;
        if !status.is_success() {
            return Err(AdvisorDiagnosticsError {
                raw_response_json: serde_json::from_str(&text).ok(),
                ..diagnostics("http", Some(status.as_u16()), format!("status={status}"), Some(text))
            });
        }

        serde_json::from_str::<CreateMessageResponse>(&text).map_err(|e| AdvisorDiagnosticsError {
            raw_response_json: serde_json::from_str(&text).ok(),
            ..diagnostics(
                "decode",
                Some(status.as_u16()),
                format!("unexpected response shape: {e}"),
                Some(text.clone()),
            )
        })
    }

    fn request(&self, request: &AdvisorRequest) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            system: Some(request.system.clone()),
            messages: vec![Message {
                role: "user",
                content: request.user.clone(),
            }],
            tools: Some(Self::tools()),
            tool_choice: Some(ToolChoice::Tool {
                name: TOOL_NAME_EMIT_ADVICE,
            }),
        }
    }

    fn tools() -> Vec<Tool> {
        let schema = serde_json::json!({
            "type": "object",
            "required": ["narrative", "allocations", "next_steps"],
            "properties": {
                "narrative": {"type": "string"},
                "allocations": {
                    "type": "object",
                    "additionalProperties": {"type": "number", "minimum": 0}
                },
                "next_steps": {"type": "string"}
            }
        });

        vec![Tool {
            name: TOOL_NAME_EMIT_ADVICE,
            description: "Emit the portfolio advice as structured JSON",
            input_schema: schema,
        }]
    }

    /// Tool input when the model used the tool, otherwise the concatenated
    /// text blocks.
    fn response_body(res: &CreateMessageResponse) -> Option<String> {
        for block in &res.content {
            if let ContentBlock::ToolUse { name, input } = block {
                if name == TOOL_NAME_EMIT_ADVICE {
                    return Some(input.to_string());
                }
            }
        }

        let text = res
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait::async_trait]
impl AdvisorClient for AnthropicAdvisor {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(&self, request: &AdvisorRequest) -> anyhow::Result<String> {
        let req = self.request(request);
        let mut attempt: u32 = 0;
        let res = loop {
            attempt += 1;
            match self.create_message(&req).await {
                Ok(res) => break res,
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, ?backoff, error = %err, "Anthropic request failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err.into()),
            }
        };

        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            tracing::warn!(max_tokens = self.max_tokens, "Anthropic stop_reason=max_tokens; output may be truncated");
        }

        Self::response_body(&res).ok_or_else(|| {
            AdvisorDiagnosticsError {
                provider: Provider::Anthropic,
                stage: "empty_response",
                status: None,
                detail: "response carried neither tool output nor text".to_string(),
                raw_output: None,
                raw_response_json: None,
            }
            .into()
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ToolChoice {
    #[serde(rename = "tool")]
    Tool { name: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}
