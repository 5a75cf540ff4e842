use crate::advisor::{fallback_payload, AdvisorOutcome};
use crate::domain::contract::validate_payload;
use serde_json::Value;

/// Pulls the JSON object out of a model reply: drops Markdown fences, then
/// keeps the outermost `{...}` span.
pub fn extract_json(text: &str) -> Option<&str> {
    let mut inner = text.trim();
    if let Some(rest) = inner.strip_prefix("```") {
        // Language tag may share the line with the body (```json {...}```).
        inner = rest.trim_start();
        if let Some(body) = inner.strip_prefix("json").or_else(|| inner.strip_prefix("JSON")) {
            inner = body;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
    }

    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(inner[start..=end].trim())
}

/// Turns raw model text into an outcome. Anything short of a well-shaped
/// payload yields the static fallback together with the reason.
pub fn classify(text: &str) -> AdvisorOutcome {
    let Some(json_str) = extract_json(text) else {
        return fallback("no JSON object found in advisor output");
    };
    let value = match serde_json::from_str::<Value>(json_str) {
        Ok(v) => v,
        Err(err) => return fallback(format!("advisor output is not valid JSON: {err}")),
    };
    match validate_payload(&value) {
        Ok(payload) => AdvisorOutcome::Parsed(payload),
        Err(err) => fallback(format!("advisor payload rejected: {err}")),
    }
}

fn fallback(reason: impl Into<String>) -> AdvisorOutcome {
    AdvisorOutcome::Fallback {
        payload: fallback_payload(),
        reason: reason.into(),
    }
}
