use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Very Conservative")]
    VeryConservative,
    Conservative,
    #[serde(rename = "Moderate Conservative")]
    ModerateConservative,
    Moderate,
    #[serde(rename = "Moderate Aggressive")]
    ModerateAggressive,
    Aggressive,
}

impl RiskLevel {
    const ALL: [RiskLevel; 6] = [
        Self::VeryConservative,
        Self::Conservative,
        Self::ModerateConservative,
        Self::Moderate,
        Self::ModerateAggressive,
        Self::Aggressive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryConservative => "Very Conservative",
            Self::Conservative => "Conservative",
            Self::ModerateConservative => "Moderate Conservative",
            Self::Moderate => "Moderate",
            Self::ModerateAggressive => "Moderate Aggressive",
            Self::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown risk level: {s}"))
    }
}

/// Maps a numeric risk score to its portfolio risk label.
pub fn determine_risk_level(risk_score: f64) -> RiskLevel {
    if risk_score < 1.0 {
        RiskLevel::VeryConservative
    } else if risk_score < 1.5 {
        RiskLevel::Conservative
    } else if risk_score < 2.0 {
        RiskLevel::ModerateConservative
    } else if risk_score < 2.5 {
        RiskLevel::Moderate
    } else if risk_score < 3.0 {
        RiskLevel::ModerateAggressive
    } else {
        RiskLevel::Aggressive
    }
}

/// Final recommendation for one submission. Built once by the assembler and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    allocations: BTreeMap<String, f64>,
    narrative: String,
    next_steps: String,
    risk_level: RiskLevel,
    generated_at: DateTime<Utc>,
}

impl Recommendation {
    pub(crate) fn from_parts(
        allocations: BTreeMap<String, f64>,
        narrative: String,
        next_steps: String,
        risk_level: RiskLevel,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            allocations,
            narrative,
            next_steps,
            risk_level,
            generated_at,
        }
    }

    pub fn allocations(&self) -> &BTreeMap<String, f64> {
        &self.allocations
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn next_steps(&self) -> &str {
        &self.next_steps
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn narrative_bullets(&self) -> Vec<String> {
        narrative_bullets(&self.narrative)
    }
}

/// Splits narrative prose into sentence bullets (on `.`, `!` or `?` followed
/// by whitespace).
pub fn narrative_bullets(narrative: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = narrative.trim().chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(false, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                out.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(determine_risk_level(0.4), RiskLevel::VeryConservative);
        assert_eq!(determine_risk_level(1.0), RiskLevel::Conservative);
        assert_eq!(determine_risk_level(1.8), RiskLevel::ModerateConservative);
        assert_eq!(determine_risk_level(2.0), RiskLevel::Moderate);
        assert_eq!(determine_risk_level(2.99), RiskLevel::ModerateAggressive);
        assert_eq!(determine_risk_level(3.0), RiskLevel::Aggressive);
    }

    #[test]
    fn risk_level_serializes_as_label() {
        let v = serde_json::to_value(RiskLevel::ModerateConservative).unwrap();
        assert_eq!(v, serde_json::json!("Moderate Conservative"));
        assert_eq!(
            "Moderate Aggressive".parse::<RiskLevel>().unwrap(),
            RiskLevel::ModerateAggressive
        );
    }

    #[test]
    fn bullets_split_on_sentence_boundaries() {
        let bullets = narrative_bullets("Build a buffer first. Then invest!  Review yearly?  ");
        assert_eq!(
            bullets,
            vec!["Build a buffer first.", "Then invest!", "Review yearly?"]
        );
    }

    #[test]
    fn bullets_keep_decimal_numbers_intact() {
        let bullets = narrative_bullets("Target 12.5% equity. Done");
        assert_eq!(bullets, vec!["Target 12.5% equity.", "Done"]);
    }
}
