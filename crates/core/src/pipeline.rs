use crate::advisor::{Advisor, AdvisorSource};
use crate::allocation::analysis::{portfolio_analysis, PortfolioAnalysis};
use crate::allocation::{generate_allocation, SuggestedAllocation};
use crate::domain::contract::assemble;
use crate::domain::profile::{ProfileSnapshot, UserProfile};
use crate::domain::recommendation::Recommendation;
use crate::metrics::{calculate_metrics, FinancialMetrics, RiskScoreStrategy};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Everything produced for one questionnaire submission.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub profile: UserProfile,
    pub metrics: FinancialMetrics,
    pub suggested_allocation: SuggestedAllocation,
    pub recommendation: Recommendation,
    pub analysis: PortfolioAnalysis,
    pub source: AdvisorSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Planner {
    advisor: Advisor,
    strategy: RiskScoreStrategy,
}

impl Planner {
    pub fn new(advisor: Advisor, strategy: RiskScoreStrategy) -> Self {
        Self { advisor, strategy }
    }

    pub async fn run(
        &self,
        profile: UserProfile,
        history: &[ProfileSnapshot],
    ) -> anyhow::Result<Submission> {
        self.run_at(profile, history, Utc::now()).await
    }

    /// Metrics, rule-based allocation, advisor call and assembly. A payload
    /// the assembler rejects is replaced by the static fallback.
    pub async fn run_at(
        &self,
        profile: UserProfile,
        history: &[ProfileSnapshot],
        now: DateTime<Utc>,
    ) -> anyhow::Result<Submission> {
        let metrics = calculate_metrics(&profile, history, self.strategy, now);
        let suggested_allocation = generate_allocation(
            profile.age(),
            profile.risk_tolerance(),
            profile.time_horizon(),
            metrics.financial_health_score,
        );

        let outcome = self.advisor.advise(&profile, &metrics).await;
        let mut fallback_reason = outcome.reason().map(str::to_string);
        let (payload, mut source) = outcome.into_payload();

        let recommendation = match assemble(&profile, &metrics, &to_value(&payload)?, now) {
            Ok(rec) => rec,
            Err(err) => {
                tracing::warn!(error = %err, field = err.field(), "advisor payload rejected by assembler; using fallback");
                fallback_reason = Some(err.to_string());
                source = AdvisorSource::Fallback;
                let fallback = to_value(&crate::advisor::fallback_payload())?;
                assemble(&profile, &metrics, &fallback, now)?
            }
        };

        let analysis = portfolio_analysis(&suggested_allocation.labelled());
        tracing::info!(
            age = profile.age(),
            risk_tolerance = %profile.risk_tolerance(),
            health = metrics.financial_health_score,
            equity = suggested_allocation.equity_percent,
            risk_level = %recommendation.risk_level(),
            %source,
            "submission processed"
        );

        Ok(Submission {
            profile,
            metrics,
            suggested_allocation,
            recommendation,
            analysis,
            source,
            fallback_reason,
        })
    }
}

fn to_value<T: Serialize>(payload: &T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::tests::CannedClient;
    use crate::domain::recommendation::RiskLevel;
    use crate::testing::reference_profile;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn planner(reply: anyhow::Result<String>) -> Planner {
        Planner::new(
            Advisor::new(Arc::new(CannedClient(reply))),
            RiskScoreStrategy::Simple,
        )
    }

    #[tokio::test]
    async fn model_payload_flows_through() {
        let reply = r#"{"narrative": "Index funds carry most of the weight.", "allocations": {"Equity": 65, "Debt": 25, "Gold": 10}, "next_steps": "Start two SIPs this month."}"#;
        let s = planner(Ok(reply.to_string()))
            .run_at(reference_profile(), &[], now())
            .await
            .unwrap();
        assert_eq!(s.source, AdvisorSource::Model);
        assert_eq!(s.fallback_reason, None);
        assert_eq!(s.recommendation.allocations()["Equity"], 65.0);
        assert_eq!(s.recommendation.risk_level(), RiskLevel::ModerateConservative);
        assert_eq!(s.metrics.disposable_income, 25000.0);
        assert!((s.suggested_allocation.total() - 100.0).abs() <= 0.1);
    }

    #[tokio::test]
    async fn bad_total_is_replaced_by_fallback() {
        let reply = r#"{"narrative": "Put most of it into equity.", "allocations": {"Equity": 60, "Debt": 20}, "next_steps": "Review again next quarter."}"#;
        let s = planner(Ok(reply.to_string()))
            .run_at(reference_profile(), &[], now())
            .await
            .unwrap();
        assert_eq!(s.source, AdvisorSource::Fallback);
        assert!(s.fallback_reason.unwrap().contains("sum to 100%"));
        assert_eq!(s.recommendation.allocations()["Stocks (ETFs)"], 50.0);
    }

    #[tokio::test]
    async fn advisor_errors_never_reach_the_caller() {
        let s = planner(Err(anyhow::anyhow!("timed out")))
            .run_at(reference_profile(), &[], now())
            .await
            .unwrap();
        assert_eq!(s.source, AdvisorSource::Fallback);
        assert_eq!(s.fallback_reason.as_deref(), Some("timed out"));
        assert_eq!(s.recommendation.allocations().len(), 4);
    }

    #[tokio::test]
    async fn analysis_follows_the_rule_based_allocation() {
        let s = planner(Err(anyhow::anyhow!("timed out")))
            .run_at(reference_profile(), &[], now())
            .await
            .unwrap();
        let a = &s.analysis;
        let bucket_sum = |pick: fn(crate::allocation::AssetClass) -> bool| -> f64 {
            s.suggested_allocation
                .buckets
                .iter()
                .filter(|(asset, _)| pick(*asset))
                .map(|(_, v)| v)
                .sum()
        };
        assert!((a.equity_percent - bucket_sum(|x| x.is_equity())).abs() <= 0.1);
        assert!((a.debt_percent - bucket_sum(|x| x.is_debt())).abs() <= 0.1);
        assert!(a.equity_percent > 0.0);
        assert!(a.debt_percent > 0.0);
        assert!(a.alternative_percent < 100.0);
        let split = a.equity_percent + a.debt_percent + a.alternative_percent;
        assert!((split - 100.0).abs() < 0.2);
    }
}
