//! Report export: a zip archive with one CSV sheet per report section.

use crate::allocation::analysis::{risk_return_table, sensitivity, stress_test, SensitivityVariable};
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::Recommendation;
use crate::format::{allocation_rows, format_currency, format_percentage, RUPEE};
use crate::metrics::FinancialMetrics;
use anyhow::Context;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const PERSONAL_INFO: &str = "personal_info.csv";
pub const FINANCIAL_METRICS: &str = "financial_metrics.csv";
pub const PORTFOLIO_ALLOCATION: &str = "portfolio_allocation.csv";
pub const RISK_RETURN: &str = "risk_return.csv";
pub const RECOMMENDATIONS: &str = "recommendations.csv";
pub const STRESS_TEST: &str = "stress_test.csv";
pub const SENSITIVITY: &str = "sensitivity.csv";

pub struct ReportInput<'a> {
    pub username: Option<&'a str>,
    pub profile: &'a UserProfile,
    pub metrics: &'a FinancialMetrics,
    pub recommendation: &'a Recommendation,
}

pub fn export_report(input: &ReportInput<'_>) -> anyhow::Result<Vec<u8>> {
    let sheets = [
        (PERSONAL_INFO, personal_info(input)),
        (FINANCIAL_METRICS, financial_metrics(input.metrics)),
        (PORTFOLIO_ALLOCATION, portfolio_allocation(input)),
        (RISK_RETURN, risk_return()),
        (RECOMMENDATIONS, recommendations(input.recommendation)),
        (STRESS_TEST, stress(input)),
        (SENSITIVITY, sensitivity_sheet(input.metrics)),
    ];

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, rows) in &sheets {
        zip.start_file(*name, options)
            .with_context(|| format!("start zip entry {name} failed"))?;
        zip.write_all(to_csv(rows).as_bytes())
            .with_context(|| format!("write zip entry {name} failed"))?;
    }
    let cursor = zip.finish().context("finish zip archive failed")?;
    let bytes = cursor.into_inner();

    tracing::debug!(sheets = sheets.len(), bytes = bytes.len(), "exported report");
    Ok(bytes)
}

type Rows = Vec<Vec<String>>;

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn personal_info(input: &ReportInput<'_>) -> Rows {
    let p = input.profile;
    vec![
        row(["Field", "Value"]),
        row(["Username", input.username.unwrap_or("-")]),
        row(["Monthly Salary", &format_currency(p.salary(), RUPEE, 0)]),
        row(["Monthly Expenses", &format_currency(p.expenses(), RUPEE, 0)]),
        row(["Age", &p.age().to_string()]),
        row(["Risk Tolerance", p.risk_tolerance().as_str()]),
        row(["Time Horizon", p.time_horizon().as_str()]),
        row(["Loans", p.loans().as_str()]),
        row(["Emergency Fund", &format_currency(p.emergency_fund(), RUPEE, 0)]),
        row(["Existing Investments", p.existing_investments().unwrap_or("-")]),
        row(["Goals", p.goals()]),
    ]
}

fn financial_metrics(m: &FinancialMetrics) -> Rows {
    let money = |v: f64| format_currency(v, RUPEE, 2);
    vec![
        row(["Metric", "Value"]),
        row(["Monthly Investment Capacity", &money(m.investment_capacity)]),
        row(["Adjusted Investment Capacity", &money(m.adjusted_investment_capacity)]),
        row(["Savings Rate", &format_percentage(m.savings_rate, 1)]),
        row(["Debt-to-Income Ratio", &format_percentage(m.debt_to_income * 100.0, 1)]),
        row(["Current Emergency Fund", &money(m.emergency_fund_current)]),
        row(["Target Emergency Fund", &money(m.emergency_fund_target)]),
        row(["Emergency Fund Gap", &money(m.emergency_fund_gap)]),
        row(["Emergency Fund Months", &format!("{:.1}", m.emergency_fund_months)]),
        row(["Financial Health Score", &format!("{}/100", m.financial_health_score)]),
        row(["Risk Score", &m.risk_score.to_string()]),
        row(["Risk Capacity", m.risk_capacity.description()]),
        row(["Priority Goal", &m.goal_analysis.priority_goal]),
    ]
}

fn portfolio_allocation(input: &ReportInput<'_>) -> Rows {
    let mut rows = vec![row(["Asset Class", "Percentage", "Amount (INR)"])];
    rows.extend(
        allocation_rows(
            input.recommendation.allocations(),
            input.metrics.investment_capacity,
        )
        .into_iter()
        .map(|r| vec![r.asset_class, r.percentage, r.amount]),
    );
    rows
}

fn risk_return() -> Rows {
    let mut rows = vec![row(["Asset Class", "Expected Return", "Volatility"])];
    rows.extend(risk_return_table().into_iter().map(|r| {
        vec![
            r.asset.label().to_string(),
            format_percentage(r.expected_return, 1),
            format_percentage(r.volatility, 1),
        ]
    }));
    rows
}

fn stress(input: &ReportInput<'_>) -> Rows {
    let mut rows = vec![row(["Scenario", "Impact", "Portfolio Value", "Recovery (months)"])];
    rows.extend(
        stress_test(
            input.recommendation.allocations(),
            input.metrics.investment_capacity,
        )
        .into_iter()
        .map(|r| {
            vec![
                r.scenario,
                format_percentage(r.impact_percent, 1),
                format_currency(r.portfolio_value, RUPEE, 0),
                r.recovery_months.to_string(),
            ]
        }),
    );
    rows
}

fn sensitivity_sheet(m: &FinancialMetrics) -> Rows {
    let p = &m.projections;
    let mut rows = vec![row(["Variable", "Level", "Future Value"])];
    rows.extend(
        sensitivity(p.monthly_investment, p.time_horizon_years)
            .into_iter()
            .map(|pt| {
                let (variable, level) = match pt.variable {
                    SensitivityVariable::AnnualReturn => ("Annual Return", pt.level * 100.0),
                    SensitivityVariable::Contribution => ("Monthly Investment", pt.level * 100.0),
                };
                vec![
                    variable.to_string(),
                    format_percentage(level, 0),
                    format_currency(pt.future_value, RUPEE, 0),
                ]
            }),
    );
    rows
}

fn recommendations(rec: &Recommendation) -> Rows {
    let mut rows = vec![row(["Section", "Text"])];
    rows.push(row(["Risk Level", rec.risk_level().as_str()]));
    rows.extend(
        rec.narrative_bullets()
            .into_iter()
            .map(|b| vec!["Recommendation".to_string(), b]),
    );
    rows.push(row(["Next Steps", rec.next_steps()]));
    rows
}

fn to_csv(rows: &Rows) -> String {
    let mut out = String::new();
    for r in rows {
        let line: Vec<String> = r.iter().map(|c| escape(c)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::assemble;
    use crate::metrics::{calculate_metrics, RiskScoreStrategy};
    use crate::testing::reference_profile;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::io::Read;

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut s = String::new();
        file.read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn writes_every_sheet() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let profile = reference_profile();
        let metrics = calculate_metrics(&profile, &[], RiskScoreStrategy::Simple, now);
        let payload = json!({
            "narrative": "Favour equity index funds. Keep some debt, for stability.",
            "allocations": {"Equity": 70, "Debt": 30},
            "next_steps": "Start a SIP, then review yearly."
        });
        let rec = assemble(&profile, &metrics, &payload, now).unwrap();
        let bytes = export_report(&ReportInput {
            username: Some("asha"),
            profile: &profile,
            metrics: &metrics,
            recommendation: &rec,
        })
        .unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 7);

        let allocation = read_entry(&bytes, PORTFOLIO_ALLOCATION);
        assert!(allocation.contains("Equity,70.0%,\"₹14,000\"\r\n"));

        let recs = read_entry(&bytes, RECOMMENDATIONS);
        assert!(recs.contains("Recommendation,Favour equity index funds.\r\n"));
        assert!(recs.contains("Recommendation,\"Keep some debt, for stability.\"\r\n"));
        assert!(recs.contains("\"Start a SIP, then review yearly.\""));

        let info = read_entry(&bytes, PERSONAL_INFO);
        assert!(info.contains("Username,asha"));
        assert!(read_entry(&bytes, RISK_RETURN).contains("Real Estate,11.0%,12.0%"));

        // 70 * -40% + 30 * 10% = -25% on one year of 20,000 a month.
        let stress = read_entry(&bytes, STRESS_TEST);
        assert!(stress.contains("2008 Financial Crisis,-25.0%,\"₹180,000\",50\r\n"));

        let sens = read_entry(&bytes, SENSITIVITY);
        assert_eq!(sens.lines().count(), 11);
        assert!(sens.contains("Annual Return,8%,"));
        assert!(sens.contains("Monthly Investment,120%,"));
    }

    #[test]
    fn escapes_quotes_and_commas() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
