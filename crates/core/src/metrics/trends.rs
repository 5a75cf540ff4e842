use crate::domain::profile::ProfileSnapshot;
use serde::{Deserialize, Serialize};

/// Prior profiles considered for trend detection.
pub const MAX_HISTORY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTrendKind {
    InsufficientData,
    StrongGrowth,
    ModerateGrowth,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseTrendKind {
    InsufficientData,
    IncreasingRapidly,
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend<K> {
    pub trend: K,
    pub change_percent: f64,
    pub note: String,
    /// Up to the three most recent values, oldest first, current last.
    pub recent_values: Vec<f64>,
}

/// `history` is newest first, the order storage returns it in.
pub fn income_trend(history: &[ProfileSnapshot], current_salary: f64) -> Trend<IncomeTrendKind> {
    let Some((change, recent_values)) = series_change(history, current_salary, |p| p.salary)
    else {
        return Trend {
            trend: IncomeTrendKind::InsufficientData,
            change_percent: 0.0,
            note: "Continue tracking".to_string(),
            recent_values: Vec::new(),
        };
    };

    let (trend, note) = if change > 10.0 {
        (
            IncomeTrendKind::StrongGrowth,
            "Consider increasing investment allocation due to income growth",
        )
    } else if change > 0.0 {
        (
            IncomeTrendKind::ModerateGrowth,
            "Maintain current investment strategy with slight increase",
        )
    } else if change > -5.0 {
        (
            IncomeTrendKind::Stable,
            "Focus on consistency and expense optimization",
        )
    } else {
        (
            IncomeTrendKind::Declining,
            "Consider expense reduction and emergency fund priority",
        )
    };

    Trend {
        trend,
        change_percent: super::round_to(change, 1),
        note: note.to_string(),
        recent_values,
    }
}

pub fn expense_trend(
    history: &[ProfileSnapshot],
    current_expenses: f64,
) -> Trend<ExpenseTrendKind> {
    let Some((change, recent_values)) = series_change(history, current_expenses, |p| p.expenses)
    else {
        return Trend {
            trend: ExpenseTrendKind::InsufficientData,
            change_percent: 0.0,
            note: "Continue tracking".to_string(),
            recent_values: Vec::new(),
        };
    };

    let (trend, note) = if change > 15.0 {
        (
            ExpenseTrendKind::IncreasingRapidly,
            "Consider expense review and budgeting",
        )
    } else if change > 5.0 {
        (ExpenseTrendKind::Increasing, "Monitor expense growth")
    } else if change > -5.0 {
        (ExpenseTrendKind::Stable, "Expenses under control")
    } else {
        (ExpenseTrendKind::Decreasing, "Good expense management")
    };

    Trend {
        trend,
        change_percent: super::round_to(change, 1),
        note: note.to_string(),
        recent_values,
    }
}

/// Percent change from the most recent stored value to `current`, or `None`
/// with fewer than two stored profiles.
fn series_change(
    history: &[ProfileSnapshot],
    current: f64,
    value: impl Fn(&ProfileSnapshot) -> f64,
) -> Option<(f64, Vec<f64>)> {
    if history.len() < 2 {
        return None;
    }
    let mut series: Vec<f64> = history
        .iter()
        .take(MAX_HISTORY)
        .rev()
        .map(value)
        .collect();
    series.push(current);

    let previous = series[series.len() - 2];
    let change = if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };
    let recent = series[series.len().saturating_sub(3)..].to_vec();
    Some((change, recent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snap(salary: f64, expenses: f64, day: u32) -> ProfileSnapshot {
        ProfileSnapshot {
            salary,
            expenses,
            created_at: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn needs_two_prior_profiles() {
        let t = income_trend(&[snap(40_000.0, 20_000.0, 1)], 50_000.0);
        assert_eq!(t.trend, IncomeTrendKind::InsufficientData);
        assert_eq!(t.change_percent, 0.0);
    }

    #[test]
    fn compares_against_most_recent_profile() {
        // Newest first.
        let history = [snap(45_000.0, 20_000.0, 3), snap(40_000.0, 25_000.0, 2)];
        let income = income_trend(&history, 50_000.0);
        assert_eq!(income.trend, IncomeTrendKind::StrongGrowth);
        assert_eq!(income.change_percent, 11.1);
        assert_eq!(income.recent_values, vec![40_000.0, 45_000.0, 50_000.0]);

        let expenses = expense_trend(&history, 18_000.0);
        assert_eq!(expenses.trend, ExpenseTrendKind::Decreasing);
        assert_eq!(expenses.change_percent, -10.0);
    }

    #[test]
    fn zero_previous_value_does_not_divide() {
        let history = [snap(45_000.0, 0.0, 3), snap(40_000.0, 0.0, 2)];
        let t = expense_trend(&history, 5_000.0);
        assert_eq!(t.change_percent, 0.0);
        assert_eq!(t.trend, ExpenseTrendKind::Stable);
    }
}
