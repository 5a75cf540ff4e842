//! Display helpers shared by the API, the CLI and report export.

use serde::Serialize;
use std::collections::BTreeMap;

pub const RUPEE: &str = "₹";

/// `1234567.891` -> `1,234,567.89` with `decimals = 2`. Non-finite input
/// formats as zero.
pub fn format_number(number: f64, decimals: usize) -> String {
    if !number.is_finite() {
        return format!("{:.*}", decimals, 0.0);
    }
    let fixed = format!("{:.*}", decimals, number.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = number < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

pub fn format_currency(amount: f64, symbol: &str, decimals: usize) -> String {
    format!("{symbol}{}", format_number(amount, decimals))
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.decimals$}%")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationRow {
    pub asset_class: String,
    pub percentage: String,
    pub amount: String,
}

/// One row per allocation bucket with the rupee amount of `capacity` it
/// represents, rounded to whole rupees.
pub fn allocation_rows(allocations: &BTreeMap<String, f64>, capacity: f64) -> Vec<AllocationRow> {
    allocations
        .iter()
        .map(|(asset, pct)| AllocationRow {
            asset_class: asset.clone(),
            percentage: format_percentage(*pct, 1),
            amount: format_currency((pct / 100.0 * capacity).round(), RUPEE, 0),
        })
        .collect()
}
