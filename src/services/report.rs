// src/services/report.rs
use serde::Serialize;
use std::io::Write;

use crate::models::Suggestion;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NOT_AVAILABLE: &str = "N/A";

/// A suggestion as displayed: ROI to 2 dp, money to cents, earnings as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Type")]
    pub option_type: String,
    #[serde(rename = "Strike")]
    pub strike: f64,
    #[serde(rename = "Expiration")]
    pub expiration: String,
    #[serde(rename = "Premium")]
    pub premium: f64,
    #[serde(rename = "Cost Basis")]
    pub cost_basis: f64,
    #[serde(rename = "Monthly ROI (%)")]
    pub monthly_roi_pct: f64,
    #[serde(rename = "Annualized ROI (%)")]
    pub annualized_roi_pct: f64,
    #[serde(rename = "Earnings")]
    pub earnings: String,
    #[serde(rename = "Break Even")]
    pub break_even: f64,
    #[serde(rename = "Capital Req")]
    pub capital_required: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<&Suggestion> for SuggestionRow {
    fn from(s: &Suggestion) -> Self {
        SuggestionRow {
            symbol: s.ticker.clone(),
            option_type: s.option_type.to_string(),
            strike: round2(s.strike),
            expiration: s.expiration.format(DATE_FORMAT).to_string(),
            premium: round2(s.premium),
            cost_basis: round2(s.cost_basis),
            monthly_roi_pct: round2(s.monthly_roi_pct),
            annualized_roi_pct: round2(s.annualized_roi_pct),
            earnings: s
                .next_earnings
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            break_even: round2(s.break_even),
            capital_required: s.capital_required.round(),
        }
    }
}

pub fn rows(suggestions: &[Suggestion]) -> Vec<SuggestionRow> {
    suggestions.iter().map(SuggestionRow::from).collect()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_money(value: f64, decimals: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let text = format!("{:.*}", decimals, value.abs());
    let (whole, frac) = match text.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (text.as_str(), None),
    };
    match frac {
        Some(frac) => format!("{}${}.{}", sign, group_thousands(whole), frac),
        None => format!("{}${}", sign, group_thousands(whole)),
    }
}

/// `$1,234.57`
pub fn format_currency(value: f64) -> String {
    format_money(value, 2)
}

/// `$10,000`
pub fn format_whole_currency(value: f64) -> String {
    format_money(value, 0)
}

/// `1.23%`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

const HEADERS: [&str; 11] = [
    "Symbol",
    "Type",
    "Strike",
    "Expiration",
    "Premium",
    "Cost Basis",
    "Monthly ROI (%)",
    "Annualized ROI (%)",
    "Earnings",
    "Break Even",
    "Capital Req",
];

fn cells(row: &SuggestionRow) -> [String; 11] {
    [
        row.symbol.clone(),
        row.option_type.clone(),
        format_currency(row.strike),
        row.expiration.clone(),
        format_currency(row.premium),
        format_currency(row.cost_basis),
        format_percent(row.monthly_roi_pct),
        format_percent(row.annualized_roi_pct),
        row.earnings.clone(),
        format_currency(row.break_even),
        format_whole_currency(row.capital_required),
    ]
}

/// Fixed-width text table, one line per row after the header.
pub fn render_table(rows: &[SuggestionRow]) -> String {
    let body: Vec<[String; 11]> = rows.iter().map(cells).collect();
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for line in &body {
        for (w, cell) in widths.iter_mut().zip(line.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<width$}", h, width = *w))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for line in &body {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                // symbols, type, dates left-aligned; numbers right-aligned
                if matches!(i, 0 | 1 | 3 | 8) {
                    format!("{:<width$}", cell, width = *w)
                } else {
                    format!("{:>width$}", cell, width = *w)
                }
            })
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn write_csv<W: Write>(rows: &[SuggestionRow], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
