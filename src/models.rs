// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of underlying shares one equity option contract covers.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub ticker: String,
    pub spot_price: Option<f64>,
    /// Expiration dates as `YYYY-MM-DD` strings, in provider order.
    pub expirations: Vec<String>,
    pub next_earnings: Option<NaiveDate>,
}

/// One strike of a put chain for a single expiration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    #[serde(default)]
    pub last_price: f64,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cash-secured put that cleared the monthly ROI threshold.
///
/// ROI figures are kept unrounded; rounding happens when the row is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub ticker: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub days_to_expiration: i64,
    pub premium: f64,
    pub cost_basis: f64,
    pub monthly_roi_pct: f64,
    pub annualized_roi_pct: f64,
    pub next_earnings: Option<NaiveDate>,
    pub break_even: f64,
    pub capital_required: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// A daily bar with its rolling volatility envelope.
///
/// The statistics are `None` when fewer bars than the rolling window preceded this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}
