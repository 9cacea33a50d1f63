// src/config.rs
use chrono::{NaiveDate, Utc};
use chrono_tz::US::Eastern;
use log::warn;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::services::scan::parse_watchlist;

pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_MONTHLY_ROI: f64 = 1.0;
pub const DEFAULT_MAX_WEEKS: u32 = 4;
pub const DEFAULT_WATCHLIST: &str = "PLTR, SOFI, AMD, F, T, INTC";

pub const MIN_MONTHLY_ROI: f64 = 0.5;
pub const MAX_MONTHLY_ROI: f64 = 5.0;
pub const MIN_WEEKS: u32 = 1;
pub const MAX_WEEKS: u32 = 12;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Available capital must be a positive amount, got {0}")]
    Capital(f64),
    #[error("Desired monthly ROI must be between 0.5% and 5.0%, got {0}%")]
    MonthlyRoi(f64),
    #[error("Max expiration must be between 1 and 12 weeks, got {0}")]
    MaxWeeks(u32),
    #[error("Please enter at least one ticker symbol.")]
    EmptyWatchlist,
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Parameters of one screening run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub capital: f64,
    pub min_monthly_roi_pct: f64,
    pub max_weeks: u32,
    pub tickers: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            capital: DEFAULT_CAPITAL,
            min_monthly_roi_pct: DEFAULT_MONTHLY_ROI,
            max_weeks: DEFAULT_MAX_WEEKS,
            tickers: parse_watchlist(DEFAULT_WATCHLIST),
        }
    }
}

impl ScanSettings {
    /// Reads `WHEEL_*` overrides on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = ScanSettings::default();
        if let Some(capital) = env_parse::<f64>("WHEEL_CAPITAL")? {
            settings.capital = capital;
        }
        if let Some(roi) = env_parse::<f64>("WHEEL_MONTHLY_ROI")? {
            settings.min_monthly_roi_pct = roi;
        }
        if let Some(weeks) = env_parse::<u32>("WHEEL_MAX_WEEKS")? {
            settings.max_weeks = weeks;
        }
        if let Ok(list) = env::var("WHEEL_WATCHLIST") {
            settings.tickers = parse_watchlist(&list);
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(ConfigError::Capital(self.capital));
        }
        if !(MIN_MONTHLY_ROI..=MAX_MONTHLY_ROI).contains(&self.min_monthly_roi_pct) {
            return Err(ConfigError::MonthlyRoi(self.min_monthly_roi_pct));
        }
        if !(MIN_WEEKS..=MAX_WEEKS).contains(&self.max_weeks) {
            return Err(ConfigError::MaxWeeks(self.max_weeks));
        }
        if self.tickers.is_empty() {
            return Err(ConfigError::EmptyWatchlist);
        }
        Ok(())
    }
}

/// Body of `POST /api/v1/scan`. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub capital: Option<f64>,
    pub desired_roi: Option<f64>,
    pub max_weeks: Option<u32>,
    pub watchlist: String,
}

impl ScanRequest {
    pub fn into_settings(self) -> Result<ScanSettings, ConfigError> {
        let defaults = ScanSettings::default();
        let settings = ScanSettings {
            capital: self.capital.unwrap_or(defaults.capital),
            min_monthly_roi_pct: self.desired_roi.unwrap_or(defaults.min_monthly_roi_pct),
            max_weeks: self.max_weeks.unwrap_or(defaults.max_weeks),
            tickers: parse_watchlist(&self.watchlist),
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ConfigError::Invalid {
                name: "WHEEL_OUTPUT",
                value: other.to_string(),
            }),
        }
    }
}

pub fn output_format() -> Result<OutputFormat, ConfigError> {
    Ok(env_parse::<OutputFormat>("WHEEL_OUTPUT")?.unwrap_or(OutputFormat::Table))
}

pub fn server_port() -> Result<u16, ConfigError> {
    match env::var("PORT") {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: raw,
        }),
        Err(_) => {
            warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
            Ok(DEFAULT_PORT)
        }
    }
}

/// Current calendar date on the US equity market clock.
pub fn market_today() -> NaiveDate {
    Utc::now().with_timezone(&Eastern).date_naive()
}

fn env_parse<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}
