// src/services/bands.rs
use log::{info, warn};
use thiserror::Error;

use super::provider::{FetchError, MarketDataProvider};
use crate::models::{BandPoint, DailyBar};

pub const BAND_WINDOW: usize = 20;
pub const BAND_SIGMAS: f64 = 2.0;
pub const DEFAULT_CHART_DAYS: usize = 90;
/// Roughly twenty years of trading days.
pub const MAX_DISPLAY_DAYS: usize = 5_000;

#[derive(Debug, Error)]
pub enum BandsError {
    #[error("display window must be between 1 and 5000 days")]
    InvalidWindow,
    #[error("No historical data for {0}")]
    NoHistory(String),
    #[error("Could not load chart for {ticker}: {source}")]
    Fetch {
        ticker: String,
        #[source]
        source: FetchError,
    },
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). Zero for fewer than two values.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Rolling mean and `k_sigma` envelope over closes, trimmed to the last `display_days` bars.
pub fn compute_bands(
    bars: &[DailyBar],
    window: usize,
    k_sigma: f64,
    display_days: usize,
) -> Vec<BandPoint> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let start = bars.len().saturating_sub(display_days);

    bars.iter()
        .enumerate()
        .skip(start)
        .map(|(i, bar)| {
            let (mean, std_dev) = if window > 0 && i + 1 >= window {
                let slice = &closes[i + 1 - window..=i];
                let m = mean(slice);
                (Some(m), Some(sample_std_dev(slice, m)))
            } else {
                (None, None)
            };

            BandPoint {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                mean,
                std_dev,
                upper: mean.zip(std_dev).map(|(m, s)| m + k_sigma * s),
                lower: mean.zip(std_dev).map(|(m, s)| m - k_sigma * s),
            }
        })
        .collect()
}

/// Fetches `display_days` plus a warm-up of history and returns the band series.
pub async fn bands(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    display_days: usize,
) -> Result<Vec<BandPoint>, BandsError> {
    if display_days == 0 || display_days > MAX_DISPLAY_DAYS {
        return Err(BandsError::InvalidWindow);
    }

    let lookback = display_days
        .checked_add(BAND_WINDOW)
        .ok_or(BandsError::InvalidWindow)?;
    let bars = match provider.get_daily_bars(ticker, lookback).await {
        Ok(bars) => bars,
        Err(e) if e.is_no_data() => return Err(BandsError::NoHistory(ticker.to_string())),
        Err(source) => {
            return Err(BandsError::Fetch {
                ticker: ticker.to_string(),
                source,
            })
        }
    };
    if bars.is_empty() {
        return Err(BandsError::NoHistory(ticker.to_string()));
    }
    if bars.len() < lookback {
        warn!(
            "{}: only {} of {} requested bars, early band points will be empty",
            ticker,
            bars.len(),
            lookback
        );
    }

    let series = compute_bands(&bars, BAND_WINDOW, BAND_SIGMAS, display_days);
    info!("{}: computed {} band points", ticker, series.len());
    Ok(series)
}
