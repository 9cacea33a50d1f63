// src/services/scan.rs
use chrono::NaiveDate;
use log::{info, warn};
use std::cmp::Ordering;
use thiserror::Error;

use super::provider::MarketDataProvider;
use super::screener::{screen, ScreenError, ScreenParams};
use crate::config::ScanSettings;
use crate::models::Suggestion;

#[derive(Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("Please enter at least one ticker symbol.")]
    EmptyWatchlist,
}

/// What happened to one ticker of the watchlist.
#[derive(Debug, Clone)]
pub enum TickerOutcome {
    Screened { ticker: String, suggestions: usize },
    Unavailable { ticker: String, reason: String },
    NoOptions { ticker: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Screened { ticker, .. }
            | TickerOutcome::Unavailable { ticker, .. }
            | TickerOutcome::NoOptions { ticker } => ticker,
        }
    }

    /// Message to show the user, if this outcome deserves one.
    pub fn warning(&self) -> Option<String> {
        match self {
            TickerOutcome::Screened { .. } => None,
            TickerOutcome::Unavailable { ticker, reason } => {
                Some(format!("Could not fetch data for {}: {}", ticker, reason))
            }
            TickerOutcome::NoOptions { ticker } => Some(format!("No options found for {}", ticker)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub suggestions: Vec<Suggestion>,
    pub outcomes: Vec<TickerOutcome>,
}

impl ScanReport {
    /// Suggestions by monthly ROI, highest first. Ties keep scan order.
    pub fn sorted(&self) -> Vec<Suggestion> {
        let mut sorted = self.suggestions.clone();
        sorted.sort_by(|a, b| {
            b.monthly_roi_pct
                .partial_cmp(&a.monthly_roi_pct)
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    pub fn warnings(&self) -> Vec<String> {
        self.outcomes.iter().filter_map(TickerOutcome::warning).collect()
    }

    /// Row `index` of the sorted table.
    pub fn selection(&self, index: usize) -> Option<Suggestion> {
        self.sorted().into_iter().nth(index)
    }
}

/// Splits comma-separated tickers, trimming and upper-casing each. Duplicates are kept.
pub fn parse_watchlist(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Screens the watchlist one ticker at a time.
///
/// `on_progress(index, total, ticker)` runs before each ticker is fetched.
/// A failing ticker is recorded in the report and the scan moves on.
pub async fn run_scan<F>(
    provider: &dyn MarketDataProvider,
    settings: &ScanSettings,
    today: NaiveDate,
    mut on_progress: F,
) -> Result<ScanReport, ScanError>
where
    F: FnMut(usize, usize, &str) + Send,
{
    if settings.tickers.is_empty() {
        return Err(ScanError::EmptyWatchlist);
    }

    let params = ScreenParams {
        capital: settings.capital,
        min_monthly_roi_pct: settings.min_monthly_roi_pct,
        max_weeks: settings.max_weeks,
    };
    let total = settings.tickers.len();
    let mut report = ScanReport::default();

    for (i, ticker) in settings.tickers.iter().enumerate() {
        on_progress(i, total, ticker);
        info!("Analyzing {} ({}/{})", ticker, i + 1, total);

        // Only a resolved quote with no expirations counts as "no options";
        // a ticker that cannot be quoted at all is unavailable.
        let quote = match provider.get_quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Could not fetch data for {}: {}", ticker, e);
                report.outcomes.push(TickerOutcome::Unavailable {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let outcome = match screen(
            provider,
            ticker,
            quote.spot_price,
            &quote.expirations,
            &params,
            quote.next_earnings,
            today,
        )
        .await
        {
            Ok(found) => {
                let count = found.len();
                report.suggestions.extend(found);
                TickerOutcome::Screened {
                    ticker: ticker.clone(),
                    suggestions: count,
                }
            }
            Err(ScreenError::NoOptions(_)) => TickerOutcome::NoOptions {
                ticker: ticker.clone(),
            },
            Err(e @ ScreenError::InvalidSpot(_)) => TickerOutcome::Unavailable {
                ticker: ticker.clone(),
                reason: e.to_string(),
            },
        };
        if let Some(message) = outcome.warning() {
            warn!("{}", message);
        }
        report.outcomes.push(outcome);
    }

    info!(
        "Analysis complete: {} opportunities across {} tickers",
        report.suggestions.len(),
        total
    );
    Ok(report)
}
