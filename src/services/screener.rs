// src/services/screener.rs
//! Cash-secured put screening for the wheel strategy.
//!
//! A contract qualifies when it is out of the money, one contract fits in the
//! available capital, it has a usable premium, and its linearly scaled
//! monthly return clears the threshold.

use chrono::NaiveDate;
use log::{debug, info};
use thiserror::Error;

use super::provider::MarketDataProvider;
use crate::models::{OptionContract, OptionType, Suggestion, CONTRACT_MULTIPLIER};

const EXPIRATION_FORMAT: &str = "%Y-%m-%d";
const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_MONTH: f64 = 30.0;
const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScreenError {
    #[error("spot price unavailable for {0}")]
    InvalidSpot(String),
    #[error("No options data found for {0}")]
    NoOptions(String),
}

/// Per-ticker inputs that stay fixed across expirations.
#[derive(Debug, Clone, Copy)]
pub struct ScreenParams {
    pub capital: f64,
    pub min_monthly_roi_pct: f64,
    pub max_weeks: u32,
}

/// Returns of selling one contract, linearly scaled by days to expiration.
///
/// The scaling is simple, not compounded, so short-dated contracts look
/// better than they would annualized properly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnMetrics {
    pub capital_required: f64,
    pub total_premium: f64,
    pub trade_roi_pct: f64,
    pub monthly_roi_pct: f64,
    pub annualized_roi_pct: f64,
}

impl ReturnMetrics {
    pub fn compute(strike: f64, premium: f64, days_to_expiration: i64) -> Self {
        let days = days_to_expiration.max(1) as f64;
        let capital_required = strike * CONTRACT_MULTIPLIER;
        let total_premium = premium * CONTRACT_MULTIPLIER;
        let trade_roi_pct = (total_premium / capital_required) * 100.0;

        ReturnMetrics {
            capital_required,
            total_premium,
            trade_roi_pct,
            monthly_roi_pct: trade_roi_pct * (DAYS_PER_MONTH / days),
            annualized_roi_pct: trade_roi_pct * (DAYS_PER_YEAR / days),
        }
    }
}

/// Keeps expirations with `0 < days <= max_weeks * 7`, paired with their day count.
/// Strings that do not parse as dates are dropped.
pub fn filter_expirations(
    expirations: &[String],
    today: NaiveDate,
    max_weeks: u32,
) -> Vec<(NaiveDate, i64)> {
    let horizon = i64::from(max_weeks) * DAYS_PER_WEEK;

    expirations
        .iter()
        .filter_map(|raw| NaiveDate::parse_from_str(raw.trim(), EXPIRATION_FORMAT).ok())
        .map(|date| (date, (date - today).num_days()))
        .filter(|(_, days)| *days > 0 && *days <= horizon)
        .collect()
}

/// Bid when there is one, otherwise the last trade. `None` when neither is positive.
pub fn resolve_premium(contract: &OptionContract) -> Option<f64> {
    let premium = if contract.bid > 0.0 {
        contract.bid
    } else {
        contract.last_price
    };
    (premium > 0.0).then_some(premium)
}

/// Applies the strike, capital, premium and threshold filters to one expiration's puts.
pub fn evaluate_chain(
    ticker: &str,
    spot: f64,
    expiration: NaiveDate,
    days_to_expiration: i64,
    puts: &[OptionContract],
    params: &ScreenParams,
    next_earnings: Option<NaiveDate>,
) -> Vec<Suggestion> {
    let days = days_to_expiration.max(1);

    puts.iter()
        .filter(|c| {
            c.strike > 0.0 && c.strike < spot && c.strike * CONTRACT_MULTIPLIER <= params.capital
        })
        .filter_map(|c| {
            let premium = resolve_premium(c)?;
            let metrics = ReturnMetrics::compute(c.strike, premium, days);
            if metrics.monthly_roi_pct < params.min_monthly_roi_pct {
                return None;
            }

            Some(Suggestion {
                ticker: ticker.to_string(),
                option_type: OptionType::Put,
                strike: c.strike,
                expiration,
                days_to_expiration: days,
                premium,
                cost_basis: c.strike - premium,
                monthly_roi_pct: metrics.monthly_roi_pct,
                annualized_roi_pct: metrics.annualized_roi_pct,
                next_earnings,
                break_even: c.strike - premium,
                capital_required: metrics.capital_required,
            })
        })
        .collect()
}

/// Screens every expiration of one ticker inside the horizon.
///
/// A chain that cannot be fetched is skipped; only a missing spot price or an
/// empty expiration list is reported back to the caller.
pub async fn screen(
    provider: &dyn MarketDataProvider,
    ticker: &str,
    spot: Option<f64>,
    expirations: &[String],
    params: &ScreenParams,
    next_earnings: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Vec<Suggestion>, ScreenError> {
    let spot = match spot {
        Some(price) if price.is_finite() && price > 0.0 => price,
        _ => return Err(ScreenError::InvalidSpot(ticker.to_string())),
    };
    if expirations.is_empty() {
        return Err(ScreenError::NoOptions(ticker.to_string()));
    }

    let window = filter_expirations(expirations, today, params.max_weeks);
    debug!(
        "{}: {} of {} expirations within {} weeks",
        ticker,
        window.len(),
        expirations.len(),
        params.max_weeks
    );

    let mut suggestions = Vec::new();
    for (expiration, days) in window {
        let label = expiration.format(EXPIRATION_FORMAT).to_string();
        let puts = match provider.get_put_chain(ticker, &label).await {
            Ok(puts) => puts,
            Err(e) => {
                debug!("Skipping {} {} chain: {}", ticker, label, e);
                continue;
            }
        };

        suggestions.extend(evaluate_chain(
            ticker,
            spot,
            expiration,
            days,
            &puts,
            params,
            next_earnings,
        ));
    }

    info!("{}: {} qualifying puts", ticker, suggestions.len());
    Ok(suggestions)
}
