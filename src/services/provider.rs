// src/services/provider.rs
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DailyBar, OptionContract, QuoteSnapshot};

/// Why a provider call produced nothing usable.
///
/// `NoData` means the provider answered but had nothing for the request.
/// `UnknownSymbol` means the ticker itself could not be resolved to a quote;
/// the other variants mean the request itself failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data: {0}")]
    NoData(String),
    #[error("symbol {0} not found")]
    UnknownSymbol(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchError::NoData(_))
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_quote(&self, ticker: &str) -> Result<QuoteSnapshot, FetchError>;

    async fn get_put_chain(
        &self,
        ticker: &str,
        expiration: &str,
    ) -> Result<Vec<OptionContract>, FetchError>;

    /// Most recent `lookback_days` daily bars, oldest first.
    async fn get_daily_bars(
        &self,
        ticker: &str,
        lookback_days: usize,
    ) -> Result<Vec<DailyBar>, FetchError>;
}
