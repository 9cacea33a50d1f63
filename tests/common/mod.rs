// In-memory market data for driving the screener without the network.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::sync::Mutex;

use wheel_screener::models::{DailyBar, OptionContract, QuoteSnapshot};
use wheel_screener::services::provider::{FetchError, MarketDataProvider};

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NoData,
    UnknownSymbol,
    Transport,
}

impl Failure {
    fn to_error(self, what: &str) -> FetchError {
        match self {
            Failure::NoData => FetchError::NoData(what.to_string()),
            Failure::UnknownSymbol => FetchError::UnknownSymbol(what.to_string()),
            Failure::Transport => FetchError::Status(503),
        }
    }
}

#[derive(Default)]
pub struct FakeProvider {
    quotes: HashMap<String, Result<QuoteSnapshot, Failure>>,
    chains: HashMap<(String, String), Result<Vec<OptionContract>, Failure>>,
    bars: HashMap<String, Result<Vec<DailyBar>, Failure>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, ticker: &str, spot: f64, expirations: &[&str]) -> Self {
        self.quotes.insert(
            ticker.to_string(),
            Ok(QuoteSnapshot {
                ticker: ticker.to_string(),
                spot_price: Some(spot),
                expirations: expirations.iter().map(|e| e.to_string()).collect(),
                next_earnings: None,
            }),
        );
        self
    }

    pub fn with_snapshot(mut self, snapshot: QuoteSnapshot) -> Self {
        self.quotes.insert(snapshot.ticker.clone(), Ok(snapshot));
        self
    }

    pub fn with_failing_quote(mut self, ticker: &str, failure: Failure) -> Self {
        self.quotes.insert(ticker.to_string(), Err(failure));
        self
    }

    pub fn with_chain(mut self, ticker: &str, expiration: &str, puts: Vec<OptionContract>) -> Self {
        self.chains
            .insert((ticker.to_string(), expiration.to_string()), Ok(puts));
        self
    }

    pub fn with_failing_chain(mut self, ticker: &str, expiration: &str, failure: Failure) -> Self {
        self.chains
            .insert((ticker.to_string(), expiration.to_string()), Err(failure));
        self
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(ticker.to_string(), Ok(bars));
        self
    }

    pub fn with_failing_bars(mut self, ticker: &str, failure: Failure) -> Self {
        self.bars.insert(ticker.to_string(), Err(failure));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn get_quote(&self, ticker: &str) -> Result<QuoteSnapshot, FetchError> {
        self.record(format!("quote {}", ticker));
        match self.quotes.get(ticker) {
            Some(Ok(snapshot)) => Ok(snapshot.clone()),
            Some(Err(failure)) => Err(failure.to_error(ticker)),
            None => Err(FetchError::UnknownSymbol(ticker.to_string())),
        }
    }

    async fn get_put_chain(
        &self,
        ticker: &str,
        expiration: &str,
    ) -> Result<Vec<OptionContract>, FetchError> {
        self.record(format!("chain {} {}", ticker, expiration));
        match self.chains.get(&(ticker.to_string(), expiration.to_string())) {
            Some(Ok(puts)) => Ok(puts.clone()),
            Some(Err(failure)) => Err(failure.to_error(expiration)),
            None => Err(FetchError::NoData(expiration.to_string())),
        }
    }

    async fn get_daily_bars(
        &self,
        ticker: &str,
        lookback_days: usize,
    ) -> Result<Vec<DailyBar>, FetchError> {
        self.record(format!("bars {} {}", ticker, lookback_days));
        match self.bars.get(ticker) {
            Some(Ok(bars)) => {
                let skip = bars.len().saturating_sub(lookback_days);
                Ok(bars[skip..].to_vec())
            }
            Some(Err(failure)) => Err(failure.to_error(ticker)),
            None => Err(FetchError::NoData(ticker.to_string())),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn put(strike: f64, last_price: f64, bid: f64, ask: f64) -> OptionContract {
    OptionContract {
        strike,
        last_price,
        bid,
        ask,
    }
}

pub fn flat_bars(count: usize, close: f64) -> Vec<DailyBar> {
    let start = date(2023, 6, 1);
    (0..count)
        .map(|i| DailyBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
        })
        .collect()
}
