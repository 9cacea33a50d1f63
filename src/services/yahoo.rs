// src/services/yahoo.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::US::Eastern;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;
use tokio::sync::Mutex;

use super::provider::{FetchError, MarketDataProvider};
use crate::models::{DailyBar, OptionContract, QuoteSnapshot};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const CONSENT_URL: &str = "https://fc.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

// ── Yahoo payloads ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    option_chain: ResultEnvelope<OptionChainResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: ResultEnvelope<QuoteSummaryResult>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ResultEnvelope<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct ResultEnvelope<T> {
    result: Option<Vec<T>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionChainResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    quote: Option<YahooQuote>,
    #[serde(default)]
    options: Vec<OptionSet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OptionSet {
    #[serde(default)]
    puts: Vec<YahooContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooContract {
    strike: f64,
    last_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    calendar_events: Option<CalendarEvents>,
}

#[derive(Debug, Deserialize)]
struct CalendarEvents {
    earnings: Option<EarningsEvents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsEvents {
    #[serde(default)]
    earnings_date: Vec<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: i64,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl<T> ResultEnvelope<T> {
    fn into_first(self, what: &str) -> Result<T, FetchError> {
        if let Some(err) = self.error {
            let code = err.code.unwrap_or_default();
            let description = err.description.unwrap_or_default();
            if code.eq_ignore_ascii_case("Not Found") {
                return Err(FetchError::NoData(format!("{}: {}", what, description)));
            }
            return Err(FetchError::Decode(format!("{} {}: {}", what, code, description)));
        }
        self.result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NoData(format!("empty {} result", what)))
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Yahoo Finance market-data client.
///
/// Yahoo's JSON endpoints want a session cookie plus a matching crumb.
/// The crumb is fetched lazily and cached until the API answers 401.
pub struct YahooClient {
    client: Client,
    base_url: String,
    consent_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    /// Builds a client against `YAHOO_BASE_URL` and `YAHOO_CONSENT_URL`, or the
    /// public endpoints when unset.
    pub fn from_env() -> Result<Self, FetchError> {
        let base_url = env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Self::new(base_url)?;
        Ok(match env::var("YAHOO_CONSENT_URL") {
            Ok(url) => client.with_consent_url(url),
            Err(_) => client,
        })
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;

        Ok(YahooClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consent_url: CONSENT_URL.to_string(),
            crumb: Mutex::new(None),
        })
    }

    /// Page visited for the session cookie before each crumb request.
    pub fn with_consent_url(mut self, url: impl Into<String>) -> Self {
        self.consent_url = url.into();
        self
    }

    async fn crumb(&self) -> Result<String, FetchError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com answers 404 but still sets the session cookie.
        if let Err(e) = self.client.get(&self.consent_url).send().await {
            debug!("Consent cookie request failed: {}", e);
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let crumb = resp.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(FetchError::Decode("Yahoo returned an unusable crumb".to_string()));
        }

        info!("Obtained Yahoo session crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 0..2 {
            let crumb = self.crumb().await?;
            debug!("GET {} {:?}", url, query);
            let resp = self
                .client
                .get(&url)
                .query(query)
                .query(&[("crumb", crumb)])
                .send()
                .await?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED && attempt == 0 {
                warn!("Yahoo rejected the session crumb, refreshing");
                self.crumb.lock().await.take();
                continue;
            }
            if status == StatusCode::NOT_FOUND {
                return Err(FetchError::NoData(format!("{} not found", path)));
            }
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let body = resp.text().await?;
            return serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()));
        }

        Err(FetchError::Status(StatusCode::UNAUTHORIZED.as_u16()))
    }

    async fn fetch_next_earnings(&self, ticker: &str) -> Result<Option<NaiveDate>, FetchError> {
        let path = format!("/v10/finance/quoteSummary/{}", ticker);
        let resp: QuoteSummaryResponse = self
            .get_json(&path, &[("modules", "calendarEvents".to_string())])
            .await?;
        next_earnings_from(resp)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn get_quote(&self, ticker: &str) -> Result<QuoteSnapshot, FetchError> {
        info!("Fetching quote and expirations for {}", ticker);
        let path = format!("/v7/finance/options/{}", ticker);
        let resp: OptionsResponse = match self.get_json(&path, &[]).await {
            Ok(resp) => resp,
            Err(FetchError::NoData(_)) => return Err(FetchError::UnknownSymbol(ticker.to_string())),
            Err(e) => return Err(e),
        };
        let mut snapshot = quote_from(ticker, resp)?;

        snapshot.next_earnings = match self.fetch_next_earnings(ticker).await {
            Ok(date) => date,
            Err(e) => {
                debug!("No earnings date for {}: {}", ticker, e);
                None
            }
        };

        Ok(snapshot)
    }

    async fn get_put_chain(
        &self,
        ticker: &str,
        expiration: &str,
    ) -> Result<Vec<OptionContract>, FetchError> {
        let date = NaiveDate::parse_from_str(expiration, EXPIRATION_FORMAT)
            .map_err(|e| FetchError::Decode(format!("expiration {}: {}", expiration, e)))?;
        let unix = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| FetchError::Decode(format!("expiration {} out of range", expiration)))?;

        debug!("Fetching {} put chain for {}", expiration, ticker);
        let path = format!("/v7/finance/options/{}", ticker);
        let resp: OptionsResponse = self.get_json(&path, &[("date", unix.to_string())]).await?;
        puts_from(resp)
    }

    async fn get_daily_bars(
        &self,
        ticker: &str,
        lookback_days: usize,
    ) -> Result<Vec<DailyBar>, FetchError> {
        let now = Utc::now();
        let start = calendar_span(lookback_days)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| {
                FetchError::Decode(format!("lookback of {} days is out of range", lookback_days))
            })?;

        info!("Fetching {} daily bars for {}", lookback_days, ticker);
        let path = format!("/v8/finance/chart/{}", ticker);
        let resp: ChartResponse = self
            .get_json(
                &path,
                &[
                    ("interval", "1d".to_string()),
                    ("period1", start.timestamp().to_string()),
                    ("period2", now.timestamp().to_string()),
                ],
            )
            .await?;

        let mut bars = bars_from(resp)?;
        if bars.len() > lookback_days {
            bars.drain(..bars.len() - lookback_days);
        }
        Ok(bars)
    }
}

// ── Payload conversion ─────────────────────────────────────────────

fn unix_to_utc_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Trading days to calendar days, padded for weekends and holidays.
fn calendar_span(lookback_days: usize) -> Option<Duration> {
    let days = i64::try_from(lookback_days).ok()?.checked_mul(7)? / 5 + 14;
    Duration::try_days(days)
}

/// A ticker Yahoo cannot resolve comes back as "Not Found", an empty result
/// or a quote without a price. All of them mean the symbol is unknown.
fn quote_from(ticker: &str, resp: OptionsResponse) -> Result<QuoteSnapshot, FetchError> {
    let result = match resp.option_chain.into_first("option chain") {
        Ok(result) => result,
        Err(FetchError::NoData(_)) => return Err(FetchError::UnknownSymbol(ticker.to_string())),
        Err(e) => return Err(e),
    };
    let spot_price = result
        .quote
        .and_then(|q| q.regular_market_price)
        .ok_or_else(|| FetchError::UnknownSymbol(ticker.to_string()))?;
    let expirations = result
        .expiration_dates
        .iter()
        .filter_map(|secs| unix_to_utc_date(*secs))
        .map(|date| date.format(EXPIRATION_FORMAT).to_string())
        .collect();

    Ok(QuoteSnapshot {
        ticker: ticker.to_string(),
        spot_price: Some(spot_price),
        expirations,
        next_earnings: None,
    })
}

fn puts_from(resp: OptionsResponse) -> Result<Vec<OptionContract>, FetchError> {
    let result = resp.option_chain.into_first("option chain")?;
    let set = result
        .options
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NoData("no option set for expiration".to_string()))?;

    Ok(set
        .puts
        .into_iter()
        .map(|c| OptionContract {
            strike: c.strike,
            last_price: c.last_price.unwrap_or(0.0),
            bid: c.bid.unwrap_or(0.0),
            ask: c.ask.unwrap_or(0.0),
        })
        .collect())
}

fn next_earnings_from(resp: QuoteSummaryResponse) -> Result<Option<NaiveDate>, FetchError> {
    let result = resp.quote_summary.into_first("quote summary")?;
    Ok(result
        .calendar_events
        .and_then(|events| events.earnings)
        .and_then(|earnings| earnings.earnings_date.into_iter().next())
        .and_then(|raw| unix_to_utc_date(raw.raw)))
}

fn bars_from(resp: ChartResponse) -> Result<Vec<DailyBar>, FetchError> {
    let result = resp.chart.into_first("chart")?;
    let quote = match result.indicators.quote.into_iter().next() {
        Some(quote) => quote,
        None => return Err(FetchError::NoData("chart has no price series".to_string())),
    };

    let bars: Vec<DailyBar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, secs)| {
            let date = DateTime::from_timestamp(*secs, 0)?
                .with_timezone(&Eastern)
                .date_naive();
            Some(DailyBar {
                date,
                open: (*quote.open.get(i)?)?,
                high: (*quote.high.get(i)?)?,
                low: (*quote.low.get(i)?)?,
                close: (*quote.close.get(i)?)?,
            })
        })
        .collect();

    if bars.is_empty() {
        return Err(FetchError::NoData("chart returned no complete bars".to_string()));
    }
    Ok(bars)
}
