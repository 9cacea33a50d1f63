// src/handlers/bands.rs
use log::{error, info};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::bands::{bands, BandsError, DEFAULT_CHART_DAYS};
use crate::services::provider::MarketDataProvider;

#[derive(Debug, Deserialize)]
pub struct BandsQuery {
    pub days: Option<usize>,
}

pub async fn get_bands(
    ticker: String,
    query: BandsQuery,
    provider: Arc<dyn MarketDataProvider>,
) -> Result<Json, Rejection> {
    let ticker = ticker.trim().to_uppercase();
    let days = query.days.unwrap_or(DEFAULT_CHART_DAYS);
    info!("Handling request for {} day bands of {}", days, ticker);

    match bands(provider.as_ref(), &ticker, days).await {
        Ok(series) => Ok(warp::reply::json(&series)),
        Err(e @ BandsError::InvalidWindow) => {
            Err(warp::reject::custom(ApiError::bad_request(e.to_string())))
        }
        Err(e @ BandsError::NoHistory(_)) => {
            error!("{}", e);
            Err(warp::reject::custom(ApiError::not_found(e.to_string())))
        }
        Err(e @ BandsError::Fetch { .. }) => {
            error!("{}", e);
            Err(warp::reject::custom(ApiError::external_error(format!(
                "Could not load chart for {}",
                ticker
            ))))
        }
    }
}
