// src/handlers/quote.rs
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::provider::{FetchError, MarketDataProvider};

pub async fn get_quote(
    ticker: String,
    provider: Arc<dyn MarketDataProvider>,
) -> Result<Json, Rejection> {
    let ticker = ticker.trim().to_uppercase();
    info!("Handling quote request for {}", ticker);

    match provider.get_quote(&ticker).await {
        Ok(snapshot) => Ok(warp::reply::json(&snapshot)),
        Err(e @ (FetchError::UnknownSymbol(_) | FetchError::NoData(_))) => Err(
            warp::reject::custom(ApiError::not_found(format!(
                "Could not fetch data for {}: {}",
                ticker, e
            ))),
        ),
        Err(e) => {
            error!("Failed to fetch quote for {}: {}", ticker, e);
            Err(warp::reject::custom(ApiError::external_error(format!(
                "Could not fetch data for {}: {}",
                ticker, e
            ))))
        }
    }
}
