// src/handlers/scan.rs
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::config::{market_today, ScanRequest};
use crate::services::provider::MarketDataProvider;
use crate::services::report::{rows, SuggestionRow};
use crate::services::scan::run_scan;

#[derive(Serialize)]
struct ScanResponse {
    count: usize,
    suggestions: Vec<SuggestionRow>,
    warnings: Vec<String>,
}

pub async fn post_scan(
    request: ScanRequest,
    provider: Arc<dyn MarketDataProvider>,
) -> Result<Json, Rejection> {
    info!("Handling scan request for watchlist '{}'", request.watchlist);

    let settings = request.into_settings().map_err(|e| {
        error!("Rejected scan request: {}", e);
        warp::reject::custom(ApiError::bad_request(e.to_string()))
    })?;

    let report = run_scan(provider.as_ref(), &settings, market_today(), |_, _, _| {})
        .await
        .map_err(|e| warp::reject::custom(ApiError::bad_request(e.to_string())))?;

    let suggestions = rows(&report.sorted());
    info!("Found {} opportunities", suggestions.len());

    Ok(warp::reply::json(&ScanResponse {
        count: suggestions.len(),
        suggestions,
        warnings: report.warnings(),
    }))
}
