// src/routes.rs
use log::{info, warn};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::bands::get_bands;
use crate::handlers::error::ApiError;
use crate::handlers::quote::get_quote;
use crate::handlers::scan::post_scan;
use crate::services::provider::MarketDataProvider;

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid request body: {}", e);
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Request body too large".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        warn!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    provider: Arc<dyn MarketDataProvider>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let provider_filter = warp::any().map(move || provider.clone());

    let scan_route = warp::path!("api" / "v1" / "scan")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(provider_filter.clone())
        .and_then(post_scan);

    let bands_route = warp::path!("api" / "v1" / "bands" / String)
        .and(warp::get())
        .and(warp::query())
        .and(provider_filter.clone())
        .and_then(get_bands);

    let quote_route = warp::path!("api" / "v1" / "quote" / String)
        .and(warp::get())
        .and(provider_filter.clone())
        .and_then(get_quote);

    info!("All routes configured successfully.");

    scan_route
        .or(bands_route)
        .or(quote_route)
        .recover(handle_rejection)
}
