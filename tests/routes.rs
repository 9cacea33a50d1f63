mod common;

use common::{flat_bars, put, Failure, FakeProvider};
use serde_json::Value;
use std::sync::Arc;
use warp::http::StatusCode;
use wheel_screener::routes::routes;
use wheel_screener::services::provider::MarketDataProvider;

fn provider() -> Arc<dyn MarketDataProvider> {
    Arc::new(
        FakeProvider::new()
            .with_quote("T", 17.0, &["2099-01-16"])
            .with_chain("T", "2099-01-16", vec![put(16.0, 0.2, 0.2, 0.25)])
            .with_failing_quote("DOWN", Failure::Transport)
            .with_bars("AMD", flat_bars(120, 150.0))
            .with_failing_bars("DOWN", Failure::Transport),
    )
}

fn body(resp: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(resp.body()).unwrap()
}

#[tokio::test]
async fn scan_rejects_blank_watchlist() {
    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/scan")
        .json(&serde_json::json!({ "watchlist": " , " }))
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&resp)["error"], "Please enter at least one ticker symbol.");
}

#[tokio::test]
async fn scan_rejects_out_of_range_roi() {
    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/scan")
        .json(&serde_json::json!({ "watchlist": "T", "desired_roi": 9.0 }))
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_reports_warnings_alongside_results() {
    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/scan")
        .json(&serde_json::json!({ "watchlist": "down, t" }))
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    assert_eq!(json["count"], 0);
    assert_eq!(json["warnings"][0], "Could not fetch data for DOWN: provider returned HTTP 503");
}

#[tokio::test]
async fn bands_default_to_ninety_days() {
    let resp = warp::test::request()
        .path("/api/v1/bands/amd")
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    assert_eq!(json.as_array().unwrap().len(), 90);
    assert_eq!(json[0]["upper"], 150.0);
}

#[tokio::test]
async fn bands_errors_map_to_status_codes() {
    let missing = warp::test::request()
        .path("/api/v1/bands/NOPE?days=30")
        .reply(&routes(provider()))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&missing)["error"], "No historical data for NOPE");

    let down = warp::test::request()
        .path("/api/v1/bands/DOWN")
        .reply(&routes(provider()))
        .await;
    assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body(&down)["error"], "Could not load chart for DOWN");
}

#[tokio::test]
async fn bands_reject_out_of_range_days() {
    for path in [
        "/api/v1/bands/AMD?days=0",
        "/api/v1/bands/AMD?days=5001",
        "/api/v1/bands/AMD?days=18446744073709551615",
    ] {
        let resp = warp::test::request().path(path).reply(&routes(provider())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(
            body(&resp)["error"],
            "display window must be between 1 and 5000 days"
        );
    }
}

#[tokio::test]
async fn quote_returns_snapshot() {
    let resp = warp::test::request()
        .path("/api/v1/quote/t")
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body(&resp);
    assert_eq!(json["ticker"], "T");
    assert_eq!(json["spot_price"], 17.0);
    assert_eq!(json["next_earnings"], Value::Null);
}

#[tokio::test]
async fn unknown_ticker_quote_is_not_found() {
    let resp = warp::test::request()
        .path("/api/v1/quote/zzzz")
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body(&resp)["error"],
        "Could not fetch data for ZZZZ: symbol ZZZZ not found"
    );
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let resp = warp::test::request()
        .path("/api/v1/nothing")
        .reply(&routes(provider()))
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&resp)["error"], "Not Found");
}
