mod common;

use common::{flat_bars, Failure, FakeProvider};
use wheel_screener::services::bands::{bands, BandsError, DEFAULT_CHART_DAYS, MAX_DISPLAY_DAYS};

#[tokio::test]
async fn requests_display_window_plus_warmup() {
    let provider = FakeProvider::new().with_bars("PLTR", flat_bars(200, 100.0));
    let series = bands(&provider, "PLTR", DEFAULT_CHART_DAYS).await.unwrap();

    assert_eq!(provider.calls(), vec!["bars PLTR 110"]);
    assert_eq!(series.len(), DEFAULT_CHART_DAYS);
    for point in &series {
        assert_eq!(point.upper, Some(100.0));
        assert_eq!(point.lower, Some(100.0));
        assert_eq!(point.std_dev, Some(0.0));
    }
}

#[tokio::test]
async fn full_lookback_leaves_no_warmup_gaps() {
    let provider = FakeProvider::new().with_bars("SOFI", flat_bars(50, 8.0));
    let series = bands(&provider, "SOFI", 30).await.unwrap();
    assert_eq!(series.len(), 30);
    assert!(series.iter().all(|p| p.mean.is_some()));
}

#[tokio::test]
async fn no_history_is_distinct_from_fetch_failure() {
    let provider = FakeProvider::new()
        .with_bars("EMPTY", vec![])
        .with_failing_bars("DOWN", Failure::Transport)
        .with_failing_bars("GONE", Failure::NoData);

    assert!(matches!(
        bands(&provider, "EMPTY", 30).await,
        Err(BandsError::NoHistory(t)) if t == "EMPTY"
    ));
    assert!(matches!(
        bands(&provider, "GONE", 30).await,
        Err(BandsError::NoHistory(_))
    ));
    assert!(matches!(
        bands(&provider, "DOWN", 30).await,
        Err(BandsError::Fetch { .. })
    ));
}

#[tokio::test]
async fn zero_day_window_is_rejected_before_fetching() {
    let provider = FakeProvider::new();
    assert!(matches!(
        bands(&provider, "AMD", 0).await,
        Err(BandsError::InvalidWindow)
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn oversized_window_is_rejected_before_fetching() {
    let provider = FakeProvider::new().with_bars("AMD", flat_bars(50, 10.0));
    for days in [MAX_DISPLAY_DAYS + 1, usize::MAX - 5, usize::MAX] {
        assert!(matches!(
            bands(&provider, "AMD", days).await,
            Err(BandsError::InvalidWindow)
        ));
    }
    assert!(provider.calls().is_empty());

    let series = bands(&provider, "AMD", MAX_DISPLAY_DAYS).await.unwrap();
    assert_eq!(series.len(), 50);
    assert_eq!(provider.calls(), vec![format!("bars AMD {}", MAX_DISPLAY_DAYS + 20)]);
}
