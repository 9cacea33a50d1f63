// src/bin/scan_watchlist.rs
use dotenv::dotenv;
use log::{error, info, warn};
use std::env;
use std::io;

use wheel_screener::config::{self, OutputFormat, ScanSettings};
use wheel_screener::services::bands::{bands, DEFAULT_CHART_DAYS};
use wheel_screener::services::report::{format_currency, render_table, rows, write_csv};
use wheel_screener::services::scan::run_scan;
use wheel_screener::services::yahoo::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let settings = match ScanSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    let output = config::output_format()?;
    let selected: Option<usize> = match env::var("WHEEL_SELECT") {
        Ok(raw) => Some(raw.trim().parse()?),
        Err(_) => None,
    };

    info!(
        "Scanning {} tickers with {} capital, {}% monthly ROI, {} weeks",
        settings.tickers.len(),
        format_currency(settings.capital),
        settings.min_monthly_roi_pct,
        settings.max_weeks
    );

    let client = YahooClient::from_env()?;
    let report = run_scan(&client, &settings, config::market_today(), |i, total, ticker| {
        eprintln!("[{}/{}] Analyzing {}...", i + 1, total, ticker);
    })
    .await?;
    eprintln!("Analysis Complete!");

    for warning in report.warnings() {
        warn!("{}", warning);
        eprintln!("warning: {}", warning);
    }

    let sorted = report.sorted();
    if sorted.is_empty() {
        println!("No opportunities found matching your criteria. Try lowering ROI target or increasing capital.");
        return Ok(());
    }

    let table = rows(&sorted);
    match output {
        OutputFormat::Table => {
            println!("Found {} Opportunities", table.len());
            print!("{}", render_table(&table));
        }
        OutputFormat::Csv => write_csv(&table, io::stdout().lock())?,
    }

    if let Some(index) = selected {
        let Some(choice) = report.selection(index) else {
            warn!("Row {} is out of range ({} rows)", index, sorted.len());
            return Ok(());
        };
        match bands(&client, &choice.ticker, DEFAULT_CHART_DAYS).await {
            Ok(series) => {
                eprintln!("{} volatility bands, last {} sessions:", choice.ticker, series.len());
                for point in &series {
                    let band = |v: Option<f64>| v.map(format_currency).unwrap_or_else(|| "-".to_string());
                    eprintln!(
                        "{}  close {}  mean {}  upper {}  lower {}",
                        point.date,
                        format_currency(point.close),
                        band(point.mean),
                        band(point.upper),
                        band(point.lower)
                    );
                }
            }
            Err(e) => {
                error!("Could not load chart: {}", e);
                eprintln!("Could not load chart for {}", choice.ticker);
            }
        }
    }

    Ok(())
}
