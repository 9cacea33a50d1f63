use dotenv::dotenv;
use log::{error, info};
use std::env;

use wheel_screener::services::provider::MarketDataProvider;
use wheel_screener::services::yahoo::YahooClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let ticker = env::args().nth(1).unwrap_or_else(|| "AMD".to_string()).to_uppercase();
    info!("Testing Yahoo Finance quote fetching for {}...", ticker);

    let client = YahooClient::from_env()?;
    match client.get_quote(&ticker).await {
        Ok(quote) => {
            info!("SUCCESS: spot price {:?}", quote.spot_price);
            info!("Next earnings: {:?}", quote.next_earnings);
            info!("{} expirations: {:?}", quote.expirations.len(), quote.expirations);

            if let Some(first) = quote.expirations.first() {
                match client.get_put_chain(&ticker, first).await {
                    Ok(puts) => info!("{} puts expiring {}", puts.len(), first),
                    Err(e) => error!("ERROR: put chain for {} failed: {}", first, e),
                }
            }
        }
        Err(e) => {
            error!("ERROR: Failed to fetch Yahoo Finance quote: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
