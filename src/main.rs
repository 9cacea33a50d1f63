use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use wheel_screener::config;
use wheel_screener::routes;
use wheel_screener::services::provider::MarketDataProvider;
use wheel_screener::services::yahoo::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let port = config::server_port()?;
    info!("Using PORT: {}", port);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let provider: Arc<dyn MarketDataProvider> = match YahooClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build market-data client: {}", e);
            return Err(e.into());
        }
    };

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(provider).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
