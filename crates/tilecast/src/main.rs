//! Relay binary: config from the environment, store bootstrap, serve.

use tilecast::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("TILECAST_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let config = StoreConfig::from_env()?;
    let store = CouchRoomStore::connect(config).await?;
    store.ping().await?;
    tracing::info!("room store reachable");

    let server = TilecastServerBuilder::new().bind(&bind).build(store).await?;
    server.run().await?;
    Ok(())
}
