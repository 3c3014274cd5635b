use std::net::TcpListener;

use clap::Parser;
use niffler_userdata::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::parse();
    let store = config.open_store()?;
    let listener = TcpListener::bind(config.addr())?;
    info!("listening on {}", listener.local_addr()?);
    niffler_userdata::serve(listener, store).await
}
