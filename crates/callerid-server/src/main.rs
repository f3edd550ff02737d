//! Caller directory server - Entry point.

use anyhow::{Context, Result};
use callerid_directory::DirectoryStore;
use callerid_server::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    info!("Starting caller directory server");

    // A snapshot that fails to load is fatal; starting empty would overwrite it
    let store = if config.store.persist {
        DirectoryStore::open(config.store.path.clone())
            .await
            .with_context(|| format!("Failed to load directory from {:?}", config.store.path))?
    } else {
        info!("Persistence disabled, using in-memory storage");
        DirectoryStore::memory()
    };

    let stats = store.stats().await;
    info!(
        identities = stats.identities,
        contacts = stats.contacts,
        spam_reports = stats.spam_reports,
        "Directory ready"
    );

    let app = create_router_with_rate_limit(
        AppState::new(store, config.directory.contact_dedup),
        RateLimitState::new(config.rate_limit.global_per_minute),
    );

    let ip: IpAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {:?}", config.server.listen_addr))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(contact_dedup = ?config.directory.contact_dedup, "Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")
}
