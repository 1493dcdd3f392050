use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use neuroscan::api::server::start_server;
use neuroscan::api::ApiContext;
use neuroscan::config::{self, Config};
use neuroscan::db::{open_database, RecordStore};
use neuroscan::model_client::ModelClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let conn = match open_database(&config.database_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(
                path = %config.database_path.display(),
                "Database connection failed: {e}"
            );
            std::process::exit(1);
        }
    };
    let store = RecordStore::new(conn);

    let model = match ModelClient::new(&config.model_api_url, config.model_timeout_secs) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("Failed to build model client: {e}");
            std::process::exit(1);
        }
    };

    let ctx = ApiContext::new(store, model);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let mut server = match start_server(ctx, config.frontend_dir.clone(), addr).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %server.addr,
        model_api_url = %config.model_api_url,
        "server running"
    );

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {e}"),
    }
    server.shutdown();
}
