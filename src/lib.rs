pub mod adherence; // Adherence engine: schedule status + percentages
pub mod api; // HTTP surface (axum)
pub mod config;
pub mod core_state; // Shared connection handle
pub mod db;
pub mod error;
pub mod models;
pub mod registry; // Medication registry

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub use error::TrackerError;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Open the configured database and serve the API until Ctrl-C.
pub async fn run() -> Result<(), String> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let db_path = config::database_path();
    let core = Arc::new(
        core_state::CoreState::open(&db_path)
            .map_err(|e| format!("Cannot open database at {}: {e}", db_path.display()))?,
    );

    let server = api::start_api_server(core, config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "Ready");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {e}");
    }
    server.stop().await;
    Ok(())
}
