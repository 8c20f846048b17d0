use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fanout_core::{
    load_config, load_default_config, validate_config, Config, HttpTransport, ReqwestTransport,
};
use fanout_server::api::create_router;
use fanout_server::shutdown::{shutdown_signal, ShutdownCoordinator};
use fanout_server::state::AppState;

/// Config file used when FANOUT_CONFIG is not set
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_runtime_config()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!(
        max_concurrent_batches = config.admission.max_concurrent_batches,
        max_urls = config.batch.max_urls,
        deadline_ms = config.fetcher.deadline_ms,
        settle_window_ms = config.fetcher.settle_window_ms,
        "Configuration loaded"
    );

    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::new(&config.fetcher).context("Failed to create HTTP transport")?,
    );

    let state = Arc::new(AppState::new(config.clone(), transport));
    let app = create_router(state);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Server started on {}", addr);

    let root = CancellationToken::new();
    tokio::spawn({
        let root = root.clone();
        async move {
            shutdown_signal().await;
            root.cancel();
        }
    });

    let coordinator = ShutdownCoordinator::new(root.clone(), config.shutdown.grace_period());
    let server = axum::serve(listener, app).with_graceful_shutdown(root.cancelled_owned());

    coordinator
        .run(server)
        .await
        .context("Server shutdown failed")?;

    info!("Server stopped");
    Ok(())
}

/// FANOUT_CONFIG must point at an existing file. Without it, `config.toml`
/// is used when present, otherwise built-in defaults.
fn load_runtime_config() -> Result<Config> {
    match std::env::var("FANOUT_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG_PATH);
            load_config(Path::new(DEFAULT_CONFIG_PATH))
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH))
        }
        Err(_) => {
            info!("No config file, using defaults");
            load_default_config().context("Failed to load default config")
        }
    }
}
