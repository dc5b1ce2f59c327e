//! Starry console server
//!
//! Main entry point: loads configuration, initializes logging and serves
//! the directory tree API.

use tracing_subscriber::{EnvFilter, fmt};

use starry_core::config::AppConfig;
use starry_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
///
/// `STARRY_CONFIG` names an explicit file; otherwise `config/default.toml`
/// is layered with `config/{STARRY_ENV}.toml`.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("STARRY_CONFIG") {
        Ok(path) => AppConfig::load_file(&path),
        Err(_) => {
            let env = std::env::var("STARRY_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        base_path = %config.server.base_path,
        "Starting Starry console"
    );

    starry_api::run_server(config).await?;

    tracing::info!("Starry console shut down gracefully");
    Ok(())
}
