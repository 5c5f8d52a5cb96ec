#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use tokio::net::TcpListener;

use mixlab::{
    app::build_app,
    config::Cli,
    fal::FalClient,
    logging::init_logging,
    models::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    // Keep guard alive so file logger flushes correctly
    let _log_guards = init_logging(&config);

    // Log all configuration (mask sensitive values)
    tracing::info!("=== Configuration ===");
    tracing::info!("Bind address: {}", config.bind);
    tracing::info!("Log file: {}", config.log_file.display());
    tracing::info!(
        "CORS origin: {}",
        config.cors_origin.as_deref().unwrap_or("<allow all>")
    );
    tracing::info!(
        "fal API key: {}",
        if config.fal_api_key.as_ref().is_some_and(|k| !k.is_empty()) {
            "<set>"
        } else {
            "<not set>"
        }
    );
    tracing::info!("fal API URL: {}", config.fal_api_url);
    tracing::info!("Image model: {}", config.image_model);
    tracing::info!("Video model: {}", config.video_model);
    tracing::info!("Prompt model: {}", config.prompt_model);
    tracing::info!("====================");

    if config.fal_api_key.is_none() {
        tracing::warn!("No fal API key provided, upstream calls will be rejected");
    }

    let fal = FalClient::new(
        config.fal_api_url.clone(),
        config.fal_api_key.clone().unwrap_or_default(),
    );
    let state = AppState {
        http: reqwest::Client::new(),
        fal,
        config: config.clone(),
    };

    let app = build_app(state);

    let listener = TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
