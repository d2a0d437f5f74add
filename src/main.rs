use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airdrop_dispatcher::config::Config;
use airdrop_dispatcher::handlers;
use airdrop_dispatcher::service::AirdropService;

#[derive(Parser, Debug)]
#[command(name = "airdrop-dispatcher", version, about = "ERC-20 batch airdrop dashboard backend")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("Starting Airdrop Dispatch Service");

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_PATH").ok())
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load_from_file(&config_path).await?;

    let service = Arc::new(AirdropService::new(config.clone()).await?);

    let app = create_app(service, &config).await;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Server running on {}", config.server.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn create_app(service: Arc<AirdropService>, config: &Config) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Viewing-wallet session endpoints
        .route("/api/v1/session", get(handlers::get_session))
        .route("/api/v1/session/connect", post(handlers::connect_session))
        .route("/api/v1/session/disconnect", post(handlers::disconnect_session))
        // Token reference and balance endpoints
        .route("/api/v1/token", get(handlers::get_token))
        .route("/api/v1/token/address", put(handlers::set_token_address))
        .route("/api/v1/token/balance", get(handlers::get_token_balance))
        .route("/api/v1/funded/overview", get(handlers::get_funded_overview))
        // Recipient list endpoints
        .route("/api/v1/recipients", get(handlers::get_recipients))
        .route("/api/v1/recipients/load", post(handlers::load_recipients))
        .route("/api/v1/recipients/upload", post(handlers::upload_recipients))
        // Airdrop execution
        .route("/api/v1/airdrop/execute", post(handlers::execute_airdrop))
        .with_state(service)
        // Dashboard assets, including the fixed-path wallets file
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(config.server.max_upload_size as usize))
                .layer(CorsLayer::permissive()),
        )
}
