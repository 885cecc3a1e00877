use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use pives_backend::config::Config;
use pives_backend::gateway::MercadoPagoGateway;
use pives_backend::rest::{self, AppState};
use pives_backend::storage::YamlConnection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    info!("Opening document store at {:?}", config.data_dir);
    let connection = Arc::new(YamlConnection::new(&config.data_dir)?);
    let gateway = Arc::new(MercadoPagoGateway::new(config.mp_access_token.clone()));
    let state = AppState::new(connection, gateway, config.app_url.clone());

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(config.app_url.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = rest::router(state).layer(cors);

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
