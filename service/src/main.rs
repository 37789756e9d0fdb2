mod routes;
mod storage;
mod models;
mod arrow_io;
mod config;

use axum::{Router, extract::DefaultBodyLimit};
use clap::Parser;
use config::ServiceConfig;
use routes::AppState;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "ocean_service=debug,ocean_parser=debug,tower_http=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::parse();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_routes(AppState::new()))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!(
        "Starting ocean sensor service on {} (upload limit {} bytes)",
        config.bind_addr,
        config.body_limit_bytes()
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
