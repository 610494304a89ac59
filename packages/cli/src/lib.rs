// ABOUTME: Testdesk server assembly
// ABOUTME: Wires configuration, storage, the generation client and the HTTP router into a running server

pub mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use testdesk_ai::GenerationClient;
use testdesk_api::create_router;
use testdesk_projects::DbState;

pub use config::{Config, ConfigError, CorsOrigin};

fn cors_layer(origin: &CorsOrigin) -> anyhow::Result<CorsLayer> {
    let allow_origin = match origin {
        CorsOrigin::Any => AllowOrigin::from(Any),
        CorsOrigin::List(origins) => {
            let values = origins
                .iter()
                .map(|o| {
                    o.parse::<HeaderValue>()
                        .with_context(|| format!("Invalid CORS origin: {}", o))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any))
}

/// Router with the request layers the server runs behind.
///
/// Both the transport limit and the JSON extractor limit follow `max_body_bytes`.
pub fn build_app(state: DbState, config: &Config) -> anyhow::Result<Router> {
    Ok(create_router(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http()))
}

/// Open the database, bind the listener and serve until Ctrl+C
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let generator = GenerationClient::new(config.generation_config())
        .context("Failed to build generation client")?;

    let state = DbState::init_with_config(
        &config.pool_config(),
        config.tab_naming(),
        Arc::new(generator),
    )
    .await
    .with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })?;

    let app = build_app(state, &config)?;
    let addr = SocketAddr::new(config.host, config.port);

    info!("Generation backend: {}", config.generation_url);
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
