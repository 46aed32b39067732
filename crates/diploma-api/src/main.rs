//! # diploma-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the diploma registry.
//! Binds to a configurable port (default 8080).

use diploma_api::state::{registry_config_from_env, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::debug!(?config, "service configuration");
    if config.authority_token.is_some() && config.authority_token == config.auth_token {
        tracing::error!("AUTHORITY_TOKEN must differ from AUTH_TOKEN");
        return Err("AUTHORITY_TOKEN must differ from AUTH_TOKEN".into());
    }
    if config.authority_token.is_none() {
        tracing::warn!("AUTHORITY_TOKEN is unset; privileged operations are unavailable");
    }

    let registry = registry_config_from_env().map_err(|e| {
        tracing::error!("Registry configuration failed: {e}");
        e
    })?;
    tracing::info!(
        authority = %registry.authority,
        fee = %registry.fee,
        auth = if config.auth_token.is_some() { "shared-secret" } else { "account-only" },
        "registry initialized"
    );

    let port = config.port;
    let app = diploma_api::app(AppState::new(registry, config));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("diploma API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
