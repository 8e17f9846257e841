//! PinStock backend server
//!
//! Binary entrypoint: loads configuration, connects to PostgreSQL, runs
//! migrations, starts the expiry reaper and the event relay, and serves
//! the HTTP API until a shutdown signal arrives.

use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use pinstock_server::config::Config;
use pinstock_server::events::{event_relay, EventBus};
use pinstock_server::reaper::{run_reaper, ReaperService};
use pinstock_server::state::AppState;
use pinstock_server::{create_app, db};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        "Starting PinStock server"
    );

    let db_pool = match db::create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let event_bus = EventBus::new();

    // Relay domain events into the log; a push transport can subscribe later
    let relay_bus = event_bus.clone();
    tokio::spawn(async move {
        event_relay(relay_bus).await;
    });

    let config = Arc::new(config);
    let state = AppState::new(db_pool.clone(), config.clone(), event_bus.clone());

    // Background recovery of expired holds and stale transfer locks
    let reaper = ReaperService::new(db_pool.clone(), event_bus.clone(), config.hold_ttl_minutes);
    let reaper_interval = config.reaper_interval_seconds;
    tokio::spawn(async move {
        run_reaper(reaper, reaper_interval).await;
        tracing::error!("Expiry reaper task exited unexpectedly");
    });

    let app = create_app(state).layer(configure_cors(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

fn configure_cors(config: &Config) -> CorsLayer {
    let Some(origins_str) = config.cors_allowed_origins.as_deref() else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
