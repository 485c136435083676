//! Shoplite - REST backend for a small product marketplace.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - MongoDB for accounts and products
//! - Stateless bearer tokens (HS256 JWT) for authentication
//!
//! Accounts, products, and the single-admin policy live behind store
//! traits, so the whole HTTP surface can also run against in-memory
//! stores in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoplite_server::config::ServerConfig;
use shoplite_server::db::{self, products::MongoCatalogStore, users::MongoAccountStore};
use shoplite_server::state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoplite_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to MongoDB
    let database = db::connect(&config.database_url, &config.database_name)
        .await
        .expect("Failed to connect to database");
    tracing::info!(database = %config.database_name, "Database connected");

    let accounts = Arc::new(MongoAccountStore::new(&database));
    let products = Arc::new(MongoCatalogStore::new(&database));

    // The username and single-admin unique indexes back the policy checks
    // in the services; create them before serving traffic.
    accounts
        .ensure_indexes()
        .await
        .expect("Failed to create indexes");

    // Build application state and router
    let state = AppState::new(config.clone(), accounts, products);
    let app = shoplite_server::app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
