//! HTTP backend for the gratitude tree
//!
//! Provides:
//! - POST /api/add-leaf: insert one note
//! - GET /api/get-leaves: the 1000 most recent notes, newest first
//! - GET /api/stats: aggregate counts
//!
//! All endpoints speak JSON with the `{success, data | error}` envelope
//! and allow cross-origin access, preflight included.

mod api;
mod config;
mod db;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::config::Config;
use crate::db::Db;

#[derive(Parser, Debug)]
#[command(name = "tree-server")]
#[command(about = "HTTP backend for the gratitude tree")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "TREE_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "TREE_BIND")]
    bind: String,

    /// Path to the data directory (config and database)
    #[arg(long, default_value = "./data", env = "TREE_DATA_PATH")]
    data_path: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tree_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration and open the database
    let config = Config::load(&cli.data_path)?;
    let db = Db::open(&Path::new(&cli.data_path).join("leaves.db"))?;

    let state = Arc::new(AppState { config, db });

    // Any origin, GET/POST/OPTIONS, Content-Type. The layer answers
    // preflight requests itself.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    let app = Router::new()
        .route("/api/add-leaf", post(api::add_leaf))
        .route("/api/get-leaves", get(api::get_leaves))
        .route("/api/stats", get(api::stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    tracing::info!("Starting tree-server on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Tree server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
