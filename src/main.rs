//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Initializes the database (seeding default working hours at first boot)
//! - Starts the HTTP server with graceful shutdown support

use dotenvy::dotenv;
use std::env;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

// Module declarations
mod database;
mod error;
mod handler;
mod hours;
mod middleware;
mod model;
mod route;
mod rules;
mod session;

use database::{init_db, AppState};
use route::create_app;

/// Application entry point
///
/// # Environment Variables
///
/// - `PORT` - Server port number (default: 8080)
/// - `DATABASE_URL` - Path to database file (default: "gateway.db")
/// - `PUBLIC_URL` - Base URL embedded in issued payment links
///   (default: "http://localhost:{PORT}")
/// - `ADMIN_TOKEN` - Shared token required on `/api/admin` routes;
///   when unset the admin surface is open (development only)
#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("sbp_gateway=debug,tower_http=debug")
        .init();

    let port_str = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let port: u16 = port_str.parse().unwrap_or(8080);

    let db_name = env::var("DATABASE_URL").unwrap_or_else(|_| "gateway.db".to_string());

    let public_url =
        env::var("PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

    // Initialize the embedded database; first boot seeds the default
    // working hours (every day, 10:00-21:00 Moscow time)
    let db = init_db(&db_name).expect("Failed to initialize database");

    let state = AppState::new(db, public_url.clone());

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await.unwrap();

    println!("🚀 Gateway running at http://localhost:{}", port);
    println!("🔗 Issued links point at {}", public_url);
    println!("📂 Using database: {}", db_name);

    // The server runs until it receives SIGTERM or SIGINT, then lets open
    // connections drain so in-flight rule writes commit cleanly
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

/// Handles graceful shutdown signals
///
/// Returns when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    println!("\n🛑 Shutdown signal received, stopping server.");
}
