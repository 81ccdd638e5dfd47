//! Roster Portal API
//!
//! Student and teacher roster lookups for the school records portal:
//! cascading school → grade → teacher → class filters, bulk and individual
//! student search, student detail with schedule, and the teacher directory.

mod auth;
mod config;
mod db;
mod error;
mod roster;
mod routes;
mod state;
mod teachers;
mod users;

use crate::config::Settings;
use crate::db::{create_pool, verify_connection, PgRosterStore};
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Roster Portal API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    let pool = create_pool(&settings.database)?;
    if let Err(e) = verify_connection(&pool).await {
        error!("❌ FATAL: Roster database is not reachable: {}", e);
        return Err(e.into());
    }
    info!(
        "✅ Connected to {}:{}/{} (TLS: {})",
        settings.database.host,
        settings.database.port,
        settings.database.database,
        settings.database.use_tls
    );

    let store = Arc::new(PgRosterStore::new(pool.clone()));
    let state = Arc::new(AppState::new(pool, store, &settings.auth));

    // Create the accounts table if it doesn't exist
    if let Err(e) = state.users.ensure_schema().await {
        warn!("⚠️  Warning creating portal user table: {}", e);
    }

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Authentication ───");
    info!("   POST /api/auth/login                          - Login with email/password");
    info!("   POST /api/auth/register                       - Register new account");
    info!("");
    info!("   ─── Students (bearer token) ───");
    info!("   POST /api/students/search                     - Filtered roster search");
    info!("   POST /api/students/count                      - Filtered roster count");
    info!("   POST /api/students/search-individual          - Search by name, ID or email");
    info!("   GET  /api/students/{{id}}                       - Student by row ID");
    info!("   GET  /api/students/{{id}}/detail                - Student with courses");
    info!("   GET  /api/students/search-by-program          - Program roster");
    info!("   GET  /api/students/dropdown-data              - Initial filter options");
    info!("   GET  /api/students/cascading-dropdown/{{level}} - Narrowed filter options");
    info!("   GET  /api/students/diagnose-database          - Connectivity report");
    info!("");
    info!("   ─── Teachers (bearer token) ───");
    info!("   GET  /api/teachers                            - All teachers");
    info!("   GET  /api/teachers/dropdown-data              - Teacher filter options");
    info!("   GET  /api/teachers/{{id}}                       - Teacher by employee ID");
    info!("   GET  /api/teachers/{{id}}/schedule              - Teacher schedule");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,roster_portal_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
