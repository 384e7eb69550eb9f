//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] loads and validates configuration, opens the database and
//! creates the schema if needed, builds the router and serves until Ctrl-C or
//! SIGTERM. [`create_router`] is public so tests can drive the exact production
//! router in-process.

// region: --- Imports
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use lib_auth::TokenService;
use lib_core::model::store::{DbSession, UserRepository};
use lib_core::{create_pool, init_schema, Config, DbPool};
use lib_utils::{format_time, now_utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{log_requests, require_auth, stamp_req};
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub tokens: TokenService,
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Default log level when `LOG_LEVEL` is unset
    pub default_log_level: &'static str,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_log_level: "info",
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Install the global tracing subscriber.
///
/// `LOG_LEVEL` selects trace/debug/info/warn/error; anything else falls back to
/// `default_level`.
fn init_tracing(default_level: &str) -> String {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| default_level.to_string())
        .to_lowercase();

    let log_level = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => log_level,
        _ => default_level.to_string(),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .with_target(true)
        .with_line_number(true)
        .finish();

    // A subscriber may already be installed (e.g. by a test harness); keep it.
    let _ = tracing::subscriber::set_global_default(subscriber);

    log_level
}

/// Create the SQLite file's parent directory if it does not exist yet.
fn ensure_db_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let db_path = db_path.trim_start_matches("//");
    if db_path.is_empty() || db_path.starts_with(":memory:") {
        return Ok(());
    }

    let db_path = db_path.split('?').next().unwrap_or(db_path);
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }

    Ok(())
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - Database connection or schema creation fails
/// - Server binding fails
pub async fn start_server(server_config: ServerConfig) -> anyhow::Result<()> {
    let log_level = init_tracing(server_config.default_log_level);

    info!("AUTHGATE STARTING at {}", format_time(now_utc()));
    info!("Log level: {}", log_level);

    info!("Loading configuration...");
    let config = Config::from_env()?;
    config.validate()?;
    info!("Configuration: {:?}", config);

    ensure_db_dir(&config.database_url)?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;

    info!("Ensuring schema...");
    init_schema(&pool).await?;

    {
        let mut session = DbSession::acquire(&pool).await?;
        let users = UserRepository::count(&mut session).await?;
        info!("Schema ready ({} registered users)", users);
    }

    let tokens = TokenService::new(&config.jwt_secret, config.token_lifetime());
    info!("Tokens expire after {} minutes", tokens.lifetime().num_minutes());

    let state = AppState {
        db: pool.clone(),
        tokens,
    };

    let app = create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!("SERVER READY: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server stopped");

    Ok(())
}

/// Create the main application router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let protected = Router::new()
        .route("/protected", get(handlers::auth::protected))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/health", get(|| async { "OK" }))
        .merge(protected)
        .fallback(|| async { (StatusCode::NOT_FOUND, "Route not found") })
        .with_state(state)
        .layer(from_fn(log_requests))
        // Outside the logger so the log lines carry the request id.
        .layer(from_fn(stamp_req))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn log_server_info() {
    info!("Routes:");
    info!("  POST /signup     - register a user");
    info!("  POST /login      - obtain a bearer token");
    info!("  GET  /protected  - requires Authorization: Bearer <token>");
    info!("  GET  /health     - liveness check");
}
// endregion: --- Server Setup
