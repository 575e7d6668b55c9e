//! Memories Server library
//!
//! A shared feed of dated memories behind an invite-only login. The admin
//! invites users by email; invited users sign in with the shared password and
//! post, edit and delete memories with an optional photo.

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod snapshot;
pub mod state;
pub mod uploads;

use axum::{Router, extract::DefaultBodyLimit, http::HeaderValue};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use snapshot::PageSnapshot;
pub use state::{AppState, StateError};

/// Creates the application router with all routes configured.
pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();
    let uploads = ServeDir::new(state.uploads.root());

    api::create_router()
        .nest_service(uploads::UPLOADS_ROUTE, uploads)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the CORS layer from configuration.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.enable_cors {
        return CorsLayer::new();
    }

    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Initializes tracing with the given log level and format.
///
/// `RUST_LOG` takes precedence over `log_level`.
pub fn init_tracing(log_level: &str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "memories_server={level},auth={level},memory_store={level},tower_http=debug",
            level = log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
