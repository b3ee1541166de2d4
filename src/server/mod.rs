//! HTTP surface: four routes over the loader, summary and chart modules.
//!
//! | route | method | form fields |
//! |---|---|---|
//! | `/` | GET | |
//! | `/upload` | POST | `file` |
//! | `/analyze` | POST | `file` |
//! | `/visualize` | POST | `file`, `chart_type`, `x_column`, optional `y_column` |

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::ingestion::{IngestionOptions, TracingObserver};

pub use error::ApiError;

/// Origins allowed by default (a local frontend dev server).
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Default request body limit in megabytes.
pub const DEFAULT_UPLOAD_LIMIT_MB: usize = 50;

/// Everything the router needs; built from the command line in `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub upload_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_MB * 1024 * 1024,
        }
    }
}

/// Read-only state shared by the handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub ingestion: IngestionOptions,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            ingestion: IngestionOptions {
                observer: Some(Arc::new(TracingObserver)),
                ..IngestionOptions::default()
            },
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/upload", post(handlers::upload))
        .route("/analyze", post(handlers::analyze))
        .route("/visualize", post(handlers::visualize))
        .layer(DefaultBodyLimit::max(config.upload_limit_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::default())
}
