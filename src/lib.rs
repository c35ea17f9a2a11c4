//! Portfolio CMS - content API library, used by the binary and the tests

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod logging;
pub mod media;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::auth::session::SessionCodec;
use crate::config::AppConfig;
use crate::state::AppState;

/// Global request body cap. Large enough for one image upload.
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Allowed origins from `ALLOWED_ORIGINS` (comma-separated) or
/// `FRONTEND_ORIGIN`, falling back to the local frontend dev server.
pub fn allowed_origins<F>(lookup: F) -> Vec<HeaderValue>
where
    F: Fn(&str) -> Option<String>,
{
    let parse_list = |s: String| -> Vec<HeaderValue> {
        s.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| origin.parse().ok())
            .collect()
    };

    lookup("ALLOWED_ORIGINS")
        .map(parse_list)
        .filter(|origins| !origins.is_empty())
        .or_else(|| {
            lookup("FRONTEND_ORIGIN")
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        })
}

/// CORS for the admin frontend. Credentials are allowed because the session
/// travels in a cookie.
pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(|key| std::env::var(key).ok()))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    routes::router()
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        // Compress responses with gzip/br/zstd automatically
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(cors)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init(&logging::LogSettings::from_env());

    routes::health::init_start_time();

    let config = AppConfig::from_env()
        .unwrap_or_else(|e| panic!("FATAL: invalid configuration: {e}"));
    let codec = SessionCodec::new(&config.auth_secret)
        .unwrap_or_else(|e| panic!("FATAL: invalid configuration: {e}"));

    if config.upload.is_none() {
        tracing::warn!("Cloudinary credentials not set. Image uploads are disabled.");
    }

    let state = AppState::from_config(&config, Arc::new(codec));

    // Create the admin once, before any request can race on it.
    if let Err(e) = state.auth.bootstrap(&config.admin).await {
        panic!("FATAL: admin bootstrap failed: {e}");
    }

    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
