//! HTTP API.
//!
//! JSON over axum. Players are identified by the `token` session cookie; see
//! [`identity`]. Play endpoints require a verified player, catalog reads do
//! not.
//!
//! ## Endpoints
//!
//! - `GET /health`
//! - `GET /api/levels` - catalog joined with the caller's progress
//! - `PUT /api/admin/levels` - replace the catalog
//! - `POST /api/admin/edits` - apply a batch of catalog edits
//! - `GET /api/me` - stats and achievements
//! - `GET /api/leaderboard?limit=N`
//! - `GET /api/play` - current play screen
//! - `POST /api/play/levels/{level_id}`
//! - `POST /api/play/readings/{reading_id}`
//! - `PUT /api/play/answers/{question_id}`
//! - `POST /api/play/submit`
//! - `POST /api/play/back`
//! - `POST /api/play/back-to-levels`

mod error;
mod handlers;
pub mod identity;
mod types;

pub use error::ApiError;
pub use types::{AnswerRequest, ErrorBody, HealthResponse, LeaderboardQuery, MAX_LEADERBOARD_LIMIT};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use services::{AppServices, TokenVerifier};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
    /// `None` when no token secret is configured; every caller is anonymous.
    pub tokens: Option<TokenVerifier>,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices, tokens: Option<TokenVerifier>) -> Self {
        Self { services, tokens }
    }
}

//
// ─── CORS ──────────────────────────────────────────────────────────────────────
//

/// Build the CORS layer from `READRISE_CORS_ORIGINS`.
///
/// A comma-separated list of origins allows those origins with credentials,
/// so the session cookie is sent. `*` allows any origin without credentials.
/// Unset means localhost only.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("READRISE_CORS_ORIGINS").ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: allowing all origins; session cookies will not be sent");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| match s.trim().parse::<HeaderValue>() {
                    Ok(hv) => Some(hv),
                    Err(e) => {
                        tracing::warn!(origin = s.trim(), error = %e, "CORS: invalid origin");
                        None
                    }
                })
                .collect();
            if allowed.is_empty() {
                build_localhost_cors()
            } else {
                credentialed_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    credentialed_cors(origins)
}

fn credentialed_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

//
// ─── ROUTER ────────────────────────────────────────────────────────────────────
//

/// Create the router with every endpoint and the tracing, CORS and body-limit
/// layers.
pub fn create_router(state: AppState) -> Router {
    if state.tokens.is_none() {
        tracing::warn!("no token secret configured; all requests are anonymous");
    }

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/levels", get(handlers::levels_handler))
        .route("/api/admin/levels", put(handlers::replace_levels_handler))
        .route("/api/admin/edits", post(handlers::edit_catalog_handler))
        .route("/api/me", get(handlers::me_handler))
        .route("/api/leaderboard", get(handlers::leaderboard_handler))
        .route("/api/play", get(handlers::play_view_handler))
        .route(
            "/api/play/levels/{level_id}",
            post(handlers::select_level_handler),
        )
        .route(
            "/api/play/readings/{reading_id}",
            post(handlers::select_reading_handler),
        )
        .route(
            "/api/play/answers/{question_id}",
            put(handlers::answer_handler),
        )
        .route("/api/play/submit", post(handlers::submit_handler))
        .route("/api/play/back", post(handlers::back_handler))
        .route(
            "/api/play/back-to-levels",
            post(handlers::back_to_levels_handler),
        )
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound or the server fails.
pub async fn run_server(addr: &str, state: AppState) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "readrise listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
            }
        })
        .await
}
