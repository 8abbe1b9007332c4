//! Route configuration and setup

use crate::auth::{auth_middleware, AuthState, JwtService};
use crate::handlers::{
    health::{healthz, readyz},
    thumbnail_upload::upload_thumbnail,
    video_get::get_video,
    video_upload::upload_video,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::Config;

/// Room for multipart boundaries and part headers on top of a field's size limit.
///
/// The body limits must sit above the field limits, otherwise the body is cut
/// mid-stream and surfaces as a multipart parse error instead of a 413.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: Arc::new(JwtService::new(config.jwt_secret())),
    });

    let public_routes = Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/readyz", get(readyz));

    // Multipart bodies are capped per route; axum's default limit is far below a video.
    let video_body_limit = config.max_video_size_bytes() + MULTIPART_OVERHEAD_BYTES;
    let thumbnail_body_limit = config.max_thumbnail_size_bytes() + MULTIPART_OVERHEAD_BYTES;
    let protected_routes = Router::new()
        .route("/api/videos/{video_id}", get(get_video))
        .route(
            "/api/video_upload/{video_id}",
            post(upload_video).layer(DefaultBodyLimit::max(video_body_limit)),
        )
        .route(
            "/api/thumbnail_upload/{video_id}",
            post(upload_thumbnail).layer(DefaultBodyLimit::max(thumbnail_body_limit)),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let app = public_routes
        .merge(protected_routes)
        .nest_service("/assets", ServeDir::new(config.assets_root()))
        .layer(RequestBodyLimitLayer::new(
            video_body_limit.max(thumbnail_body_limit),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
