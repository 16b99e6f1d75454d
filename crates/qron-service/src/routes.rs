//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    catalog, checkout, folders, generate, health, profiles, qrons, redirects, scan, schedules,
    tags, webhooks,
};
use crate::state::AppState;

/// Maximum concurrent requests for the API surface. Generation requests hold
/// two upstream calls open each, so the ceiling is deliberately modest.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /r/:id` - Scan tracking + redirect
/// - `GET /api/modes`, `/api/presets`, `/api/plans` - Catalog
///
/// ## Authenticated (identity-provider JWT)
/// - `POST /api/generate` - Generate a QRON
/// - `GET /api/profile` - Tier and quota
/// - QRON gallery, folders, tags, schedules, redirect rules
///
/// ## Checkout / Webhooks
/// - `POST /api/checkout` - Open a hosted checkout session (auth optional)
/// - `POST /api/webhook` - Payment gateway events (signature verification)
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Generation
        .route("/generate", post(generate::generate))
        // Catalog
        .route("/modes", get(catalog::list_modes))
        .route("/presets", get(catalog::list_presets))
        .route("/plans", get(catalog::list_plans))
        // Checkout
        .route("/checkout", post(checkout::checkout))
        // Profile
        .route("/profile", get(profiles::get_profile))
        // QRON gallery
        .route("/qrons", get(qrons::list_qrons))
        .route("/qrons/:id", get(qrons::get_qron))
        .route("/qrons/:id/folder", put(qrons::set_folder))
        .route("/qrons/:id/tags/:tag_id", post(qrons::add_tag))
        .route("/qrons/:id/tags/:tag_id", delete(qrons::remove_tag))
        // Living-art schedules
        .route(
            "/qrons/:id/schedules",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/qrons/:id/schedules/:schedule_id",
            delete(schedules::delete_schedule),
        )
        // Redirect rules
        .route(
            "/qrons/:id/redirect-rules",
            get(redirects::list_rules).post(redirects::create_rule),
        )
        .route(
            "/qrons/:id/redirect-rules/:rule_id",
            delete(redirects::delete_rule),
        )
        // Folders
        .route("/folders", get(folders::list_folders).post(folders::create_folder))
        .route("/folders/:id", put(folders::update_folder))
        .route("/folders/:id", delete(folders::delete_folder))
        // Tags
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/tags/:id", put(tags::update_tag))
        .route("/tags/:id", delete(tags::delete_tag))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // Scan tracking (public; QR bitmaps in the wild point here)
        .route("/r/:id", get(scan::scan))
        // API routes (concurrency limited)
        .nest("/api", api_routes)
        // Webhook (no concurrency limit - paced by the gateway)
        .route("/api/webhook", post(webhooks::stripe_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
