//! Storefront API
//!
//! HTTP surface over the storefront service.
//!
//! ## REST Endpoints
//!
//! - `GET /api/v1/subscription` - Current subscription state
//! - `POST /api/v1/subscription/refresh` - Re-fetch entitlements and reconcile
//! - `GET /api/v1/offerings` - Paywall offerings
//! - `POST /api/v1/purchases` - Purchase a package
//! - `POST /api/v1/purchases/restore` - Restore previous purchases
//! - `POST /api/v1/bookings/eligibility` - Check whether a workshop can be booked
//! - `POST /api/v1/bookings` - Book a workshop
//! - `GET /api/v1/passes/count` - Single visit passes ever purchased
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{health, ready};

pub use config::{Config, ConfigError};
pub use state::{AppState, Storefront};

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 routes
    let api_v1 = Router::new()
        // Subscription routes
        .route("/subscription", get(handlers::get_subscription))
        .route("/subscription/refresh", post(handlers::refresh_subscription))
        .route("/offerings", get(handlers::get_offerings))
        // Purchase routes
        .route("/purchases", post(handlers::create_purchase))
        .route("/purchases/restore", post(handlers::restore_purchases))
        // Booking routes
        .route("/bookings/eligibility", post(handlers::check_eligibility))
        .route("/bookings", post(handlers::book_workshop))
        .route("/passes/count", get(handlers::get_pass_count));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Innermost - closest to handler
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
