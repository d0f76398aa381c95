//! HTTP surface for the alert state store and log.
//!
//! - `alert_state` - Transition and history endpoints (/api/alerts/*)
//! - `health` - Health check endpoint (/healthz)
//! - `openapi` - OpenAPI/Utoipa configuration

pub mod alert_state;
pub mod health;
pub mod openapi;

pub use alert_state::ALERT_STATE_TAG;
pub use health::MISC_TAG;

use crate::AppResources;
use axum::Router;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Builds the application router with all routes, docs and middleware.
pub fn build_router(app_resources: AppResources) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .nest("/api/alerts", alert_state::router())
        .routes(routes!(health::health))
        .layer(axum::Extension(app_resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server on `addr`.
#[tracing::instrument(skip(app_resources))]
pub async fn start_webserver(
    app_resources: AppResources,
    addr: SocketAddr,
) -> color_eyre::Result<()> {
    let router = build_router(app_resources);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
