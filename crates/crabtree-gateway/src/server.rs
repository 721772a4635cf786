// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use crabtree_catalog::{AdminProducts, CatalogService, MAX_IMAGE_BYTES};
use crabtree_checkout::{CheckoutBuilder, ConfirmationHandler};
use crabtree_config::model::ServerConfig;
use crabtree_core::{Adapter, ShopError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::auth::{AdminAuth, admin_auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
///
/// Every service is constructed once at startup and shared by clone; the
/// clones share their stores through `Arc`.
#[derive(Clone)]
pub struct GatewayState {
    pub catalog: CatalogService,
    pub admin: AdminProducts,
    pub checkout: CheckoutBuilder,
    pub confirmations: ConfirmationHandler,
    pub admin_auth: AdminAuth,
    /// Adapters reported by GET /health.
    pub adapters: Arc<[Arc<dyn Adapter>]>,
    /// Process start time for uptime calculation.
    pub started_at: Instant,
}

/// Build the full application router.
///
/// - Public: `/health`, `/api/products`, `/api/products/{id}`,
///   `/api/checkout`, `/api/webhooks/payment`, `/api/admin/auth`
/// - Admin (bearer auth): `/api/admin/products…`, `/api/admin/uploads`
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/{id}", get(handlers::get_product))
        .route("/api/checkout", post(handlers::create_checkout))
        .route("/api/webhooks/payment", post(handlers::payment_webhook))
        .route("/api/admin/auth", post(admin::login))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route(
            "/api/admin/products/{id}/toggle-status",
            post(admin::toggle_status),
        )
        .route(
            "/api/admin/products/{id}/toggle-featured",
            post(admin::toggle_featured),
        )
        .route(
            "/api/admin/uploads",
            post(admin::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.admin_auth.clone(),
            admin_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind to `host:port` and serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ShopError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ShopError::Internal(format!("failed to bind server to {addr}: {e}")))?;

    tracing::info!("storefront server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ShopError::Internal(format!("server error: {e}")))?;

    tracing::info!("storefront server stopped");
    Ok(())
}
