// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use dossier_core::DossierError;
use dossier_engine::NotificationService;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

pub const API_PREFIX: &str = "/api/v3";

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<NotificationService>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` rejects every authenticated route.
    pub bearer_token: Option<String>,
    pub request_body_limit: usize,
}

/// Build the full router: public `/health` plus the authenticated API.
pub fn router(config: &ServerConfig, state: GatewayState) -> Router {
    let auth = AuthConfig {
        bearer_token: config.bearer_token.clone(),
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/notification", post(handlers::post_notification))
        .route("/notification/event", post(handlers::post_notification_event))
        .route("/notification/reassign", put(handlers::put_reassign))
        .route("/notification/list", get(handlers::get_notifications))
        .route("/notification/type", get(handlers::get_notification_types))
        .route("/demand/list", get(handlers::get_demands))
        .route("/demand/status", get(handlers::get_demands_by_status))
        .route(
            "/demand/customer/{customer_id}",
            axum::routing::delete(handlers::delete_customer),
        )
        .route(
            "/demandtype",
            get(handlers::get_demand_types).post(handlers::post_demand_type),
        )
        .route(
            "/temporarystatus",
            get(handlers::get_temporary_statuses).post(handlers::post_temporary_status),
        )
        .route(
            "/temporarystatus/{id}",
            get(handlers::get_temporary_status)
                .put(handlers::put_temporary_status)
                .delete(handlers::delete_temporary_status),
        )
        .route(
            "/temporarystatus/{id}/generic",
            put(handlers::put_temporary_status_generic),
        )
        .route("/status", get(handlers::get_generic_statuses))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, public_routes.merge(api_routes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.request_body_limit)),
        )
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), DossierError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DossierError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}{API_PREFIX}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DossierError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
