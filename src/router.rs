//! Router assembly
//! Mission: Wire the auth and content endpoints into one axum app

use crate::auth::{api as auth_api, attach_claims, require_token, AuthService, TokenCodec};
use crate::content::{api as content_api, ContentStore};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the full application router.
///
/// Three route groups, matching the access model:
/// - open: sign-up, login, checkauth (token read by the handler), health
/// - protected: requires a decodable token (`require_token`)
/// - content: token optional; unauthenticated callers see `public`
pub fn build_router(
    service: AuthService,
    codec: Arc<TokenCodec>,
    content_store: Arc<ContentStore>,
) -> Router {
    let auth_routes = Router::new()
        .route("/api/core/signup", post(auth_api::signup))
        .route("/api/core/login", post(auth_api::login))
        .route("/api/core/checkauth", get(auth_api::check_auth))
        .with_state(service);

    let protected_routes = Router::new()
        .route("/api/core/me", get(auth_api::current_user))
        .route_layer(middleware::from_fn_with_state(
            codec.clone(),
            require_token,
        ));

    let content_routes = Router::new()
        .route("/api/core/tabs", get(content_api::list_tabs))
        .route("/api/core/pages", get(content_api::list_pages))
        .route_layer(middleware::from_fn_with_state(codec, attach_claims))
        .with_state(content_store);

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(content_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "🚀 Rolegate Operational"
}
