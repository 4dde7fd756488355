//! Rolegate - role-gated auth backend
//! Mission: Authenticate users and gate tabs/pages by role

use anyhow::{Context, Result};
use rolegate_backend::{
    auth::{AuthService, TokenCodec, UserStore},
    config::Config,
    content::ContentStore,
    router::build_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Fails fast when TOKEN_SECRET is missing; nothing below runs
    // without a signing secret.
    let config = Config::from_env()?;

    info!("🚀 Rolegate starting");

    // Credential store first: it owns the role seeds the content
    // store's defaults reference.
    let user_store = Arc::new(
        UserStore::new(&config.database_path).context("Failed to open credential store")?,
    );
    let content_store = Arc::new(
        ContentStore::new(&config.database_path).context("Failed to open content store")?,
    );
    info!("📊 Database initialized at: {}", config.database_path);

    let codec = Arc::new(TokenCodec::new(&config.token_secret));
    let service = AuthService::new(user_store, codec.clone());

    // The sign-up default role must exist; a deployment without it is
    // misconfigured and must not serve requests.
    service
        .verify_default_role()
        .context("Credential store is missing the default role")?;

    let app = build_router(service, codec, content_store);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rolegate_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
