//! Content API Endpoints
//! Mission: Serve each caller the tabs and pages their roles allow

use crate::auth::middleware::extract_claims;
use crate::content::{
    models::{Page, Tab},
    store::ContentStore,
    visibility::{caller_roles, filter_visible},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::warn;

/// Tab listing - GET /api/core/tabs
///
/// Runs behind `attach_claims`: authenticated callers are filtered by
/// their token roles, everyone else resolves to `public`.
pub async fn list_tabs(
    State(store): State<Arc<ContentStore>>,
    req: Request,
) -> Result<Json<Vec<Tab>>, ContentApiError> {
    let roles = caller_roles(extract_claims(&req).map(|c| c.roles.as_slice()));

    let tabs = store.all_tabs().map_err(|e| {
        warn!("Failed to load tabs: {e:#}");
        ContentApiError::Storage
    })?;

    Ok(Json(filter_visible(tabs, &roles)))
}

/// Page listing - GET /api/core/pages
pub async fn list_pages(
    State(store): State<Arc<ContentStore>>,
    req: Request,
) -> Result<Json<Vec<Page>>, ContentApiError> {
    let roles = caller_roles(extract_claims(&req).map(|c| c.roles.as_slice()));

    let pages = store.all_pages().map_err(|e| {
        warn!("Failed to load pages: {e:#}");
        ContentApiError::Storage
    })?;

    Ok(Json(filter_visible(pages, &roles)))
}

/// Content API errors.
#[derive(Debug)]
pub enum ContentApiError {
    Storage,
}

impl IntoResponse for ContentApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ContentApiError::Storage => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database Error Occurred",
            ),
        };

        (status, message).into_response()
    }
}
