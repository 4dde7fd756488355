//! Authentication Middleware
//! Mission: Attach decoded token claims to incoming requests

use crate::auth::{models::Claims, token::TokenCodec};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Header clients use to send their token on every protected call.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Middleware that requires a decodable token.
///
/// Decodes only; it does not consult storage, so the embedded roles
/// are trusted as-is. Handlers that need current roles go through
/// `AuthService::check_auth` instead.
pub async fn require_token(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, TokenGateError> {
    let token = header_token(&req).ok_or(TokenGateError::MissingToken)?;

    let claims = codec
        .decode(&token)
        .map_err(|_| TokenGateError::UndecodableToken)?;

    // Make the claims available to handlers downstream.
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Optional variant: attaches claims when a valid token is present,
/// passes the request through untouched otherwise. Lets the resource
/// listing routes serve unauthenticated callers as `public`.
pub async fn attach_claims(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = header_token(&req) {
        if let Ok(claims) = codec.decode(&token) {
            req.extensions_mut().insert(claims);
        }
    }

    next.run(req).await
}

/// Extract claims from a request (use after the middleware ran).
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

fn header_token(req: &Request) -> Option<String> {
    req.headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|t| t.to_string())
}

/// Token gate failures.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenGateError {
    MissingToken,
    UndecodableToken,
}

impl IntoResponse for TokenGateError {
    fn into_response(self) -> Response {
        // Contract: a missing token is 403, an undecodable one is 500.
        // (A 401 for the latter would be clearer but is a contract
        // change, so it stays.)
        let (status, message) = match self {
            TokenGateError::MissingToken => (StatusCode::FORBIDDEN, "no token provided"),
            TokenGateError::UndecodableToken => {
                (StatusCode::INTERNAL_SERVER_ERROR, "User not found")
            }
        };

        (status, message).into_response()
    }
}
