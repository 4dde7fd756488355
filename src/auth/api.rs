//! Authentication API Endpoints
//! Mission: Expose sign-up, login, and token re-check over HTTP

use crate::auth::{
    middleware::{extract_claims, TokenGateError, TOKEN_HEADER},
    models::{AuthResult, CheckAuthResponse, CredentialsRequest, UserResponse},
    service::{AuthError, AuthService},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

/// Sign-up endpoint - POST /api/core/signup
pub async fn signup(
    State(service): State<AuthService>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<AuthResult>, AuthError> {
    info!("🔐 Sign-up attempt");
    let result = service.sign_up(&payload.email, &payload.password)?;
    Ok(Json(result))
}

/// Login endpoint - POST /api/core/login
pub async fn login(
    State(service): State<AuthService>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<AuthResult>, AuthError> {
    info!("🔐 Login attempt");
    let result = service.log_in(&payload.email, &payload.password)?;
    Ok(Json(result))
}

/// Auth re-check endpoint - GET /api/core/checkauth
///
/// Decodes the token, then re-queries storage so the response carries
/// the user's current roles rather than the ones embedded at issuance.
pub async fn check_auth(State(service): State<AuthService>, req: Request) -> Response {
    let token = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(token) = token else {
        return TokenGateError::MissingToken.into_response();
    };

    match service.check_auth(token) {
        Ok(user) => Json(CheckAuthResponse { user }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Current-user endpoint - GET /api/core/me
///
/// Runs behind `require_token`; builds the response straight from the
/// attached claims with no storage round-trip, trusting the token's
/// embedded roles.
pub async fn current_user(req: Request) -> Result<Json<CheckAuthResponse>, AuthError> {
    let claims = extract_claims(&req).ok_or(AuthError::InvalidToken)?;

    Ok(Json(CheckAuthResponse {
        user: UserResponse::from_claims(claims),
    }))
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Fixed client-safe strings only. The collapsed 400 for
        // unknown-user vs wrong-password is deliberate: the response
        // must not reveal which check failed.
        let (status, message) = match self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "User does not exist or password is incorrect",
            ),
            AuthError::DuplicateUser => (StatusCode::BAD_REQUEST, "Unable to create account"),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "forbidden"),
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "User does not exist"),
            AuthError::Storage(err) => {
                warn!("Storage failure surfaced as 500: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}
