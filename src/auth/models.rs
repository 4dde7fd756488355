//! Authentication Models
//! Mission: Define the user, role, and token claim data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account with its assigned roles attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub roles: Vec<Role>,
    pub created_at: String,
}

/// Named authorization group. Resources and token claims reference
/// roles by name; the set of names lives in the `roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default role assigned to every new account at sign-up.
    pub fn default_user() -> Self {
        Self("user".to_string())
    }

    /// Role granted to unauthenticated callers when resolving
    /// resource visibility. An ordinary stored role, not a sentinel.
    pub fn public() -> Self {
        Self("public".to_string())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Token claims payload: a projection of a User at issuance time.
/// Carries no expiry and may go stale if roles change afterwards;
/// `check_auth` re-reads storage to correct for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub roles: Vec<Role>,
}

/// Sign-up / login request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// User payload sent to clients (no hash, role names only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub roles: Vec<Role>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            email: claims.email.clone(),
            roles: claims.roles.clone(),
        }
    }
}

/// The sole payload returned on successful authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResult {
    pub token: String,
    pub user: UserResponse,
}

/// Response for the auth re-check endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckAuthResponse {
    pub user: UserResponse,
}
