//! Auth Service
//! Mission: Orchestrate sign-up, login, and token re-validation

use crate::auth::models::{AuthResult, Claims, Role, User, UserResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenCodec;
use crate::auth::user_store::{StoreError, UserStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Authentication failure taxonomy. Variants map one-to-one onto the
/// client-safe responses in `auth::api`; nothing here carries internal
/// detail that could leak into a response body.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed input: {0}")]
    Validation(&'static str),
    /// Covers both unknown-email and wrong-password so the two are
    /// indistinguishable to callers.
    #[error("user does not exist or password is incorrect")]
    InvalidCredentials,
    #[error("account could not be created")]
    DuplicateUser,
    #[error("invalid token")]
    InvalidToken,
    /// A decoded token referenced a user that no longer exists.
    #[error("user does not exist")]
    UnknownUser,
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateUser,
            other => AuthError::Storage(other.into()),
        }
    }
}

/// Stateless orchestrator over the credential store, password
/// verifier, and token codec. Holds no per-request state of its own.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<UserStore>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(store: Arc<UserStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Create an account, grant the default `user` role, and issue a
    /// token. Steps are strictly ordered: create, assign role,
    /// re-fetch with roles, encode.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("password must not be empty"));
        }

        let password_hash =
            hash_password(password).map_err(AuthError::Storage)?;

        let user = match self.store.create_user(&email, &password_hash) {
            Ok(user) => user,
            Err(StoreError::DuplicateEmail) => {
                warn!("❌ Sign-up rejected for existing email");
                return Err(AuthError::DuplicateUser);
            }
            Err(e) => return Err(e.into()),
        };

        // The default role is seeded at startup; losing it afterwards
        // is a deployment fault, not a client error.
        self.store
            .assign_role(&user.id, &Role::default_user())
            .map_err(|e| AuthError::Storage(e.into()))?;

        let user = self.reload(&email)?;
        info!("✅ Sign-up complete: {}", user.email);

        self.issue(&user)
    }

    /// Verify credentials and issue a fresh token.
    pub fn log_in(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let email = normalize_email(email)?;

        let user = match self.store.find_by_email(&email)? {
            Some(user) => user,
            // Same error as a wrong password: no account enumeration.
            None => return Err(AuthError::InvalidCredentials),
        };

        if !verify_password(password, &user.password_hash) {
            warn!("❌ Failed login attempt: {}", user.email);
            return Err(AuthError::InvalidCredentials);
        }

        info!("✅ Login successful: {}", user.email);
        self.issue(&user)
    }

    /// Validate a token and return the user's CURRENT roles from
    /// storage. The re-fetch is what lets role changes made after
    /// issuance take effect for authorization, even though the token
    /// payload itself never changes.
    pub fn check_auth(&self, token: &str) -> Result<UserResponse, AuthError> {
        let claims = self.decode_claims(token)?;

        match self.store.find_by_email(&claims.email)? {
            Some(user) => Ok(UserResponse::from_user(&user)),
            None => Err(AuthError::UnknownUser),
        }
    }

    /// Decode a token without touching storage, trusting the embedded
    /// roles. Cheaper than `check_auth` but serves stale roles until
    /// the client re-authenticates; both paths are kept on purpose.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.decode(token).map_err(|_| AuthError::InvalidToken)
    }

    /// Startup invariant: the sign-up default role must exist.
    pub fn verify_default_role(&self) -> anyhow::Result<()> {
        let role = Role::default_user();
        let exists = self
            .store
            .role_exists(&role)
            .map_err(anyhow::Error::from)?;
        anyhow::ensure!(
            exists,
            "default role '{role}' missing from the credential store"
        );
        Ok(())
    }

    fn reload(&self, email: &str) -> Result<User, AuthError> {
        self.store
            .find_by_email(email)?
            .ok_or_else(|| AuthError::Storage(anyhow::anyhow!("user vanished after creation")))
    }

    fn issue(&self, user: &User) -> Result<AuthResult, AuthError> {
        let claims = Claims {
            email: user.email.clone(),
            roles: user.roles.clone(),
        };
        let token = self
            .codec
            .encode(&claims)
            .map_err(AuthError::Storage)?;

        Ok(AuthResult {
            token,
            user: UserResponse::from_user(user),
        })
    }
}

/// Emails are case-insensitive identities: always lowercased before
/// storage or lookup.
fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation("a valid email is required"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_service() -> (AuthService, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = UserStore::new(temp_file.path().to_str().unwrap()).unwrap();
        let codec = TokenCodec::new("test-secret-key-12345");
        (
            AuthService::new(Arc::new(store), Arc::new(codec)),
            temp_file,
        )
    }

    #[test]
    fn test_sign_up_then_log_in() {
        let (service, _temp) = test_service();

        let signed_up = service.sign_up("A@B.com", "pw1").unwrap();
        assert_eq!(signed_up.user.email, "a@b.com");
        assert_eq!(signed_up.user.roles, vec![Role::new("user")]);

        let logged_in = service.log_in("a@b.com", "pw1").unwrap();
        assert_eq!(logged_in.user.email, "a@b.com");
        assert_eq!(logged_in.user.roles, vec![Role::new("user")]);

        let claims = service.decode_claims(&logged_in.token).unwrap();
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn test_sign_up_normalizes_email_in_claims() {
        let (service, _temp) = test_service();

        let result = service.sign_up("MixedCase@Example.COM", "pw1").unwrap();
        let claims = service.decode_claims(&result.token).unwrap();
        assert_eq!(claims.email, "mixedcase@example.com");
    }

    #[test]
    fn test_duplicate_sign_up_leaves_no_orphan() {
        let (service, _temp) = test_service();

        service.sign_up("a@b.com", "pw1").unwrap();
        let err = service.sign_up("a@b.com", "pw2").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));

        // The original account is intact: old password still works,
        // roles still attached.
        let result = service.log_in("a@b.com", "pw1").unwrap();
        assert_eq!(result.user.roles, vec![Role::new("user")]);
        assert!(matches!(
            service.log_in("a@b.com", "pw2").unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let (service, _temp) = test_service();
        service.sign_up("a@b.com", "pw1").unwrap();

        let wrong_password = service.log_in("a@b.com", "wrong").unwrap_err();
        let unknown_user = service.log_in("nobody@b.com", "pw1").unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_validation_fails_before_storage() {
        let (service, _temp) = test_service();

        assert!(matches!(
            service.sign_up("", "pw1").unwrap_err(),
            AuthError::Validation(_)
        ));
        assert!(matches!(
            service.sign_up("not-an-email", "pw1").unwrap_err(),
            AuthError::Validation(_)
        ));
        assert!(matches!(
            service.sign_up("a@b.com", "").unwrap_err(),
            AuthError::Validation(_)
        ));
    }

    #[test]
    fn test_check_auth_reflects_role_changes() {
        let (service, temp) = test_service();
        let store = UserStore::new(temp.path().to_str().unwrap()).unwrap();

        let result = service.sign_up("a@b.com", "pw1").unwrap();
        let token = result.token;

        // Promote the user after the token was issued.
        let user = store.find_by_email("a@b.com").unwrap().unwrap();
        store.assign_role(&user.id, &Role::new("admin")).unwrap();

        // Re-fetch path sees the new role set...
        let current = service.check_auth(&token).unwrap();
        assert_eq!(
            current.roles,
            vec![Role::new("admin"), Role::new("user")]
        );

        // ...while the decode-only path still serves the embedded one.
        let stale = service.decode_claims(&token).unwrap();
        assert_eq!(stale.roles, vec![Role::new("user")]);
    }

    #[test]
    fn test_check_auth_rejects_deleted_user_and_bad_token() {
        let (service, temp) = test_service();
        let store = UserStore::new(temp.path().to_str().unwrap()).unwrap();

        let result = service.sign_up("a@b.com", "pw1").unwrap();

        // Remove the user behind the token's back.
        let user = store.find_by_email("a@b.com").unwrap().unwrap();
        store.clear_roles(&user.id).unwrap();
        let conn = rusqlite::Connection::open(temp.path()).unwrap();
        conn.execute("DELETE FROM users WHERE email = 'a@b.com'", [])
            .unwrap();

        assert!(matches!(
            service.check_auth(&result.token).unwrap_err(),
            AuthError::UnknownUser
        ));
        assert!(matches!(
            service.check_auth("garbage.token.here").unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[test]
    fn test_default_role_invariant() {
        let (service, temp) = test_service();
        service.verify_default_role().unwrap();

        let conn = rusqlite::Connection::open(temp.path()).unwrap();
        conn.execute("DELETE FROM roles WHERE name = 'user'", [])
            .unwrap();

        assert!(service.verify_default_role().is_err());
    }
}
