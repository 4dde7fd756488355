//! Token Codec
//! Mission: Encode and verify the stateless claim tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Signs and verifies claim tokens with a process-wide secret.
///
/// Tokens carry no expiry and none is checked: a token stays valid
/// for as long as the secret does. Known limitation of the contract,
/// not to be silently fixed here.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

impl TokenCodec {
    /// Build a codec from the configured secret. The secret itself is
    /// validated at config load; by the time we get here it is
    /// guaranteed non-empty.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Claims carry no `exp`; accept tokens without one.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Encode claims into an opaque signed token string.
    pub fn encode(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .context("Failed to encode claims token")
    }

    /// Decode and verify a token back into claims.
    ///
    /// Malformed, truncated, or tampered tokens all collapse into
    /// `InvalidToken`; no detail from the underlying library leaks
    /// out of this module.
    pub fn decode(&self, token: &str) -> Result<Claims, InvalidToken> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)
    }
}
