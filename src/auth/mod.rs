//! Authentication & Authorization
//! Mission: Credential verification, stateless tokens, role gating

pub mod api;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;
pub mod user_store;

pub use middleware::{attach_claims, require_token};
pub use models::{Claims, Role, User};
pub use service::{AuthError, AuthService};
pub use token::TokenCodec;
pub use user_store::UserStore;
