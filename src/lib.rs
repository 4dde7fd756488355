//! Rolegate Backend Library
//!
//! Exposes the auth and content modules for use by the binary and
//! integration tests.

pub mod auth;
pub mod config;
pub mod content;
pub mod middleware;
pub mod router;
