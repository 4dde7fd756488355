//! Application configuration
//! Mission: Collect process-wide settings once at startup

use anyhow::{Context, Result};

/// Immutable configuration, loaded from the environment exactly once
/// and injected into the components that need it. Nothing reads env
/// vars after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    /// Token signing secret. Required: the codec must not be
    /// constructible without it.
    pub token_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./rolegate.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let token_secret = std::env::var("TOKEN_SECRET")
            .context("TOKEN_SECRET must be set; refusing to start without a signing secret")?;
        anyhow::ensure!(
            !token_secret.trim().is_empty(),
            "TOKEN_SECRET must not be empty"
        );

        Ok(Self {
            database_path,
            port,
            token_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so
    // they cannot race each other.
    #[test]
    fn test_from_env_requires_secret() {
        std::env::remove_var("TOKEN_SECRET");
        assert!(Config::from_env().is_err());

        std::env::set_var("TOKEN_SECRET", "   ");
        assert!(Config::from_env().is_err());

        std::env::set_var("TOKEN_SECRET", "a-real-secret");
        let config = Config::from_env().unwrap();
        assert_eq!(config.token_secret, "a-real-secret");
        assert_eq!(config.port, 3000);

        std::env::remove_var("TOKEN_SECRET");
    }
}
