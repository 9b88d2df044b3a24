//! Configuration for the authentication core
//!
//! Everything is loaded once at process start and injected into the
//! components that need it; nothing reads ambient globals afterwards.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::extract::{BearerHeaderExtractor, SessionCookieExtractor, TokenExtractor};

/// Placeholder secret for local development. Anything still running with it
/// in production has no integrity guarantee at all.
pub const DEV_SECRET: &str = "dev-secret-change-me-in-production";

const DEFAULT_COOKIE_NAME: &str = "hce_session";

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub database_url: String,
    pub bind_address: String,
    pub token: TokenConfig,
    pub password: PasswordConfig,
    /// `"bearer"` or `"cookie"`; see [`AuthConfig::token_transport`].
    pub transport: String,
    pub cookie_name: String,
}

/// Token codec configuration. The signing algorithm is fixed (HS256);
/// compromise of `secret` voids every outstanding token.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub secret: String,
    pub access_ttl_minutes: u64,
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub argon2_memory_cost: u32,
    pub argon2_time_cost: u32,
    pub argon2_parallelism: u32,
}

/// Which transport carries the token on inbound requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenTransport {
    BearerHeader,
    Cookie { name: String },
}

impl TokenTransport {
    /// Build the extractor implementing this transport.
    pub fn extractor(&self) -> std::sync::Arc<dyn TokenExtractor> {
        match self {
            TokenTransport::BearerHeader => std::sync::Arc::new(BearerHeaderExtractor),
            TokenTransport::Cookie { name } => {
                std::sync::Arc::new(SessionCookieExtractor::new(name.clone()))
            }
        }
    }
}

impl AuthConfig {
    /// Load configuration from the environment over the built-in defaults.
    ///
    /// Variables are prefixed with `HCE_AUTH` and nested with `__`, e.g.
    /// `HCE_AUTH__TOKEN__SECRET` or `HCE_AUTH__PASSWORD__ARGON2_TIME_COST`.
    pub fn from_env() -> Result<Self> {
        let cfg: AuthConfig = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("HCE_AUTH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;

        if cfg.token.secret == DEV_SECRET {
            tracing::warn!("token secret is the development default; set HCE_AUTH__TOKEN__SECRET");
        }
        cfg.token_transport()?;
        Ok(cfg)
    }

    /// Parse the configured transport selection.
    pub fn token_transport(&self) -> Result<TokenTransport> {
        match self.transport.as_str() {
            "bearer" => Ok(TokenTransport::BearerHeader),
            "cookie" => Ok(TokenTransport::Cookie {
                name: self.cookie_name.clone(),
            }),
            other => Err(Error::Config(format!("unknown token transport: {other}"))),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://hce_auth.db?mode=rwc".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            token: TokenConfig::default(),
            password: PasswordConfig::default(),
            transport: "bearer".to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            access_ttl_minutes: 30,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AuthConfig::default();
        assert_eq!(config.token.access_ttl_minutes, 30);
        assert_eq!(config.password.argon2_memory_cost, 65536);
        assert_eq!(
            config.token_transport().unwrap(),
            TokenTransport::BearerHeader
        );
    }

    #[test]
    fn cookie_transport_carries_name() {
        let config = AuthConfig {
            transport: "cookie".to_string(),
            cookie_name: "session".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.token_transport().unwrap(),
            TokenTransport::Cookie {
                name: "session".to_string()
            }
        );
    }

    #[test]
    fn unknown_transport_is_a_config_error() {
        let config = AuthConfig {
            transport: "query".to_string(),
            ..Default::default()
        };
        assert!(config.token_transport().is_err());
    }
}
