//! # HCE Auth Core
//!
//! Authentication and role-based authorization core for the HCE electronic
//! clinical-records backend.
//!
//! This crate provides:
//! - Password hashing and verification with Argon2
//! - Signed, expiring access tokens (HS256) for stateless sessions
//! - Credential extraction from bearer headers or session cookies
//! - Session resolution from request to verified principal
//! - Role gates composing with arbitrary route handlers
//!
//! ## Architecture
//!
//! Login flows through the [`AuthenticationService`]: store lookup, Argon2
//! verification, token issuance. Every subsequent request flows the other
//! way through the [`SessionResolver`]: extract token, decode, load
//! principal; a [`RoleGate`] wraps the resolver with a required-role-set
//! check. The clinical CRUD surface, template rendering and PDF generation
//! are collaborators built on top of these pieces, not part of this crate.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod password;
pub mod session;
pub mod store;
pub mod token;
pub mod types;

use std::sync::Arc;

pub use auth::{AuthenticationResult, AuthenticationService};
pub use config::{AuthConfig, PasswordConfig, TokenConfig, TokenTransport};
pub use error::{Error, Result, TokenError};
pub use extract::{BearerHeaderExtractor, SessionCookieExtractor, TokenExtractor};
pub use gate::RoleGate;
pub use password::CredentialHasher;
pub use session::SessionResolver;
pub use store::{MemoryPrincipalStore, NewPrincipal, PrincipalStore, SqlitePrincipalStore};
pub use token::{AccessClaims, TokenCodec};
pub use types::{CreatePrincipalRequest, LoginForm, Principal, Role, RoleSet, TokenResponse};

/// Fully wired authentication core.
pub struct AuthContext {
    pub auth: Arc<AuthenticationService>,
    pub resolver: SessionResolver,
    pub transport: TokenTransport,
}

impl AuthContext {
    /// Construct a role gate over this context's resolver.
    pub fn gate(&self, allowed: impl Into<RoleSet>) -> RoleGate {
        RoleGate::require(self.resolver.clone(), allowed)
    }

    /// Build the HTTP router for the authentication endpoints.
    pub fn router(&self) -> axum::Router {
        api::create_router(api::ApiState {
            auth: self.auth.clone(),
            resolver: self.resolver.clone(),
            transport: self.transport.clone(),
        })
    }
}

/// Initialize the authentication core against the configured SQLite store.
pub async fn init(config: AuthConfig) -> Result<AuthContext> {
    let transport = config.token_transport()?;
    let store = Arc::new(SqlitePrincipalStore::new(&config.database_url).await?);
    init_with_store(config, store, transport)
}

/// Wire the core around an externally owned principal store.
pub fn init_with_store(
    config: AuthConfig,
    store: Arc<dyn PrincipalStore>,
    transport: TokenTransport,
) -> Result<AuthContext> {
    let hasher = CredentialHasher::new(&config.password)?;
    let codec = TokenCodec::new(config.token);

    let auth = Arc::new(AuthenticationService::new(
        store.clone(),
        codec.clone(),
        hasher,
    ));
    let resolver = SessionResolver::new(transport.extractor(), codec, store);

    Ok(AuthContext {
        auth,
        resolver,
        transport,
    })
}
