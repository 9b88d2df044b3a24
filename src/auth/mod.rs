//! Authentication service
//!
//! Verifies identity/password pairs against the principal store and issues
//! access tokens. Argon2 work runs on the blocking pool so it never stalls
//! the async scheduler.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::password::CredentialHasher;
use crate::store::{NewPrincipal, PrincipalStore};
use crate::token::TokenCodec;
use crate::types::{CreatePrincipalRequest, Principal};

/// Outcome of a successful login.
#[derive(Debug)]
pub struct AuthenticationResult {
    pub principal: Principal,
    pub access_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: u64,
}

pub struct AuthenticationService {
    store: Arc<dyn PrincipalStore>,
    codec: TokenCodec,
    hasher: CredentialHasher,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        codec: TokenCodec,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            store,
            codec,
            hasher,
        }
    }

    pub fn store(&self) -> Arc<dyn PrincipalStore> {
        self.store.clone()
    }

    pub fn codec(&self) -> TokenCodec {
        self.codec.clone()
    }

    /// Verify an identity/password pair.
    ///
    /// Unknown identity and wrong password both collapse to
    /// [`Error::AuthenticationFailed`]; the caller learns nothing about
    /// which identities exist. The unknown-identity path still burns one
    /// argon2 verification so the two failures cost the same. Read-only
    /// over the store.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Principal> {
        let found = self.store.find_by_email(email).await?;
        match found {
            Some(principal) => {
                let verified = self
                    .verify_blocking(password.to_string(), principal.password_hash.clone())
                    .await?;
                if verified {
                    Ok(principal)
                } else {
                    debug!(subject = %email, "password verification failed");
                    Err(Error::AuthenticationFailed)
                }
            }
            None => {
                let hasher = self.hasher.clone();
                let password = password.to_string();
                run_blocking(move || {
                    hasher.verify_dummy(&password);
                })
                .await?;
                debug!(subject = %email, "unknown identity");
                Err(Error::AuthenticationFailed)
            }
        }
    }

    /// Authenticate and issue an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticationResult> {
        let principal = self.authenticate(email, password).await?;
        let access_token = self.codec.issue(&principal)?;
        info!(subject = %principal.email, role = %principal.role, "access token issued");
        Ok(AuthenticationResult {
            principal,
            access_token,
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    /// Hash the password and register a principal. Used by registration
    /// flows and test fixtures.
    pub async fn create_principal(&self, request: CreatePrincipalRequest) -> Result<Principal> {
        let hasher = self.hasher.clone();
        let password = request.password.clone();
        let password_hash = run_blocking(move || hasher.hash(&password)).await??;

        self.store
            .create(NewPrincipal {
                document_id: request.document_id,
                email: request.email,
                full_name: request.full_name,
                password_hash,
                role: request.role,
            })
            .await
    }

    async fn verify_blocking(&self, password: String, digest: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        run_blocking(move || hasher.verify(&password, &digest)).await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::PasswordHash(format!("hashing task failed: {e}")))
}
