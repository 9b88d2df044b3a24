//! Session resolution
//!
//! The sole gate turning an inbound request into an authenticated identity.
//! Extraction, decoding and principal lookup each fail for their own reason,
//! but every reason collapses to [`Error::Unauthenticated`] at this
//! boundary. The distinction is logged at debug level and never returned,
//! so callers cannot use the error as an oracle for signature or expiry
//! internals.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::extract::TokenExtractor;
use crate::store::PrincipalStore;
use crate::token::TokenCodec;
use crate::types::Principal;

#[derive(Clone)]
pub struct SessionResolver {
    extractor: Arc<dyn TokenExtractor>,
    codec: TokenCodec,
    store: Arc<dyn PrincipalStore>,
}

impl SessionResolver {
    pub fn new(
        extractor: Arc<dyn TokenExtractor>,
        codec: TokenCodec,
        store: Arc<dyn PrincipalStore>,
    ) -> Self {
        Self {
            extractor,
            codec,
            store,
        }
    }

    /// Resolve the request's token to a principal.
    ///
    /// Stateless per request; any number of resolutions may run
    /// concurrently. A rejection is final for the request; the client
    /// re-authenticates, nothing is retried here.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Principal> {
        let token = self.extractor.extract(headers).map_err(|e| {
            debug!(reason = %e, "session rejected");
            Error::Unauthenticated
        })?;

        let claims = self.codec.decode(&token).map_err(|reason| {
            debug!(%reason, "session rejected");
            Error::Unauthenticated
        })?;

        // Store errors are infrastructure failures and propagate as such;
        // only a clean "not found" is an authentication failure.
        let principal = self.store.find_by_email(&claims.sub).await?;
        principal.ok_or_else(|| {
            debug!(subject = %claims.sub, "session rejected: subject unknown");
            Error::Unauthenticated
        })
    }
}
