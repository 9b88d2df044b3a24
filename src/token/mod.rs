//! Signed access-token issuance and validation
//!
//! Tokens are stateless: nothing is stored server-side and there is no
//! revocation path, so a token is valid until its embedded expiry. The
//! signing secret is injected at construction, never read from ambient
//! state, which keeps the codec testable with fixture secrets.

use std::sync::Arc;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::TokenConfig;
use crate::error::{Result, TokenError};
use crate::types::{Principal, Role};

/// Claims carried inside an access token. `sub` and `exp` are mandatory; a
/// token missing either never decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// The principal's identity key (email).
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Absolute expiry, seconds since the Unix epoch, UTC.
    pub exp: u64,
    /// Issued-at, same clock as `exp`.
    pub iat: u64,
}

/// Encoder/decoder for signed access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    config: TokenConfig,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        // A token is invalid the instant its expiry passes.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            config,
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }

    /// Seconds of validity granted to freshly issued tokens.
    pub fn access_ttl_secs(&self) -> u64 {
        self.config.access_ttl_minutes * 60
    }

    /// Issue a token for `principal` with the configured TTL.
    pub fn issue(&self, principal: &Principal) -> Result<String> {
        self.issue_with_ttl(principal, chrono::Duration::seconds(self.access_ttl_secs() as i64))
    }

    /// Issue a token expiring `ttl` from now.
    pub fn issue_with_ttl(&self, principal: &Principal, ttl: chrono::Duration) -> Result<String> {
        let now = chrono::Utc::now();
        let claims = AccessClaims {
            sub: principal.email.clone(),
            role: Some(principal.role),
            exp: (now + ttl).timestamp().max(0) as u64,
            iat: now.timestamp().max(0) as u64,
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &AccessClaims) -> Result<String> {
        Ok(encode(&self.header, claims, &self.encoding_key)?)
    }

    /// Verify and deserialize a token.
    ///
    /// Every check is unconditional: a failed signature, a missing or empty
    /// subject, or a past expiry each rejects the token outright. There is
    /// no degraded acceptance mode.
    pub fn decode(&self, token: &str) -> std::result::Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;
        if data.claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }
}

/// Collapse jsonwebtoken's error surface into the three reasons this system
/// distinguishes internally.
fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
        // Signature mismatch, wrong algorithm, truncated framing: all
        // integrity failures.
        _ => TokenError::Tampered,
    }
}
