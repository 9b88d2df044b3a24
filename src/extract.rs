//! Credential extraction from inbound requests
//!
//! Two transports carry a token: the `Authorization: Bearer` header for
//! programmatic clients and a named cookie for browser sessions. Both are
//! implementations of one interface, selected once by deployment
//! configuration rather than branched on inside handlers. Extraction is
//! purely physical; validating the token's contents is the codec's job.

use axum::http::{header, HeaderMap};

use crate::error::{Error, Result};

/// Pulls the opaque token string off a request, or signals its absence.
///
/// There is no anonymous mode: a missing credential is always
/// [`Error::MissingCredential`], never an implicit guest identity.
pub trait TokenExtractor: Send + Sync {
    fn extract(&self, headers: &HeaderMap) -> Result<String>;
}

/// Reads `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerHeaderExtractor;

impl TokenExtractor for BearerHeaderExtractor {
    fn extract(&self, headers: &HeaderMap) -> Result<String> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::MissingCredential)?;
        let (scheme, token) = value.split_once(' ').ok_or(Error::MissingCredential)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return Err(Error::MissingCredential);
        }
        Ok(token.to_string())
    }
}

/// Reads the token from a named cookie.
#[derive(Debug, Clone)]
pub struct SessionCookieExtractor {
    cookie_name: String,
}

impl SessionCookieExtractor {
    pub fn new(cookie_name: String) -> Self {
        Self { cookie_name }
    }
}

impl TokenExtractor for SessionCookieExtractor {
    fn extract(&self, headers: &HeaderMap) -> Result<String> {
        for value in headers.get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';') {
                if let Some((name, token)) = pair.split_once('=') {
                    if name.trim() == self.cookie_name && !token.trim().is_empty() {
                        return Ok(token.trim().to_string());
                    }
                }
            }
        }
        Err(Error::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn bearer_header_extracts_token() {
        let map = headers(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(BearerHeaderExtractor.extract(&map).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let map = headers(header::AUTHORIZATION, "bearer abc");
        assert_eq!(BearerHeaderExtractor.extract(&map).unwrap(), "abc");
    }

    #[test]
    fn missing_or_malformed_authorization_is_missing_credential() {
        for value in ["", "Bearer", "Bearer ", "Basic dXNlcjpwYXNz"] {
            let map = if value.is_empty() {
                HeaderMap::new()
            } else {
                headers(header::AUTHORIZATION, value)
            };
            assert!(matches!(
                BearerHeaderExtractor.extract(&map),
                Err(Error::MissingCredential)
            ));
        }
    }

    #[test]
    fn cookie_extractor_finds_named_cookie() {
        let extractor = SessionCookieExtractor::new("hce_session".to_string());
        let map = headers(header::COOKIE, "theme=dark; hce_session=tok123; lang=es");
        assert_eq!(extractor.extract(&map).unwrap(), "tok123");
    }

    #[test]
    fn absent_cookie_is_missing_credential_not_anonymous() {
        let extractor = SessionCookieExtractor::new("hce_session".to_string());
        let map = headers(header::COOKIE, "theme=dark");
        assert!(matches!(
            extractor.extract(&map),
            Err(Error::MissingCredential)
        ));
        assert!(matches!(
            extractor.extract(&HeaderMap::new()),
            Err(Error::MissingCredential)
        ));
    }
}
