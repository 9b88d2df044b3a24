//! Role-based access gate
//!
//! A route declares the roles permitted to invoke it by constructing a
//! [`RoleGate`] at registration time; the gate is a plain value, so it is
//! unit-testable without any route machinery. The check is pure set
//! membership; finer-grained "owns this record" decisions belong to the
//! calling operation, not here.

use axum::http::HeaderMap;

use crate::error::{Error, Result};
use crate::session::SessionResolver;
use crate::types::{Principal, RoleSet};

#[derive(Clone)]
pub struct RoleGate {
    resolver: SessionResolver,
    allowed: RoleSet,
}

impl RoleGate {
    /// Gate that admits principals whose role is in `allowed`.
    pub fn require(resolver: SessionResolver, allowed: impl Into<RoleSet>) -> Self {
        Self {
            resolver,
            allowed: allowed.into(),
        }
    }

    pub fn allowed(&self) -> &RoleSet {
        &self.allowed
    }

    /// Resolve the session and enforce role membership.
    ///
    /// Resolver rejections pass through unchanged (`Unauthenticated`); a
    /// resolved principal outside the set is `Forbidden`: the caller is
    /// known, just not privileged.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Principal> {
        let principal = self.resolver.resolve(headers).await?;
        if !self.allowed.contains(principal.role) {
            tracing::debug!(
                subject = %principal.email,
                role = %principal.role,
                required = %self.allowed,
                "access forbidden"
            );
            return Err(Error::Forbidden {
                required: self.allowed.clone(),
            });
        }
        Ok(principal)
    }
}
