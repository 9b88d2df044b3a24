//! Core types for the authentication core

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of roles known at deploy time.
///
/// Wire and storage form is kebab-case: `patient`, `clinician`,
/// `admissions-staff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Patient,
    Clinician,
    AdmissionsStaff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Clinician => "clinician",
            Role::AdmissionsStaff => "admissions-staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Role::Patient),
            "clinician" => Ok(Role::Clinician),
            "admissions-staff" => Ok(Role::AdmissionsStaff),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A role string outside the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// The set of roles permitted to pass a gate. Declared per route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    pub fn of(roles: &[Role]) -> Self {
        let mut set = Vec::with_capacity(roles.len());
        for role in roles {
            if !set.contains(role) {
                set.push(*role);
            }
        }
        RoleSet(set)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        RoleSet(vec![role])
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for role in &self.0 {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(role.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// An authenticated identity. Owned by the principal store; the core only
/// reads it for verification and lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// National document number, the store's primary key.
    pub document_id: i64,
    /// Identity key used for login and as the token subject.
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Request to register a principal. The plaintext password is hashed by the
/// authentication service before it reaches any store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrincipalRequest {
    pub document_id: i64,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
}

/// OAuth2 password-grant form accepted by the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// The principal's email.
    pub username: String,
    pub password: String,
}

/// Body returned by the login endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_form() {
        for role in [Role::Patient, Role::Clinician, Role::AdmissionsStaff] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("medic".parse::<Role>().is_err());
    }

    #[test]
    fn role_set_membership() {
        let set = RoleSet::of(&[Role::Clinician, Role::Patient, Role::Clinician]);
        assert!(set.contains(Role::Clinician));
        assert!(set.contains(Role::Patient));
        assert!(!set.contains(Role::AdmissionsStaff));
        assert_eq!(set.roles().len(), 2);
        assert_eq!(set.to_string(), "clinician|patient");
    }

    #[test]
    fn principal_serialization_omits_password_hash() {
        let principal = Principal {
            document_id: 1001,
            email: "p@example.com".to_string(),
            full_name: None,
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Patient,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&principal).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"patient\""));
    }
}
