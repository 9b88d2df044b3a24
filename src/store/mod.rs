//! Principal storage
//!
//! The authentication core is read-only over principals: it looks them up by
//! identity key during login and session resolution, and never mutates them.
//! `create` exists for registration flows and test fixtures; the plaintext
//! password never reaches a store, only the finished digest does.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::types::{Principal, Role};

/// A principal ready for insertion, password already hashed.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub document_id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Look up a principal by its identity key. `Ok(None)` means unknown.
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>>;

    /// Insert a new principal. A duplicate identity key is
    /// [`Error::PrincipalExists`].
    async fn create(&self, new: NewPrincipal) -> Result<Principal>;
}

/// SQLite-backed store. Creates its table on first connection.
#[derive(Clone)]
pub struct SqlitePrincipalStore {
    pool: SqlitePool,
}

impl SqlitePrincipalStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS principal (
                document_id   INTEGER PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                full_name     TEXT,
                password_hash TEXT NOT NULL,
                role          TEXT NOT NULL,
                created_at    TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn principal_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Principal> {
        let email: String = row.try_get("email")?;
        let role_text: String = row.try_get("role")?;
        let role = Role::from_str(&role_text).map_err(|e| {
            // Stored role outside the closed enumeration: surface as an
            // integrity conflict, never silently reinterpret.
            Error::Conflict(format!("principal {email}: {e}"))
        })?;
        Ok(Principal {
            document_id: row.try_get("document_id")?,
            email,
            full_name: row.try_get("full_name")?,
            password_hash: row.try_get("password_hash")?,
            role,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl PrincipalStore for SqlitePrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        let row = sqlx::query(
            "SELECT document_id, email, full_name, password_hash, role, created_at \
             FROM principal WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::principal_from_row).transpose()
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO principal (document_id, email, full_name, password_hash, role, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.document_id)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Principal {
                document_id: new.document_id,
                email: new.email,
                full_name: new.full_name,
                password_hash: new.password_hash,
                role: new.role,
                created_at,
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::PrincipalExists(new.email))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and fixtures.
#[derive(Default)]
pub struct MemoryPrincipalStore {
    by_email: RwLock<HashMap<String, Principal>>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        Ok(self.by_email.read().get(email).cloned())
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal> {
        let mut map = self.by_email.write();
        if map.contains_key(&new.email) {
            return Err(Error::PrincipalExists(new.email));
        }
        let principal = Principal {
            document_id: new.document_id,
            email: new.email.clone(),
            full_name: new.full_name,
            password_hash: new.password_hash,
            role: new.role,
            created_at: Utc::now(),
        };
        map.insert(new.email, principal.clone());
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(email: &str, document_id: i64) -> NewPrincipal {
        NewPrincipal {
            document_id,
            email: email.to_string(),
            full_name: Some("Ana María Rojas".to_string()),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::Clinician,
        }
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryPrincipalStore::new();
        store.create(sample("ana@clinic.example", 1001)).await.unwrap();

        let found = store.find_by_email("ana@clinic.example").await.unwrap();
        assert_eq!(found.unwrap().document_id, 1001);
        assert!(store.find_by_email("nadie@clinic.example").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_email() {
        let store = MemoryPrincipalStore::new();
        store.create(sample("ana@clinic.example", 1001)).await.unwrap();

        let err = store.create(sample("ana@clinic.example", 1002)).await.unwrap_err();
        assert!(matches!(err, Error::PrincipalExists(email) if email == "ana@clinic.example"));
    }
}
