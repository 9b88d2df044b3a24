//! Password hashing with Argon2
//!
//! Hashing is the slow, CPU-bound part of authentication by design. Callers
//! on an async runtime should run [`CredentialHasher::verify`] under
//! `spawn_blocking`; the authentication service does exactly that.

use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};

use crate::config::PasswordConfig;
use crate::error::{Error, Result};

/// One-way password hasher and verifier.
///
/// The PHC output string embeds algorithm, parameters and salt, so a digest
/// is self-contained and verifiable without any side storage.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Digest of an unused password, verified against when a login targets
    /// an unknown identity so both failure paths cost the same.
    dummy_digest: String,
}

impl CredentialHasher {
    pub fn new(config: &PasswordConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| Error::Config(format!("invalid argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_digest = argon2
            .hash_password(b"decoy-password-never-accepted", &salt)
            .map_err(|e| Error::PasswordHash(e.to_string()))?
            .to_string();

        Ok(Self {
            argon2,
            dummy_digest,
        })
    }

    /// Hash a plaintext password into a self-contained PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;
        Ok(digest.to_string())
    }

    /// Check a plaintext against a stored digest.
    ///
    /// Wrong passwords and digests that do not parse as PHC strings both
    /// yield `false`; this never errors.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burn one verification against the decoy digest. Used to equalize the
    /// unknown-identity login path with the wrong-password path.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_digest);
    }
}
