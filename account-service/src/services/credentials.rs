//! PIN hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// PIN supplied by a caller. Debug output is redacted.
#[derive(Clone)]
pub struct Pin(String);

impl Pin {
    pub fn new(pin: impl Into<String>) -> Self {
        Self(pin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pin(***)")
    }
}

/// Newtype for a stored PIN hash (PHC string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinHash(String);

impl PinHash {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to hash PIN: {0}")]
    Hash(String),

    #[error("Invalid PIN hash format: {0}")]
    InvalidHash(String),
}

/// One-way hash with a matching verifier.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, pin: &Pin) -> Result<PinHash, CredentialError>;

    /// `Ok(false)` on a mismatch; `Err` only when the stored hash is unusable.
    fn verify(&self, pin: &Pin, hash: &PinHash) -> Result<bool, CredentialError>;
}

/// Argon2id hashing. Salt is generated per hash and embedded in the output.
#[derive(Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, pin: &Pin) -> Result<PinHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(pin.as_str().as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .to_string();

        Ok(PinHash::new(hash))
    }

    fn verify(&self, pin: &Pin, hash: &PinHash) -> Result<bool, CredentialError> {
        let parsed_hash = PasswordHash::new(hash.as_str())
            .map_err(|e| CredentialError::InvalidHash(e.to_string()))?;

        // Cost parameters come from the stored hash, not from `self`.
        match self
            .argon2
            .verify_password(pin.as_str().as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::InvalidHash(e.to_string())),
        }
    }
}
