//! Password hashing schemes.
//!
//! Two interchangeable [`PasswordHasher`] implementations:
//! - [`Argon2Hasher`]: salted Argon2id PHC strings (default).
//! - [`Sha256Hasher`]: unsalted SHA-256 rendered as lowercase hex, kept for
//!   digests produced by the legacy deployment.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{DomainError, DomainResult};

/// One-way password digest used at registration (store) and login (compare).
pub trait PasswordHasher: Send + Sync {
    /// Scheme this hasher produces.
    fn scheme(&self) -> PasswordScheme;

    /// Digest a plaintext password for storage.
    fn hash(&self, plain_text: &str) -> DomainResult<String>;

    /// Check a plaintext password against a stored digest.
    fn verify(&self, plain_text: &str, digest: &str) -> bool;

    /// A well-formed digest no password matches. Verifying against it costs
    /// the same as a real verification.
    fn decoy_digest(&self) -> &str;
}

/// Supported password hashing schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Argon2,
    Sha256,
}

impl PasswordScheme {
    /// Build the hasher for this scheme.
    pub fn hasher(self) -> Arc<dyn PasswordHasher> {
        match self {
            PasswordScheme::Argon2 => Arc::new(Argon2Hasher),
            PasswordScheme::Sha256 => Arc::new(Sha256Hasher),
        }
    }

    /// Recognize the scheme that produced a stored digest.
    pub fn detect(digest: &str) -> Option<Self> {
        if digest.starts_with("$argon2") {
            Some(PasswordScheme::Argon2)
        } else if digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(PasswordScheme::Sha256)
        } else {
            None
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(PasswordScheme::Argon2),
            "sha256" => Ok(PasswordScheme::Sha256),
            other => Err(DomainError::validation(format!(
                "Unknown password scheme: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordScheme::Argon2 => write!(f, "argon2"),
            PasswordScheme::Sha256 => write!(f, "sha256"),
        }
    }
}

// =============================================================================
// Argon2id
// =============================================================================

/// Salted Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn scheme(&self) -> PasswordScheme {
        PasswordScheme::Argon2
    }

    fn hash(&self, plain_text: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::password(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plain_text: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }

    fn decoy_digest(&self) -> &str {
        static DECOY: OnceLock<String> = OnceLock::new();
        DECOY.get_or_init(|| {
            self.hash("decoy-password-never-issued")
                .unwrap_or_else(|_| String::from("$argon2id$v=19$m=19456,t=2,p=1$"))
        })
    }
}

// =============================================================================
// SHA-256 (legacy)
// =============================================================================

/// Unsalted SHA-256 hasher producing 64 lowercase hex characters.
///
/// Deterministic: equal passwords always produce equal digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    fn digest(plain_text: &str) -> String {
        hex::encode(Sha256::digest(plain_text.as_bytes()))
    }
}

impl PasswordHasher for Sha256Hasher {
    fn scheme(&self) -> PasswordScheme {
        PasswordScheme::Sha256
    }

    fn hash(&self, plain_text: &str) -> DomainResult<String> {
        Ok(Self::digest(plain_text))
    }

    fn verify(&self, plain_text: &str, digest: &str) -> bool {
        let computed = Self::digest(plain_text);
        computed.as_bytes().ct_eq(digest.as_bytes()).into()
    }

    fn decoy_digest(&self) -> &str {
        "0000000000000000000000000000000000000000000000000000000000000000"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_is_deterministic_lowercase_hex() {
        let hasher = Sha256Hasher;
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_sha256_known_vector() {
        // sha256("abc")
        assert_eq!(
            Sha256Hasher.hash("abc").unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_different_inputs_differ() {
        let hasher = Sha256Hasher;
        assert_ne!(hasher.hash("secret1").unwrap(), hasher.hash("secret2").unwrap());
    }

    #[test]
    fn test_sha256_verify() {
        let hasher = Sha256Hasher;
        let digest = hasher.hash("secret1").unwrap();

        assert!(hasher.verify("secret1", &digest));
        assert!(!hasher.verify("wrong12", &digest));
        assert!(!hasher.verify("secret1", "short"));
        assert!(!hasher.verify("secret1", hasher.decoy_digest()));
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = Argon2Hasher;
        let digest = hasher.hash("SecurePassword123!").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("SecurePassword123!", &digest));
        assert!(!hasher.verify("WrongPassword123", &digest));
    }

    #[test]
    fn test_argon2_same_password_different_salts() {
        let hasher = Argon2Hasher;
        let first = hasher.hash("SamePassword123").unwrap();
        let second = hasher.hash("SamePassword123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("SamePassword123", &first));
        assert!(hasher.verify("SamePassword123", &second));
    }

    #[test]
    fn test_argon2_rejects_garbage_digest() {
        let hasher = Argon2Hasher;
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("anything", hasher.decoy_digest()));
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("argon2".parse::<PasswordScheme>().unwrap(), PasswordScheme::Argon2);
        assert_eq!("SHA256".parse::<PasswordScheme>().unwrap(), PasswordScheme::Sha256);
        assert!("md5".parse::<PasswordScheme>().is_err());
        assert_eq!(PasswordScheme::Sha256.hasher().scheme(), PasswordScheme::Sha256);
    }

    #[test]
    fn test_scheme_detection() {
        let sha = Sha256Hasher.hash("secret1").unwrap();
        let argon = Argon2Hasher.hash("secret1").unwrap();

        assert_eq!(PasswordScheme::detect(&sha), Some(PasswordScheme::Sha256));
        assert_eq!(PasswordScheme::detect(&argon), Some(PasswordScheme::Argon2));
        assert_eq!(PasswordScheme::detect("plaintext"), None);
    }
}
