//! Password hashing with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PhcError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

/// Errors from the credential hasher.
///
/// A wrong password is not an error; [`CredentialHasher::verify`] reports
/// it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum HashError {
    /// The configured work factor is outside Argon2's accepted range.
    #[error("invalid hasher parameters: {0}")]
    Params(String),

    /// Hashing itself failed.
    #[error("failed to hash password")]
    Hash,

    /// The stored digest is not a valid PHC string.
    #[error("stored digest is malformed")]
    MalformedDigest,

    /// The blocking task running the hash did not complete.
    #[error("hashing task failed to complete")]
    TaskFailed,
}

/// Argon2id work factor. Higher costs slow offline brute force at the
/// price of CPU and memory per hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of iterations.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            m_cost: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way, salted, adaptive password hasher (Argon2id).
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl core::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Create a hasher with the given work factor.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Params`] if the costs are outside the range
    /// Argon2 accepts.
    pub fn new(config: HasherConfig) -> Result<Self, HashError> {
        let params = Params::new(config.m_cost, config.t_cost, config.p_cost, None)
            .map_err(|e| HashError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Two calls with the same password produce distinct digests; only
    /// [`verify`](Self::verify) relates a digest back to its input.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Hash`] if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| HashError::Hash)
    }

    /// Check a candidate password against a stored digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::MalformedDigest`] if the digest cannot be
    /// parsed or verified for reasons other than a wrong password.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(digest).map_err(|_| HashError::MalformedDigest)?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(_) => Err(HashError::MalformedDigest),
        }
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Minimal work factor; these tests exercise correctness, not cost.
    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HasherConfig {
            m_cost: 8,
            t_cost: 1,
            p_cost: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = fast_hasher();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &first).unwrap());
        assert!(hasher.verify("secret1", &second).unwrap());
    }

    #[test]
    fn test_digest_is_not_the_plaintext() {
        let hasher = fast_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert_ne!(digest, "secret1");
        assert!(!digest.contains("secret1"));
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let hasher = fast_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert!(!hasher.verify("secret2", &digest).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.verify("secret1", "not-a-phc-string"),
            Err(HashError::MalformedDigest)
        ));
    }

    #[test]
    fn test_rejects_out_of_range_parameters() {
        let result = CredentialHasher::new(HasherConfig {
            m_cost: 0,
            t_cost: 0,
            p_cost: 0,
        });
        assert!(matches!(result, Err(HashError::Params(_))));
    }
}
