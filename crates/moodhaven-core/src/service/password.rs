//! Password hashing abstraction.
//!
//! The concrete Argon2id implementation lives in moodhaven-infra; the
//! trait keeps `AuthService` free of crypto crate dependencies.

use moodhaven_types::error::AuthError;

/// Hashes and verifies user passwords.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing PHC string.
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a plaintext password against a stored PHC string.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
