//! Port for the password hashing primitive.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// One-way password hashing with verification.
///
/// A mismatched password is `Ok(false)`; errors are reserved for failures of
/// the primitive itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, PasswordHasherError>;

    async fn verify(&self, password: &str, encoded: &str) -> Result<bool, PasswordHasherError>;
}
