//! Port for password hashing.

use crate::domain::Password;

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing a password.
    pub enum PasswordHasherError {
        /// The hasher could not produce an encoding.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// One-way password encoding.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Encode `password` with a fresh salt.
    fn hash(&self, password: &Password) -> Result<String, PasswordHasherError>;

    /// Whether `password` matches `encoded`. Malformed encodings never match.
    fn verify(&self, password: &Password, encoded: &str) -> bool;
}
