//! Port for turning accepted plaintext passwords into stored digests.
//!
//! Hashing algorithms and their tuning live with the authentication stack;
//! the registration core only guarantees that plaintext never reaches the
//! user-record store.

use async_trait::async_trait;

use crate::domain::profile::Password;
use crate::domain::user::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// The hasher failed to produce a digest.
        Failed {
            /// Adapter-supplied detail.
            message: String,
        } => "password hashing failed: {message}",
    }
}

/// Password hashing collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a digest for `password`.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;
}
