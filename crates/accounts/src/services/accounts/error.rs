//! Account service error types.

use thiserror::Error;

use super::hash::HashError;
use crate::db::RepositoryError;
use crate::validate::ValidationError;

/// Errors that can occur during account create and update.
///
/// Every variant is terminal for the current operation; nothing is retried
/// and no partial mutation is left behind.
#[derive(Debug, Error)]
pub enum AccountError {
    /// A submitted field failed a validation rule.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The email is already claimed by another account.
    #[error("email already in use")]
    DuplicateEmail,

    /// The supplied old password does not match the stored hash.
    #[error("password does not match")]
    PasswordMismatch,

    /// No account with the given id (update only).
    #[error("account not found")]
    NotFound,

    /// The credential hasher failed.
    #[error("credential hashing failed: {0}")]
    Hash(#[from] HashError),

    /// Record store failure, passed through unchanged.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}
