//! Account service.
//!
//! Orchestrates the two credential mutations - Create and Update - as a
//! fixed sequence of gates: validate the field set, check email
//! uniqueness, prove the old password where one was supplied, hash, and
//! only then write through the record store. Every failure is a typed
//! [`AccountError`] and leaves the store untouched; the single write is
//! the last step of each operation.

mod error;
mod hash;
#[cfg(test)]
mod tests;

pub use error::AccountError;
pub use hash::{CredentialHasher, HashError, HasherConfig};

use tracing::{debug, instrument, warn};

use gatehouse_core::AccountId;

use crate::db::{AccountStore, RepositoryError};
use crate::models::account::{Account, AccountChanges, NewAccount};
use crate::validate::{CreateRequest, UpdateRequest, ValidCreate};

/// Account registration and profile/password update over a record store.
pub struct AccountService<S> {
    store: S,
    hasher: CredentialHasher,
}

impl<S: AccountStore> AccountService<S> {
    /// Create a service on a store and a configured hasher.
    pub const fn new(store: S, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    /// Register a new account.
    ///
    /// Validates the field set, rejects an already-claimed email, hashes
    /// the password, and inserts. The store assigns the id. The unique
    /// index on email is the source of truth: a concurrent registration
    /// that wins the race surfaces here as [`AccountError::DuplicateEmail`]
    /// even though the pre-check passed.
    ///
    /// # Errors
    ///
    /// [`AccountError::Validation`], [`AccountError::DuplicateEmail`],
    /// [`AccountError::Hash`], or [`AccountError::Store`].
    #[instrument(skip_all)]
    pub async fn create(&self, request: CreateRequest) -> Result<Account, AccountError> {
        let ValidCreate {
            name,
            email,
            password,
        } = request
            .validate()
            .inspect_err(|e| debug!(error = %e, "validation failed"))?;

        // Fast pre-check for a friendly error before the expensive hash.
        if self.store.find_by_email(&email).await?.is_some() {
            debug!(email = %email, "email already registered");
            return Err(AccountError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;

        let account = self
            .store
            .insert(NewAccount {
                name,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::DuplicateEmail,
                other => AccountError::Store(other),
            })?;

        debug!(id = %account.id, email = %account.email, "account created");
        Ok(account)
    }

    /// Update the account identified by `account_id`.
    ///
    /// The id comes from the caller's authenticated context, not from the
    /// submitted field set. Omitted fields keep their stored values; a
    /// password change must carry the matching old password (enforced by
    /// the validator) and that old password must verify against the
    /// stored hash.
    ///
    /// # Errors
    ///
    /// [`AccountError::Validation`], [`AccountError::NotFound`],
    /// [`AccountError::DuplicateEmail`] when the email belongs to a
    /// different account, [`AccountError::PasswordMismatch`],
    /// [`AccountError::Hash`], or [`AccountError::Store`].
    #[instrument(skip_all, fields(id = %account_id))]
    pub async fn update(
        &self,
        account_id: AccountId,
        request: UpdateRequest,
    ) -> Result<Account, AccountError> {
        let valid = request
            .validate()
            .inspect_err(|e| debug!(error = %e, "validation failed"))?;

        let current = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        // Only a *different* owner is a conflict; re-submitting the
        // current address is a no-op.
        if let Some(ref email) = valid.email
            && let Some(owner) = self.store.find_by_email(email).await?
            && owner.id != account_id
        {
            debug!(email = %email, "email already registered to another account");
            return Err(AccountError::DuplicateEmail);
        }

        if let Some(old_password) = valid.old_password
            && !self
                .verify_password(old_password, current.password_hash.clone())
                .await?
        {
            warn!("old password verification failed");
            return Err(AccountError::PasswordMismatch);
        }

        let password_hash = match valid.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let changes = AccountChanges {
            name: valid.name,
            email: valid.email,
            password_hash,
        };

        self.store
            .update(account_id, changes.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AccountError::DuplicateEmail,
                RepositoryError::NotFound => AccountError::NotFound,
                other => AccountError::Store(other),
            })?;

        debug!("account updated");
        Ok(Account {
            id: current.id,
            name: changes.name.unwrap_or(current.name),
            email: changes.email.unwrap_or(current.email),
            password_hash: changes.password_hash.unwrap_or(current.password_hash),
            created_at: current.created_at,
            updated_at: current.updated_at,
        })
    }

    /// Run the hasher on the blocking pool; hashing takes tens of
    /// milliseconds by design and must not stall unrelated tasks.
    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|_| HashError::TaskFailed)??;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, AccountError> {
        let hasher = self.hasher.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|_| HashError::TaskFailed)??;
        Ok(matches)
    }
}
