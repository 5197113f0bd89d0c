//! Persistence for accounts `PostgreSQL`.
//!
//! The record store is a collaborator, not part of the core: the
//! [`AccountStore`] trait carries exactly the contract the account service
//! needs, and [`PgAccountStore`] implements it with `sqlx`. Tests exercise
//! the service against an in-memory store instead.
//!
//! # Tables
//!
//! - `accounts` - id, name, email (UNIQUE), password_hash, timestamps
//!
//! The `UNIQUE` index on email is the source of truth for uniqueness; the
//! service-level lookup only exists to produce a friendly error before the
//! expensive hashing step. Migrations live in `crates/accounts/migrations/`
//! and are embedded via [`run_migrations`].

pub mod accounts;

pub use accounts::PgAccountStore;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use gatehouse_core::{AccountId, Email};

use crate::models::account::{Account, AccountChanges, NewAccount};

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (the unique email index).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// The record store contract the account service operates against.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by email, `None` when the address is unclaimed.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Insert a new account; the store assigns the id.
    ///
    /// A duplicate email must fail with [`RepositoryError::Conflict`].
    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Apply a partial update; `None` fields keep their stored value.
    ///
    /// An email claimed by another account must fail with
    /// [`RepositoryError::Conflict`]; an unknown id with
    /// [`RepositoryError::NotFound`].
    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<S: AccountStore> AccountStore for std::sync::Arc<S> {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        (**self).insert(account).await
    }

    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<(), RepositoryError> {
        (**self).update(id, changes).await
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
