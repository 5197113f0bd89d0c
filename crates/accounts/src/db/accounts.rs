//! `PostgreSQL`-backed account store.
//!
//! Queries are runtime-checked (`sqlx::query_as`) so the crate builds
//! without a live database; the seam is covered by the in-memory store in
//! the service tests and the schema by the embedded migrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatehouse_core::{AccountId, Email};

use super::{AccountStore, RepositoryError};
use crate::models::account::{Account, AccountChanges, NewAccount};

/// [`AccountStore`] implementation on a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a store on an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape of the `accounts` table.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            name: row.name,
            email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, created_at, updated_at
             FROM accounts
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, email, password_hash, created_at, updated_at
             FROM accounts
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "INSERT INTO accounts (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, name, email, password_hash, created_at, updated_at",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Account::try_from(row)
    }

    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE accounts
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 password_hash = COALESCE($4, password_hash),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
