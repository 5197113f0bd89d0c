//! Service-level tests against an in-memory record store.
//!
//! The store counts every call so the tests can assert that invalid
//! requests never reach persistence and that failed operations leave no
//! partial mutation behind.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use gatehouse_core::{AccountId, Email};

use super::{AccountError, AccountService, CredentialHasher, HasherConfig};
use crate::db::{AccountStore, RepositoryError};
use crate::models::account::{Account, AccountChanges, NewAccount};
use crate::validate::{CreateRequest, UpdateRequest};

fn fast_hasher() -> CredentialHasher {
    CredentialHasher::new(HasherConfig {
        m_cost: 8,
        t_cost: 1,
        p_cost: 1,
    })
    .unwrap()
}

#[derive(Default)]
struct MemoryStore {
    accounts: Mutex<Vec<Account>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    fn snapshot(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seed(&self, id: i32, name: &str, email: &str, password_hash: &str) -> AccountId {
        let id = AccountId::new(id);
        let now = Utc::now();
        self.accounts.lock().unwrap().push(Account {
            id,
            name: name.to_owned(),
            email: Email::parse(email).unwrap(),
            password_hash: password_hash.to_owned(),
            created_at: now,
            updated_at: now,
        });
        id
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();

        if accounts.iter().any(|a| a.email == account.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let next_id = accounts.iter().map(|a| a.id.as_i32()).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let created = Account {
            id: AccountId::new(next_id),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            created_at: now,
            updated_at: now,
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();

        if let Some(ref email) = changes.email
            && accounts.iter().any(|a| a.email == *email && a.id != id)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let Some(account) = accounts.iter_mut().find(|a| a.id == id) else {
            return Err(RepositoryError::NotFound);
        };

        if let Some(name) = changes.name {
            account.name = name;
        }
        if let Some(email) = changes.email {
            account.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            account.password_hash = password_hash;
        }
        account.updated_at = Utc::now();
        Ok(())
    }
}

/// A store whose email lookup never hits, simulating the losing side of a
/// concurrent registration race: the pre-check passes, the unique index
/// still rejects the insert.
struct RacingStore(MemoryStore);

#[async_trait]
impl AccountStore for RacingStore {
    async fn find_by_email(&self, _email: &Email) -> Result<Option<Account>, RepositoryError> {
        Ok(None)
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        self.0.find_by_id(id).await
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        self.0.insert(account).await
    }

    async fn update(&self, id: AccountId, changes: AccountChanges) -> Result<(), RepositoryError> {
        self.0.update(id, changes).await
    }
}

fn service() -> (Arc<MemoryStore>, AccountService<Arc<MemoryStore>>) {
    let store = Arc::new(MemoryStore::default());
    let service = AccountService::new(Arc::clone(&store), fast_hasher());
    (store, service)
}

fn create_request(name: &str, email: &str, password: &str) -> CreateRequest {
    CreateRequest {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
        password: Some(password.to_owned()),
    }
}

#[tokio::test]
async fn test_create_assigns_id_and_hashes_password() {
    let (_, service) = service();

    let account = service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(account.id, AccountId::new(1));
    assert_eq!(account.name, "Ann");
    assert_eq!(account.email.as_str(), "ann@x.com");
    assert_ne!(account.password_hash, "secret1");
    assert!(
        fast_hasher()
            .verify("secret1", &account.password_hash)
            .unwrap()
    );
}

#[tokio::test]
async fn test_create_duplicate_email_fails_without_insert() {
    let (store, service) = service();

    service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();

    let err = service
        .create(create_request("Bea", "ann@x.com", "secret2"))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::DuplicateEmail));
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn test_create_invalid_input_never_touches_store() {
    let (store, service) = service();

    let err = service
        .create(CreateRequest {
            name: Some("Ann".to_owned()),
            email: Some("ann@x.com".to_owned()),
            password: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::Validation(_)));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_create_lost_race_surfaces_as_duplicate_email() {
    let store = RacingStore(MemoryStore::default());
    store.0.seed(1, "Ann", "ann@x.com", "$argon2id$placeholder");
    let service = AccountService::new(store, fast_hasher());

    let err = service
        .create(create_request("Bea", "ann@x.com", "secret2"))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::DuplicateEmail));
}

#[tokio::test]
async fn test_update_name_only_keeps_email_and_password() {
    let (store, service) = service();
    let created = service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();

    let updated = service
        .update(
            created.id,
            UpdateRequest {
                name: Some("Ann Smith".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Ann Smith");
    assert_eq!(updated.email.as_str(), "ann@x.com");
    assert_eq!(updated.password_hash, created.password_hash);

    let stored = store.snapshot().into_iter().next().unwrap();
    assert_eq!(stored.name, "Ann Smith");
    assert_eq!(stored.email.as_str(), "ann@x.com");
    assert_eq!(stored.password_hash, created.password_hash);
}

#[tokio::test]
async fn test_update_wrong_old_password_leaves_record_unchanged() {
    let (store, service) = service();
    let created = service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();

    let err = service
        .update(
            created.id,
            UpdateRequest {
                old_password: Some("wrong-password".to_owned()),
                password: Some("secret2".to_owned()),
                confirm_password: Some("secret2".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::PasswordMismatch));

    let stored = store.snapshot().into_iter().next().unwrap();
    assert_eq!(stored.password_hash, created.password_hash);
    assert!(fast_hasher().verify("secret1", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn test_update_missing_confirmation_fails_before_store_access() {
    let (store, service) = service();
    let created = service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();
    let calls_before = store.call_count();

    let err = service
        .update(
            created.id,
            UpdateRequest {
                old_password: Some("secret1".to_owned()),
                password: Some("secret2".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::Validation(_)));
    assert_eq!(store.call_count(), calls_before);
}

#[tokio::test]
async fn test_update_mismatched_confirmation_fails_before_store_access() {
    let (store, service) = service();
    let created = service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();
    let calls_before = store.call_count();

    let err = service
        .update(
            created.id,
            UpdateRequest {
                old_password: Some("secret1".to_owned()),
                password: Some("secret2".to_owned()),
                confirm_password: Some("different".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::Validation(_)));
    assert_eq!(store.call_count(), calls_before);
}

#[tokio::test]
async fn test_update_rotates_password() {
    let (store, service) = service();
    let hasher = fast_hasher();
    let id = store.seed(5, "Ann", "ann@x.com", &hasher.hash("secret1").unwrap());

    let updated = service
        .update(
            id,
            UpdateRequest {
                old_password: Some("secret1".to_owned()),
                password: Some("secret2".to_owned()),
                confirm_password: Some("secret2".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(hasher.verify("secret2", &updated.password_hash).unwrap());
    assert!(!hasher.verify("secret1", &updated.password_hash).unwrap());

    let stored = store.snapshot().into_iter().next().unwrap();
    assert_eq!(stored.password_hash, updated.password_hash);
}

#[tokio::test]
async fn test_update_email_claimed_by_other_account_conflicts() {
    let (store, service) = service();
    store.seed(1, "Ann", "ann@x.com", "$argon2id$placeholder");
    let id = store.seed(2, "Bea", "bea@x.com", "$argon2id$placeholder");

    let err = service
        .update(
            id,
            UpdateRequest {
                email: Some("ann@x.com".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::DuplicateEmail));
    let bea = store.snapshot().into_iter().find(|a| a.id == id).unwrap();
    assert_eq!(bea.email.as_str(), "bea@x.com");
}

#[tokio::test]
async fn test_update_resubmitting_own_email_is_allowed() {
    let (_, service) = service();
    let created = service
        .create(create_request("Ann", "ann@x.com", "secret1"))
        .await
        .unwrap();

    let updated = service
        .update(
            created.id,
            UpdateRequest {
                email: Some("ann@x.com".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.email.as_str(), "ann@x.com");
}

#[tokio::test]
async fn test_update_unknown_account_is_not_found() {
    let (_, service) = service();

    let err = service
        .update(
            AccountId::new(99),
            UpdateRequest {
                name: Some("Nobody".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::NotFound));
}
