//! Account domain types.
//!
//! These are validated domain objects, separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gatehouse_core::{AccountId, Email};

/// A persisted user account.
///
/// `password_hash` is the Argon2id digest of the account password, never
/// the plaintext. It is skipped on serialization so the account can be
/// handed back to the transport layer as-is.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Store-assigned unique id, immutable after creation.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Unique account identifier.
    pub email: Email,
    /// Argon2id digest in PHC string format.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Fields of an account about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
}

/// Partial update of an account. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub password_hash: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_omits_password_hash() {
        let account = Account {
            id: AccountId::new(1),
            name: "Ann".to_owned(),
            email: Email::parse("ann@x.com").unwrap(),
            password_hash: "$argon2id$not-a-real-digest".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["email"], "ann@x.com");
    }
}
