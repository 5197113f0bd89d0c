//! Request validation for account create and update.
//!
//! Validation is driven by declarative rule tables: each field carries a
//! requirement (always, optional, or required when another field is
//! present) and a list of checks. The cross-field conditions of the update
//! path - password required with `oldPassword`, `confirmPassword` required
//! and equal when `password` is present - live in [`UPDATE_RULES`] instead
//! of scattered branches.
//!
//! Validation is pure: it looks only at the submitted field set, never at
//! persisted state, and yields either a typed request or a
//! [`ValidationError`] naming the failed rule.

use core::fmt;

use serde::Deserialize;
use thiserror::Error;

use gatehouse_core::{Email, EmailError};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A field of the create/update request surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    OldPassword,
    Password,
    ConfirmPassword,
}

impl Field {
    /// Wire name of the field, as the transport layer submits it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::OldPassword => "oldPassword",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed validation rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid field {field}: {reason}")]
pub struct ValidationError {
    /// Wire name of the field that failed.
    pub field: &'static str,
    /// Human-readable description of the failed rule.
    pub reason: String,
}

impl ValidationError {
    fn missing(field: Field) -> Self {
        Self {
            field: field.as_str(),
            reason: "is required".to_owned(),
        }
    }

    fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            reason: reason.into(),
        }
    }
}

impl From<EmailError> for ValidationError {
    fn from(e: EmailError) -> Self {
        Self::invalid(Field::Email, e.to_string())
    }
}

/// When a field must be present.
enum Requirement {
    /// Field is always required.
    Always,
    /// Field may be omitted.
    Optional,
    /// Field is required when the named field was submitted.
    IfPresent(Field),
}

/// A check applied to a submitted value.
enum Check {
    /// Value must not be the empty string.
    NonEmpty,
    /// Value must parse as an [`Email`].
    ValidEmail,
    /// Value must be at least this many bytes.
    MinLen(usize),
    /// Value must equal the named field. Passes when that field was not
    /// submitted; the value is simply unused then.
    Equals(Field),
}

struct Rule {
    field: Field,
    requirement: Requirement,
    checks: &'static [Check],
}

/// Create mode: all three fields required.
const CREATE_RULES: &[Rule] = &[
    Rule {
        field: Field::Name,
        requirement: Requirement::Always,
        checks: &[Check::NonEmpty],
    },
    Rule {
        field: Field::Email,
        requirement: Requirement::Always,
        checks: &[Check::ValidEmail],
    },
    Rule {
        field: Field::Password,
        requirement: Requirement::Always,
        checks: &[Check::MinLen(MIN_PASSWORD_LENGTH)],
    },
];

/// Update mode: everything optional individually, conditions across fields.
const UPDATE_RULES: &[Rule] = &[
    Rule {
        field: Field::Name,
        requirement: Requirement::Optional,
        checks: &[],
    },
    Rule {
        field: Field::Email,
        requirement: Requirement::Optional,
        checks: &[Check::ValidEmail],
    },
    Rule {
        field: Field::OldPassword,
        requirement: Requirement::Optional,
        checks: &[Check::MinLen(MIN_PASSWORD_LENGTH)],
    },
    Rule {
        field: Field::Password,
        requirement: Requirement::IfPresent(Field::OldPassword),
        checks: &[Check::MinLen(MIN_PASSWORD_LENGTH)],
    },
    Rule {
        field: Field::ConfirmPassword,
        requirement: Requirement::IfPresent(Field::Password),
        checks: &[Check::Equals(Field::Password)],
    },
];

/// Access to submitted fields by [`Field`] tag.
trait FieldSet {
    fn get(&self, field: Field) -> Option<&str>;
}

fn check_rules(set: &impl FieldSet, rules: &[Rule]) -> Result<(), ValidationError> {
    for rule in rules {
        let required = match rule.requirement {
            Requirement::Always => true,
            Requirement::Optional => false,
            Requirement::IfPresent(other) => set.get(other).is_some(),
        };

        let Some(value) = set.get(rule.field) else {
            if required {
                return Err(ValidationError::missing(rule.field));
            }
            continue;
        };

        for check in rule.checks {
            apply_check(check, rule.field, value, set)?;
        }
    }

    Ok(())
}

fn apply_check(
    check: &Check,
    field: Field,
    value: &str,
    set: &impl FieldSet,
) -> Result<(), ValidationError> {
    match check {
        Check::NonEmpty => {
            if value.is_empty() {
                return Err(ValidationError::invalid(field, "must not be empty"));
            }
        }
        Check::ValidEmail => {
            Email::parse(value).map_err(|e| ValidationError::invalid(field, e.to_string()))?;
        }
        Check::MinLen(min) => {
            if value.len() < *min {
                return Err(ValidationError::invalid(
                    field,
                    format!("must be at least {min} characters"),
                ));
            }
        }
        Check::Equals(other) => {
            if let Some(expected) = set.get(*other)
                && expected != value
            {
                return Err(ValidationError::invalid(field, format!("must match {other}")));
            }
        }
    }

    Ok(())
}

/// Raw field set for account creation, as submitted by the caller.
///
/// Every field is optional at this level; the create rules enforce
/// presence. `Debug` redacts the password.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for CreateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A create request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidCreate {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl CreateRequest {
    /// Validate against the create rules and parse the typed fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first rule that failed.
    pub fn validate(self) -> Result<ValidCreate, ValidationError> {
        check_rules(&self, CREATE_RULES)?;

        match (self.name, self.email, self.password) {
            (Some(name), Some(email), Some(password)) => Ok(ValidCreate {
                name,
                email: Email::parse(&email)?,
                password,
            }),
            // unreachable: the create rules require all three fields
            _ => Err(ValidationError::missing(Field::Name)),
        }
    }
}

impl FieldSet for CreateRequest {
    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Password => self.password.as_deref(),
            Field::OldPassword | Field::ConfirmPassword => None,
        }
    }
}

/// Raw field set for account update. `Debug` redacts all password fields.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub old_password: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("UpdateRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("old_password", &redact(&self.old_password))
            .field("password", &redact(&self.password))
            .field("confirm_password", &redact(&self.confirm_password))
            .finish()
    }
}

/// An update request that passed validation.
///
/// `confirm_password` is consumed by validation; by the time this type
/// exists it is known to match `password`.
#[derive(Debug, Clone)]
pub struct ValidUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub old_password: Option<String>,
    pub password: Option<String>,
}

impl UpdateRequest {
    /// Validate against the update rules and parse the typed fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first rule that failed.
    pub fn validate(self) -> Result<ValidUpdate, ValidationError> {
        check_rules(&self, UPDATE_RULES)?;

        let email = match self.email {
            Some(raw) => Some(Email::parse(&raw)?),
            None => None,
        };

        Ok(ValidUpdate {
            name: self.name,
            email,
            old_password: self.old_password,
            password: self.password,
        })
    }
}

impl FieldSet for UpdateRequest {
    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::OldPassword => self.old_password.as_deref(),
            Field::Password => self.password.as_deref(),
            Field::ConfirmPassword => self.confirm_password.as_deref(),
        }
    }
}
