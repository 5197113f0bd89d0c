//! Gatehouse Core - Shared types library.
//!
//! Common types used by the Gatehouse account service. This crate contains
//! only types - no I/O, no database access - so it can be used anywhere,
//! including in code that never touches a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for account ids and email addresses
//!
//! The optional `postgres` feature adds `sqlx` `Type`/`Encode`/`Decode`
//! implementations so the newtypes bind directly in queries.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
