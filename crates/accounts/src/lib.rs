//! Gatehouse accounts - credential lifecycle for user accounts.
//!
//! This crate implements account registration and profile/password update:
//! request validation, email uniqueness, Argon2id password hashing, and
//! persistence through a pluggable record store. The HTTP transport that
//! feeds it requests is out of scope; callers hand in raw field sets and
//! get back a sanitized [`models::account::Account`] or one typed error.
//!
//! # Modules
//!
//! - [`validate`] - rule-table validation of create/update field sets
//! - [`db`] - the [`db::AccountStore`] seam and its `PostgreSQL` adapter
//! - [`services`] - the account service orchestrating both operations
//! - [`config`] - environment-driven configuration
//! - [`models`] - domain types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod validate;
