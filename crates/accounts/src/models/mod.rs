//! Domain models for the account service.

pub mod account;
