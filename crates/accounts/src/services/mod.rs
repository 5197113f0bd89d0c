//! Business logic services.
//!
//! - `accounts` - account registration and profile/password update

pub mod accounts;
