//! Shared utilities for the Event Board backend.
//!
//! - Password hashing with Argon2id
//! - Signed session tokens
//! - Form-field validation helpers

pub mod jwt;
pub mod password;
pub mod validation;
