//! Persistence layer for the Event Board backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - SQL migrations, embedded by the api binary at startup

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
