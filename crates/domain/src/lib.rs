//! Domain layer for the Event Board backend.
//!
//! This crate contains:
//! - Domain models (User, Event, Registration) and their form schemas
//! - The owner-only authorization check
//! - The registration workflow and the notifier seam it sends through

pub mod models;
pub mod services;
