//! HTTP route handlers.

pub mod accounts;
pub mod events;
pub mod health;
