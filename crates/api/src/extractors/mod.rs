//! Custom Axum extractors.

pub mod current_user;

pub use current_user::{is_safe_next, CurrentUser, OptionalUser};
