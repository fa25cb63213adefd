//! Application services and external integrations.

pub mod accounts;
pub mod cookies;
pub mod email;

pub use accounts::{AccountError, AccountService};
pub use cookies::CookieHelper;
pub use email::{EmailError, EmailService};
