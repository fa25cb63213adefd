//! Domain models for Event Board.

pub mod event;
pub mod form;
pub mod registration;
pub mod user;

pub use event::{Event, EventDetail, EventForm, EventInput, EventQuery};
pub use form::FormErrors;
pub use registration::{NotificationStatus, Registration, RegistrationOutcome};
pub use user::{LoginForm, SignupForm, User};
