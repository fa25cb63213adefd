//! Domain services for Event Board.
//!
//! Services contain business logic that operates on domain models.

pub mod authorization;
pub mod notification;
pub mod registration;

pub use authorization::{authorize_mutation, Authorization};
pub use notification::{Notification, Notifier, NotifyError, RecordingNotifier};
pub use registration::{
    confirmation_message, RegistrationError, RegistrationService, RegistrationStore,
};
