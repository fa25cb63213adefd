//! Entity definitions (database row mappings).

pub mod event;
pub mod registration;
pub mod user;

pub use event::{EventEntity, EventWithOrganizerEntity};
pub use registration::RegistrationEntity;
pub use user::UserEntity;
