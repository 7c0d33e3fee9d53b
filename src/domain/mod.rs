//! Domain value objects and types.
//!
//! This module contains type-safe wrappers for domain concepts like
//! record IDs, email addresses, and phone numbers. These value objects
//! provide validation at construction time and prevent invalid data from
//! being represented in the system.

pub mod email;
pub mod errors;
pub mod phone;
pub mod record_id;
pub mod website;

pub use email::EmailAddress;
pub use errors::ValidationError;
pub use phone::{E164Number, PhoneNumber};
pub use record_id::RecordId;
pub use website::Website;
