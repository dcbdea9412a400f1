//! Repository implementations for database operations.

pub mod invitation;

pub use invitation::InvitationRepository;
