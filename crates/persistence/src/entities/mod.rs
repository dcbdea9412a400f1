//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod invitation;

pub use invitation::InvitationEntity;
