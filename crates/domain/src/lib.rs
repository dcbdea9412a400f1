//! Domain layer for the Events Manager backend.
//!
//! This crate contains:
//! - Domain models (Event, Invitation, CachedInvitation)
//! - Store contracts for the search, relational and cache backends
//! - The invitation lifecycle coordinator and event services
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
