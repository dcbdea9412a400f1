//! Persistence layer for Events Manager.
//!
//! This crate contains:
//! - Database connection management and query metrics
//! - Entity definitions (database row mappings)
//! - The Postgres invitation repository
//! - The Redis pending-invitation cache
//! - The Elasticsearch event store

pub mod cache;
pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod search;

pub use cache::RedisPendingInvitationCache;
pub use repositories::InvitationRepository;
pub use search::ElasticsearchEventStore;
