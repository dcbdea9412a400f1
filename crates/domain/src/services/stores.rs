//! Contracts for the three backing stores.
//!
//! - [`EventStore`]: search engine holding denormalized event documents
//! - [`InvitationStore`]: relational system of record for invitations
//! - [`PendingInvitationCache`]: per-recipient map of pending invitation snapshots
//!
//! Adapters own their timeouts and retry policy; the services never retry.

use shared::pagination::Page;
use thiserror::Error;

use crate::models::{CachedInvitation, Event, EventsQuery, Invitation, InvitationsQuery};

/// Failure reported by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),

    #[error("Write not applied: {0}")]
    NotApplied(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Search-backed event document store.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Event>, StoreError>;

    async fn create(&self, event: &Event) -> Result<(), StoreError>;

    /// Replace the stored document with `event`.
    async fn update(&self, event: &Event) -> Result<(), StoreError>;

    /// Returns false when no document had this id.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn search(&self, query: &EventsQuery) -> Result<Page<Event>, StoreError>;
}

/// Relational invitation store (system of record).
#[async_trait::async_trait]
pub trait InvitationStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Invitation>, StoreError>;

    async fn create(&self, invitation: &Invitation) -> Result<(), StoreError>;

    /// Write the accepted or declined state of `invitation`, but only while the
    /// stored row is still pending. Returns false when the row is missing or
    /// was already moved out of pending.
    async fn resolve(&self, invitation: &Invitation) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::NotApplied`] when no row was deleted.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn list(&self, query: &InvitationsQuery) -> Result<Page<Invitation>, StoreError>;

    /// Invitations for `username` still in the pending state.
    async fn pending_for(&self, username: &str) -> Result<Vec<Invitation>, StoreError>;
}

/// Non-authoritative cache of pending invitations, keyed by recipient then event id.
#[async_trait::async_trait]
pub trait PendingInvitationCache: Send + Sync {
    async fn contains(&self, username: &str, event_id: &str) -> Result<bool, StoreError>;

    /// Store the snapshot under its recipient and event id.
    async fn put(&self, invitation: &CachedInvitation) -> Result<(), StoreError>;

    /// Store several snapshots for one recipient.
    async fn put_all(
        &self,
        username: &str,
        invitations: &[CachedInvitation],
    ) -> Result<(), StoreError>;

    async fn evict(&self, username: &str, event_id: &str) -> Result<(), StoreError>;

    async fn get_all(&self, username: &str) -> Result<Vec<CachedInvitation>, StoreError>;
}
