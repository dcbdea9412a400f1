//! In-memory store implementations.
//!
//! Used for local development and tests. Each store can be told to fail its
//! reads or writes to exercise the services' dependency-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use shared::pagination::{Page, SortOrder};
use tokio::sync::RwLock;

use super::stores::{EventStore, InvitationStore, PendingInvitationCache, StoreError};
use crate::models::{CachedInvitation, Event, EventsQuery, Invitation, InvitationsQuery};

fn simulated(operation: &str) -> StoreError {
    StoreError::Unavailable(format!("simulated {} failure", operation))
}

fn paginate<T: Clone>(items: Vec<T>, request: shared::pagination::PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let data = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::new(data, request, total)
}

/// Event store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<String, Event>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event directly, bypassing failure injection.
    pub async fn insert(&self, event: Event) {
        self.events.write().await.insert(event.id.clone(), event);
    }

    /// Read an event directly, bypassing failure injection.
    pub async fn snapshot(&self, id: &str) -> Option<Event> {
        self.events.read().await.get(id).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("event read"));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated("event write"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn get(&self, id: &str) -> Result<Option<Event>, StoreError> {
        self.check_read()?;
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn create(&self, event: &Event) -> Result<(), StoreError> {
        self.check_write()?;
        self.events
            .write()
            .await
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<(), StoreError> {
        self.check_write()?;
        let mut events = self.events.write().await;
        match events.get_mut(&event.id) {
            Some(existing) => {
                *existing = event.clone();
                Ok(())
            }
            None => Err(StoreError::NotApplied(format!("event {} not found", event.id))),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.check_write()?;
        Ok(self.events.write().await.remove(id).is_some())
    }

    async fn search(&self, query: &EventsQuery) -> Result<Page<Event>, StoreError> {
        self.check_read()?;
        let mut matched: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();

        matched.sort_by_key(|e| e.created_at);
        if query.sort_order() == SortOrder::Desc {
            matched.reverse();
        }

        Ok(paginate(matched, query.page_request()))
    }
}

/// Invitation store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryInvitationStore {
    invitations: RwLock<HashMap<String, Invitation>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryInvitationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an invitation directly, bypassing failure injection.
    pub async fn insert(&self, invitation: Invitation) {
        self.invitations
            .write()
            .await
            .insert(invitation.id.clone(), invitation);
    }

    /// Read an invitation directly, bypassing failure injection.
    pub async fn snapshot(&self, id: &str) -> Option<Invitation> {
        self.invitations.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.invitations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.invitations.read().await.is_empty()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("invitation read"));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated("invitation write"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InvitationStore for InMemoryInvitationStore {
    async fn get(&self, id: &str) -> Result<Option<Invitation>, StoreError> {
        self.check_read()?;
        Ok(self.invitations.read().await.get(id).cloned())
    }

    async fn create(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.check_write()?;
        let mut invitations = self.invitations.write().await;
        if invitations.contains_key(&invitation.id) {
            return Err(StoreError::NotApplied(format!(
                "invitation {} already exists",
                invitation.id
            )));
        }
        invitations.insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn resolve(&self, invitation: &Invitation) -> Result<bool, StoreError> {
        self.check_write()?;
        let mut invitations = self.invitations.write().await;
        match invitations.get_mut(&invitation.id) {
            Some(existing) if existing.is_pending() => {
                *existing = invitation.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        match self.invitations.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotApplied(format!("invitation {} not found", id))),
        }
    }

    async fn list(&self, query: &InvitationsQuery) -> Result<Page<Invitation>, StoreError> {
        self.check_read()?;
        let mut matched: Vec<Invitation> = self
            .invitations
            .read()
            .await
            .values()
            .filter(|i| query.matches(i))
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        if query.sort_order() == SortOrder::Desc {
            matched.reverse();
        }

        Ok(paginate(matched, query.page_request()))
    }

    async fn pending_for(&self, username: &str) -> Result<Vec<Invitation>, StoreError> {
        self.check_read()?;
        let mut pending: Vec<Invitation> = self
            .invitations
            .read()
            .await
            .values()
            .filter(|i| i.username == username && i.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|i| i.created_at);
        Ok(pending)
    }
}

/// Pending-invitation cache backed by nested hash maps (recipient, then event id).
#[derive(Debug, Default)]
pub struct InMemoryPendingCache {
    entries: RwLock<HashMap<String, HashMap<String, CachedInvitation>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryPendingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event ids cached for a recipient, sorted, bypassing failure injection.
    pub async fn event_ids(&self, username: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .read()
            .await
            .get(username)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("cache read"));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated("cache write"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PendingInvitationCache for InMemoryPendingCache {
    async fn contains(&self, username: &str, event_id: &str) -> Result<bool, StoreError> {
        self.check_read()?;
        Ok(self
            .entries
            .read()
            .await
            .get(username)
            .is_some_and(|m| m.contains_key(event_id)))
    }

    async fn put(&self, invitation: &CachedInvitation) -> Result<(), StoreError> {
        self.check_write()?;
        self.entries
            .write()
            .await
            .entry(invitation.username.clone())
            .or_default()
            .insert(invitation.event_id.clone(), invitation.clone());
        Ok(())
    }

    async fn put_all(
        &self,
        username: &str,
        invitations: &[CachedInvitation],
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut entries = self.entries.write().await;
        let map = entries.entry(username.to_string()).or_default();
        for invitation in invitations {
            map.insert(invitation.event_id.clone(), invitation.clone());
        }
        Ok(())
    }

    async fn evict(&self, username: &str, event_id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut entries = self.entries.write().await;
        if let Some(map) = entries.get_mut(username) {
            map.remove(event_id);
            if map.is_empty() {
                entries.remove(username);
            }
        }
        Ok(())
    }

    async fn get_all(&self, username: &str) -> Result<Vec<CachedInvitation>, StoreError> {
        self.check_read()?;
        let mut cached: Vec<CachedInvitation> = self
            .entries
            .read()
            .await
            .get(username)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        cached.sort_by_key(|c| c.created_at);
        Ok(cached)
    }
}
