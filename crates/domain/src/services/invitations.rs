//! Invitation lifecycle coordination across the three stores.
//!
//! Every operation runs its store calls in a fixed order. The relational
//! invitation store is authoritative and is always written before the pending
//! cache is touched. Cache writes and evictions are best-effort: a failure is
//! logged and the operation still succeeds, leaving a stale entry that is
//! corrected on a later read or transition.

use std::sync::Arc;

use chrono::Utc;
use shared::pagination::Page;
use shared::validation::is_blank;
use tracing::{debug, info, warn};
use validator::Validate;

use super::participants::EventParticipantManager;
use super::stores::{EventStore, InvitationStore, PendingInvitationCache};
use crate::error::DomainError;
use crate::models::{
    CreateInvitationRequest, Invitation, InvitationAction, InvitationStatus,
    InvitationStatusRequest, InvitationsQuery,
};

#[derive(Clone)]
pub struct InvitationLifecycleCoordinator {
    invitations: Arc<dyn InvitationStore>,
    cache: Arc<dyn PendingInvitationCache>,
    events: Arc<dyn EventStore>,
    participants: EventParticipantManager,
}

impl InvitationLifecycleCoordinator {
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        cache: Arc<dyn PendingInvitationCache>,
        events: Arc<dyn EventStore>,
    ) -> Self {
        let participants = EventParticipantManager::new(events.clone());
        Self {
            invitations,
            cache,
            events,
            participants,
        }
    }

    /// Invite a user to an event.
    pub async fn create_invitation(
        &self,
        request: CreateInvitationRequest,
    ) -> Result<Invitation, DomainError> {
        request.validate()?;

        // The cache check may miss but never reports a false duplicate.
        match self.cache.contains(&request.username, &request.event_id).await {
            Ok(true) => {
                return Err(DomainError::conflict(
                    "User already invited and awaiting approval",
                ))
            }
            Ok(false) => {}
            Err(e) => warn!(
                username = %request.username,
                event_id = %request.event_id,
                error = %e,
                "Pending cache lookup failed, continuing without it"
            ),
        }

        let event = self
            .events
            .get(&request.event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event not found"))?;

        if event.is_participant(&request.username) {
            return Err(DomainError::conflict(
                "User already part of event participants",
            ));
        }

        let invitation = Invitation::pending(request.invitee(), &event, request.invited_by);
        self.invitations.create(&invitation).await?;

        if let Err(e) = self.cache.put(&invitation.snapshot()).await {
            warn!(
                invitation_id = %invitation.id,
                username = %invitation.username,
                event_id = %invitation.event_id,
                error = %e,
                "Failed to cache pending invitation"
            );
        }

        info!(
            invitation_id = %invitation.id,
            username = %invitation.username,
            event_id = %invitation.event_id,
            invited_by = %invitation.invited_by,
            "Invitation created"
        );
        Ok(invitation)
    }

    /// Accept a pending invitation and add the invitee to the event.
    ///
    /// The acceptance is committed before the participant is added. A failure
    /// of the participant step is returned as-is and the invitation stays
    /// accepted. The store only applies the acceptance while the row is still
    /// pending, so a concurrent accept or decline that commits first turns this
    /// call into a conflict.
    pub async fn accept_invitation(&self, id: &str) -> Result<Invitation, DomainError> {
        let mut invitation = self.load(id).await?;
        if !invitation.is_pending() {
            return Err(already_resolved(invitation.status));
        }

        invitation.accept(Utc::now());
        if !self.invitations.resolve(&invitation).await? {
            let current = self.load(id).await?;
            debug!(
                invitation_id = %current.id,
                status = %current.status,
                "Acceptance lost to a concurrent transition"
            );
            return Err(already_resolved(current.status));
        }
        self.evict(&invitation).await;

        info!(
            invitation_id = %invitation.id,
            username = %invitation.username,
            event_id = %invitation.event_id,
            "Invitation accepted"
        );

        self.participants
            .add_participant(&invitation.event_id, invitation.invitee().into())
            .await
            .inspect_err(|e| {
                warn!(
                    invitation_id = %invitation.id,
                    event_id = %invitation.event_id,
                    error = %e,
                    "Invitation accepted but participant was not added"
                )
            })?;

        Ok(invitation)
    }

    /// Decline an invitation.
    ///
    /// Declining an already declined invitation succeeds without a store
    /// write, including when a concurrent decline commits first. The cache
    /// entry is still evicted.
    pub async fn decline_invitation(&self, id: &str) -> Result<Invitation, DomainError> {
        let mut invitation = self.load(id).await?;

        match invitation.status {
            InvitationStatus::Accepted => return Err(already_resolved(invitation.status)),
            InvitationStatus::Declined => return Ok(self.already_declined(invitation).await),
            InvitationStatus::Pending => {}
        }

        invitation.decline(Utc::now());
        if !self.invitations.resolve(&invitation).await? {
            let current = self.load(id).await?;
            return match current.status {
                InvitationStatus::Declined => Ok(self.already_declined(current).await),
                status => Err(already_resolved(status)),
            };
        }
        self.evict(&invitation).await;

        info!(
            invitation_id = %invitation.id,
            username = %invitation.username,
            event_id = %invitation.event_id,
            "Invitation declined"
        );
        Ok(invitation)
    }

    async fn already_declined(&self, invitation: Invitation) -> Invitation {
        debug!(invitation_id = %invitation.id, "Invitation already declined");
        self.evict(&invitation).await;
        invitation
    }

    /// Apply an `accept` or `decline` request.
    pub async fn update_invitation_status(
        &self,
        id: &str,
        request: &InvitationStatusRequest,
    ) -> Result<Invitation, DomainError> {
        request.validate()?;
        match request.action().map_err(DomainError::Validation)? {
            InvitationAction::Accept => self.accept_invitation(id).await,
            InvitationAction::Decline => self.decline_invitation(id).await,
        }
    }

    pub async fn delete_invitation(&self, id: &str) -> Result<(), DomainError> {
        let invitation = self.load(id).await?;

        self.invitations.delete(&invitation.id).await?;
        self.evict(&invitation).await;

        info!(
            invitation_id = %invitation.id,
            username = %invitation.username,
            event_id = %invitation.event_id,
            "Invitation deleted"
        );
        Ok(())
    }

    pub async fn get_invitation(&self, id: &str) -> Result<Invitation, DomainError> {
        self.load(id).await
    }

    /// Pending invitations addressed to `username`.
    ///
    /// A non-empty cache map is returned as-is. Otherwise the relational store
    /// is queried and, when it has pending invitations, the cache is refilled.
    pub async fn get_user_pending_invitations(
        &self,
        username: &str,
    ) -> Result<Vec<Invitation>, DomainError> {
        if is_blank(username) {
            return Err(DomainError::validation("Username is required"));
        }

        match self.cache.get_all(username).await {
            Ok(cached) if !cached.is_empty() => {
                debug!(username = %username, count = cached.len(), "Pending invitations served from cache");
                return Ok(cached.into_iter().map(Invitation::from).collect());
            }
            Ok(_) => {}
            Err(e) => warn!(
                username = %username,
                error = %e,
                "Pending cache read failed, falling back to store"
            ),
        }

        let pending = self.invitations.pending_for(username).await?;
        if !pending.is_empty() {
            let snapshots: Vec<_> = pending.iter().map(Invitation::snapshot).collect();
            if let Err(e) = self.cache.put_all(username, &snapshots).await {
                warn!(
                    username = %username,
                    error = %e,
                    "Failed to repopulate pending invitation cache"
                );
            }
        }

        Ok(pending)
    }

    /// Filtered, paginated listing straight from the relational store.
    pub async fn list_event_invitations(
        &self,
        query: &InvitationsQuery,
    ) -> Result<Page<Invitation>, DomainError> {
        query.validate()?;
        Ok(self.invitations.list(query).await?)
    }

    async fn load(&self, id: &str) -> Result<Invitation, DomainError> {
        self.invitations
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))
    }

    async fn evict(&self, invitation: &Invitation) {
        if let Err(e) = self
            .cache
            .evict(&invitation.username, &invitation.event_id)
            .await
        {
            warn!(
                invitation_id = %invitation.id,
                username = %invitation.username,
                event_id = %invitation.event_id,
                error = %e,
                "Failed to evict pending invitation from cache"
            );
        }
    }
}

/// Conflict for a transition attempted on an invitation that left pending.
fn already_resolved(status: InvitationStatus) -> DomainError {
    match status {
        InvitationStatus::Accepted => DomainError::conflict("Event invitation already accepted"),
        InvitationStatus::Declined => DomainError::conflict("Event invitation already declined"),
        InvitationStatus::Pending => DomainError::conflict("Event invitation changed concurrently"),
    }
}
