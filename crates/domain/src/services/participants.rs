//! Participant management on event documents.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use validator::Validate;

use super::stores::EventStore;
use crate::error::DomainError;
use crate::models::{Event, EventParticipant};

/// Adds and removes participants on events held in the search store.
#[derive(Clone)]
pub struct EventParticipantManager {
    events: Arc<dyn EventStore>,
}

impl EventParticipantManager {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Append `participant` to the event's participant list.
    ///
    /// Fails with a conflict when a participant with the same username or
    /// email (case-insensitive) is already registered.
    pub async fn add_participant(
        &self,
        event_id: &str,
        participant: EventParticipant,
    ) -> Result<Event, DomainError> {
        participant.validate()?;

        let mut event = self
            .events
            .get(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event not found"))?;

        if event.clashing_participant(&participant).is_some() {
            return Err(DomainError::conflict("User already added as participant"));
        }

        let username = participant.username.clone();
        event.participants.push(participant);
        event.updated_at = Some(Utc::now());
        self.events.update(&event).await?;

        info!(event_id = %event.id, username = %username, "Participant added");
        Ok(event)
    }

    /// Remove the participant with `username` (case-insensitive).
    pub async fn remove_participant(
        &self,
        event_id: &str,
        username: &str,
    ) -> Result<Event, DomainError> {
        let mut event = self
            .events
            .get(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event not found"))?;

        if event.take_participant(username).is_none() {
            return Err(DomainError::not_found(
                "User is not part of event participants",
            ));
        }

        event.updated_at = Some(Utc::now());
        self.events.update(&event).await?;

        info!(event_id = %event.id, username = %username, "Participant removed");
        Ok(event)
    }
}
