//! Event CRUD and search through the event store.

use std::sync::Arc;

use chrono::Utc;
use shared::pagination::Page;
use tracing::info;
use validator::Validate;

use super::stores::EventStore;
use crate::error::DomainError;
use crate::models::{CreateEventRequest, Event, EventsQuery};

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Create an event with a fresh id and no participants.
    ///
    /// The end date must lie in the future.
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event, DomainError> {
        if request.validate().is_err() || request.end_date <= Utc::now() {
            return Err(DomainError::validation("Provide all required inputs"));
        }

        let event = Event::new(request);
        self.events.create(&event).await?;

        info!(event_id = %event.id, created_by = %event.created_by, "Event created");
        Ok(event)
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, DomainError> {
        self.events
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event not found"))
    }

    /// Delete an event. Invitations referencing it are left in place.
    pub async fn delete_event(&self, id: &str) -> Result<(), DomainError> {
        if !self.events.delete(id).await? {
            return Err(DomainError::not_found("Event not found"));
        }

        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    pub async fn search_events(&self, query: &EventsQuery) -> Result<Page<Event>, DomainError> {
        query.validate()?;
        Ok(self.events.search(query).await?)
    }
}
