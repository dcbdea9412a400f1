//! Event domain models.
//!
//! Events live in the search store as fully denormalized documents, participants
//! included. Field names serialize camelCase because that is the indexed shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::{PageRequest, SortOrder};
use uuid::Uuid;
use validator::Validate;

/// Where an event takes place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "Zip code is required"))]
    pub zip_code: String,
}

/// A user taking part in an event. Has no identity outside its event.
///
/// Also the body of an add-participant request; absent fields deserialize
/// empty and fail validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct EventParticipant {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Photo url is required"))]
    pub photo_url: String,
}

impl EventParticipant {
    /// Whether this participant has the given username (case-insensitive).
    pub fn has_username(&self, username: &str) -> bool {
        eq_ignore_case(&self.username, username)
    }

    /// Whether the two participants share a username or an email (case-insensitive).
    pub fn clashes_with(&self, other: &EventParticipant) -> bool {
        self.has_username(&other.username) || eq_ignore_case(&self.email, &other.email)
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// An event document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub photo_url: String,
    pub location: EventLocation,
    #[serde(default)]
    pub participants: Vec<EventParticipant>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl Event {
    /// Build a new event with a fresh id and no participants.
    pub fn new(request: CreateEventRequest) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            title: request.title,
            description: request.description,
            photo_url: request.photo_url,
            location: request.location,
            participants: Vec::new(),
            start_date: request.start_date,
            end_date: request.end_date,
            created_at: Utc::now(),
            updated_at: None,
            created_by: request.created_by,
        }
    }

    /// Whether a participant with this username is already registered.
    pub fn is_participant(&self, username: &str) -> bool {
        self.participants.iter().any(|p| p.has_username(username))
    }

    /// Existing participant sharing a username or email with the candidate.
    pub fn clashing_participant(&self, candidate: &EventParticipant) -> Option<&EventParticipant> {
        self.participants.iter().find(|p| p.clashes_with(candidate))
    }

    /// Remove the participant with this username, returning it when present.
    pub fn take_participant(&mut self, username: &str) -> Option<EventParticipant> {
        let index = self.participants.iter().position(|p| p.has_username(username))?;
        Some(self.participants.remove(index))
    }
}

/// Request to create a new event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Photo url is required"))]
    pub photo_url: String,

    #[validate(nested)]
    pub location: EventLocation,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    #[validate(length(min = 1, message = "Created by is required"))]
    pub created_by: String,
}

/// Search filters for events.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub participant_username: Option<String>,
    pub participant_name: Option<String>,
    /// Events starting at or after this instant.
    pub start_date: Option<DateTime<Utc>>,
    /// Events ending at or before this instant.
    pub end_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<u32>,

    pub order: Option<SortOrder>,
}

impl EventsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }

    /// Approximates the search engine semantics for in-process filtering:
    /// keyword fields match exactly, text fields match case-insensitive substrings.
    pub fn matches(&self, event: &Event) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }

        if let Some(title) = non_blank(&self.title) {
            if !contains_ci(&event.title, title) {
                return false;
            }
        }
        if let Some(description) = non_blank(&self.description) {
            if !contains_ci(&event.description, description) {
                return false;
            }
        }
        if let Some(city) = non_blank(&self.city) {
            if !contains_ci(&event.location.city, city) {
                return false;
            }
        }
        if let Some(zip_code) = non_blank(&self.zip_code) {
            if event.location.zip_code != zip_code {
                return false;
            }
        }
        if let Some(username) = non_blank(&self.participant_username) {
            if !event.participants.iter().any(|p| p.username == username) {
                return false;
            }
        }
        if let Some(name) = non_blank(&self.participant_name) {
            if !event.participants.iter().any(|p| contains_ci(&p.name, name)) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if event.start_date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if event.end_date > end {
                return false;
            }
        }
        if let Some(created_by) = non_blank(&self.created_by) {
            if event.created_by != created_by {
                return false;
            }
        }
        true
    }
}

/// Filter value that is present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !shared::validation::is_blank(v))
}
