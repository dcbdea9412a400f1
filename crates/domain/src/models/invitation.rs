//! Invitation domain models.
//!
//! The relational store is the system of record for invitations. A
//! [`CachedInvitation`] is the snapshot kept in the per-recipient pending cache.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::pagination::{PageRequest, SortOrder};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::event::{non_blank, Event, EventParticipant};

/// Lifecycle state of an invitation.
///
/// Created `Pending`, then moves exactly once to `Accepted` or `Declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "declined" => Ok(InvitationStatus::Declined),
            other => Err(format!("Unknown invitation status: {}", other)),
        }
    }
}

/// The user being invited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitee {
    pub username: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
}

impl From<Invitee> for EventParticipant {
    fn from(invitee: Invitee) -> Self {
        Self {
            username: invitee.username,
            email: invitee.email,
            name: invitee.name,
            photo_url: invitee.photo_url,
        }
    }
}

/// An invitation of a user to an event.
///
/// `event_id` is a plain identifier: the event is looked up through the event
/// store when needed. `title` and `description` are copied from the event at
/// invite time and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub invited_by: String,
    pub status: InvitationStatus,
    pub is_accepted: bool,
    pub accepted_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Build a pending invitation for `event`, freezing its title and description.
    pub fn pending(invitee: Invitee, event: &Event, invited_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            username: invitee.username,
            email: invitee.email,
            name: invitee.name,
            photo_url: invitee.photo_url,
            event_id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            invited_by: invited_by.into(),
            status: InvitationStatus::Pending,
            is_accepted: false,
            accepted_date: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    pub fn invitee(&self) -> Invitee {
        Invitee {
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }

    /// Mark as accepted at `at`.
    pub fn accept(&mut self, at: DateTime<Utc>) {
        self.status = InvitationStatus::Accepted;
        self.is_accepted = true;
        self.accepted_date = Some(at);
        self.updated_at = Some(at);
    }

    /// Mark as declined at `at`. The acceptance date stays unset.
    pub fn decline(&mut self, at: DateTime<Utc>) {
        self.status = InvitationStatus::Declined;
        self.is_accepted = false;
        self.accepted_date = None;
        self.updated_at = Some(at);
    }

    /// Snapshot for the pending cache.
    pub fn snapshot(&self) -> CachedInvitation {
        CachedInvitation {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            photo_url: self.photo_url.clone(),
            event_id: self.event_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            invited_by: self.invited_by.clone(),
            is_accepted: self.is_accepted,
            accepted_date: self.accepted_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Invitation snapshot stored in the pending cache.
///
/// Serialized PascalCase: this is the layout already present in the cache and
/// must stay readable by every deployment sharing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CachedInvitation {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub invited_by: String,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub accepted_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CachedInvitation> for Invitation {
    fn from(cached: CachedInvitation) -> Self {
        let status = if cached.is_accepted {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Pending
        };

        Self {
            id: cached.id,
            username: cached.username,
            email: cached.email,
            name: cached.name,
            photo_url: cached.photo_url,
            event_id: cached.event_id,
            title: cached.title,
            description: cached.description,
            invited_by: cached.invited_by,
            status,
            is_accepted: cached.is_accepted,
            accepted_date: cached.accepted_date,
            created_at: cached.created_at,
            updated_at: cached.updated_at,
        }
    }
}

/// Request to invite a user to an event.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInvitationRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Photo url is required"))]
    pub photo_url: String,

    #[validate(length(min = 1, message = "Event id is required"))]
    pub event_id: String,

    #[validate(length(min = 1, message = "Invited by is required"))]
    pub invited_by: String,
}

impl CreateInvitationRequest {
    pub fn invitee(&self) -> Invitee {
        Invitee {
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

/// Transition requested on a pending invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Decline,
}

impl FromStr for InvitationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(InvitationAction::Accept),
            "decline" => Ok(InvitationAction::Decline),
            _ => Err("Incorrect invitation status".to_string()),
        }
    }
}

/// Body of an accept/decline request.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct InvitationStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

impl InvitationStatusRequest {
    pub fn action(&self) -> Result<InvitationAction, String> {
        self.status.parse()
    }
}

/// Filters for listing invitations.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvitationsQuery {
    /// Exact match.
    pub username: Option<String>,
    /// Case-insensitive exact match.
    pub email: Option<String>,
    /// Case-insensitive exact match.
    pub name: Option<String>,
    /// Exact match.
    pub event_id: Option<String>,
    /// Case-insensitive substring match.
    pub title: Option<String>,
    /// Exact match.
    pub invited_by: Option<String>,
    pub is_accepted: Option<bool>,
    /// Matches invitations accepted on this calendar day (UTC).
    pub accepted_date: Option<NaiveDate>,

    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<u32>,

    pub order: Option<SortOrder>,
}

impl InvitationsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }

    /// In-process equivalent of the relational filter.
    pub fn matches(&self, invitation: &Invitation) -> bool {
        if let Some(username) = non_blank(&self.username) {
            if invitation.username != username {
                return false;
            }
        }
        if let Some(email) = non_blank(&self.email) {
            if invitation.email.to_lowercase() != email.to_lowercase() {
                return false;
            }
        }
        if let Some(name) = non_blank(&self.name) {
            if invitation.name.to_lowercase() != name.to_lowercase() {
                return false;
            }
        }
        if let Some(event_id) = non_blank(&self.event_id) {
            if invitation.event_id != event_id {
                return false;
            }
        }
        if let Some(title) = non_blank(&self.title) {
            if !invitation
                .title
                .to_lowercase()
                .contains(&title.to_lowercase())
            {
                return false;
            }
        }
        if let Some(invited_by) = non_blank(&self.invited_by) {
            if invitation.invited_by != invited_by {
                return false;
            }
        }
        if let Some(is_accepted) = self.is_accepted {
            if invitation.is_accepted != is_accepted {
                return false;
            }
        }
        if let Some(day) = self.accepted_date {
            if invitation.accepted_date.map(|d| d.date_naive()) != Some(day) {
                return false;
            }
        }
        true
    }
}
