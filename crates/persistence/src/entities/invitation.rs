//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Invitation, InvitationStatus};
use domain::services::StoreError;
use sqlx::FromRow;

/// Database row mapping for the event_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub invited_by: String,
    pub status: String,
    pub is_accepted: bool,
    pub accepted_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvitationEntity> for Invitation {
    type Error = StoreError;

    fn try_from(entity: InvitationEntity) -> Result<Self, Self::Error> {
        let status = entity
            .status
            .parse::<InvitationStatus>()
            .map_err(|e| StoreError::InvalidResponse(format!("invitation {}: {}", entity.id, e)))?;

        Ok(Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            name: entity.name,
            photo_url: entity.photo_url,
            event_id: entity.event_id,
            title: entity.title,
            description: entity.description,
            invited_by: entity.invited_by,
            status,
            is_accepted: entity.is_accepted,
            accepted_date: entity.accepted_date,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}
