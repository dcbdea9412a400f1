//! Invitation route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateInvitationRequest, Invitation, InvitationStatusRequest, InvitationsQuery,
};
use serde::Serialize;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;

/// Pending invitations addressed to one user.
#[derive(Debug, Serialize)]
pub struct PendingInvitationsResponse {
    pub data: Vec<Invitation>,
    pub count: usize,
}

/// POST /api/v1/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<Invitation>), ApiError> {
    let invitation = state.invitations.create_invitation(request).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// GET /api/v1/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    Query(query): Query<InvitationsQuery>,
) -> Result<Json<Page<Invitation>>, ApiError> {
    let page = state.invitations.list_event_invitations(&query).await?;
    Ok(Json(page))
}

/// GET /api/v1/invitations/:invitation_id
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
) -> Result<Json<Invitation>, ApiError> {
    let invitation = state.invitations.get_invitation(&invitation_id).await?;
    Ok(Json(invitation))
}

/// POST /api/v1/invitations/:invitation_id/status
///
/// Body `{"status": "accept"}` or `{"status": "decline"}`.
pub async fn update_invitation_status(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
    Json(request): Json<InvitationStatusRequest>,
) -> Result<Json<Invitation>, ApiError> {
    let invitation = state
        .invitations
        .update_invitation_status(&invitation_id, &request)
        .await?;
    Ok(Json(invitation))
}

/// DELETE /api/v1/invitations/:invitation_id
pub async fn delete_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.invitations.delete_invitation(&invitation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/:username/invitations/pending
pub async fn get_pending_invitations(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PendingInvitationsResponse>, ApiError> {
    let data = state
        .invitations
        .get_user_pending_invitations(&username)
        .await?;
    Ok(Json(PendingInvitationsResponse {
        count: data.len(),
        data,
    }))
}
