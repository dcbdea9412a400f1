//! Event route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{CreateEventRequest, Event, EventParticipant, EventsQuery};
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.events.create_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/v1/events
///
/// Search by title, description, city, zip code, participant, creator and
/// date window. Newest first unless `order=asc`.
pub async fn search_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Page<Event>>, ApiError> {
    let page = state.events.search_events(&query).await?;
    Ok(Json(page))
}

/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event = state.events.get_event(&event_id).await?;
    Ok(Json(event))
}

/// DELETE /api/v1/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.events.delete_event(&event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/:event_id/participants
pub async fn add_participant(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(participant): Json<EventParticipant>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .participants
        .add_participant(&event_id, participant)
        .await?;
    Ok(Json(event))
}

/// DELETE /api/v1/events/:event_id/participants/:username
pub async fn remove_participant(
    State(state): State<AppState>,
    Path((event_id, username)): Path<(String, String)>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .participants
        .remove_participant(&event_id, &username)
        .await?;
    Ok(Json(event))
}
