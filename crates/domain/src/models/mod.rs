//! Domain models for Events Manager.

pub mod event;
pub mod invitation;

pub use event::{CreateEventRequest, Event, EventLocation, EventParticipant, EventsQuery};
pub use invitation::{
    CachedInvitation, CreateInvitationRequest, Invitation, InvitationAction, InvitationStatus,
    InvitationStatusRequest, InvitationsQuery, Invitee,
};
