//! Domain services for Events Manager.
//!
//! Services contain business logic that operates on domain models through the
//! store contracts in [`stores`].

pub mod events;
pub mod invitations;
pub mod memory;
pub mod participants;
pub mod stores;

pub use events::EventService;
pub use invitations::InvitationLifecycleCoordinator;
pub use memory::{InMemoryEventStore, InMemoryInvitationStore, InMemoryPendingCache};
pub use participants::EventParticipantManager;
pub use stores::{EventStore, InvitationStore, PendingInvitationCache, StoreError};
