use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use domain::services::{
    EventParticipantManager, EventService, EventStore, InvitationLifecycleCoordinator,
    InvitationStore, PendingInvitationCache,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::probes::DependencyProbe;
use crate::routes::{events, health, invitations};

/// The three backing stores the services run against.
#[derive(Clone)]
pub struct Stores {
    pub events: Arc<dyn EventStore>,
    pub invitations: Arc<dyn InvitationStore>,
    pub cache: Arc<dyn PendingInvitationCache>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: EventService,
    pub participants: EventParticipantManager,
    pub invitations: InvitationLifecycleCoordinator,
    pub probes: Arc<Vec<Arc<dyn DependencyProbe>>>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores, probes: Vec<Arc<dyn DependencyProbe>>) -> Self {
        Self {
            config: Arc::new(config),
            events: EventService::new(stores.events.clone()),
            participants: EventParticipantManager::new(stores.events.clone()),
            invitations: InvitationLifecycleCoordinator::new(
                stores.invitations,
                stores.cache,
                stores.events,
            ),
            probes: Arc::new(probes),
        }
    }
}

pub fn create_app(config: Config, stores: Stores, probes: Vec<Arc<dyn DependencyProbe>>) -> Router {
    let state = AppState::new(config, stores, probes);
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let event_routes = Router::new()
        .route(
            "/api/v1/events",
            post(events::create_event).get(events::search_events),
        )
        .route(
            "/api/v1/events/:event_id",
            get(events::get_event).delete(events::delete_event),
        )
        .route(
            "/api/v1/events/:event_id/participants",
            post(events::add_participant),
        )
        .route(
            "/api/v1/events/:event_id/participants/:username",
            delete(events::remove_participant),
        );

    let invitation_routes = Router::new()
        .route(
            "/api/v1/invitations",
            post(invitations::create_invitation).get(invitations::list_invitations),
        )
        .route(
            "/api/v1/invitations/:invitation_id",
            get(invitations::get_invitation).delete(invitations::delete_invitation),
        )
        .route(
            "/api/v1/invitations/:invitation_id/status",
            post(invitations::update_invitation_status),
        )
        .route(
            "/api/v1/users/:username/invitations/pending",
            get(invitations::get_pending_invitations),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(event_routes)
        .merge(invitation_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
