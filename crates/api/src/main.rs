use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use events_manager_api::app::{self, Stores};
use events_manager_api::config::Config;
use events_manager_api::middleware;
use events_manager_api::probes::DependencyProbe;
use persistence::{ElasticsearchEventStore, InvitationRepository, RedisPendingInvitationCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Events Manager API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;
    persistence::db::run_migrations(&pool).await?;

    let cache = Arc::new(
        RedisPendingInvitationCache::new(&config.redis.url, config.redis.namespace.clone()).await?,
    );
    let search_config: persistence::search::SearchConfig = (&config.elasticsearch).into();
    let search = Arc::new(ElasticsearchEventStore::new(&search_config)?);
    let repository = Arc::new(InvitationRepository::new(pool.clone()));

    let stores = Stores {
        events: search.clone(),
        invitations: repository,
        cache: cache.clone(),
    };
    let probes: Vec<Arc<dyn DependencyProbe>> = vec![
        Arc::new(pool.clone()) as Arc<dyn DependencyProbe>,
        cache as Arc<dyn DependencyProbe>,
        search as Arc<dyn DependencyProbe>,
    ];

    // Pool gauges
    let metrics_pool = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            persistence::metrics::record_pool_metrics(&metrics_pool);
        }
    });

    let addr = config.socket_addr()?;
    let app = app::create_app(config, stores, probes);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
