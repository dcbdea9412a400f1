//! Reachability checks for the backing stores, reported by the health routes.

use async_trait::async_trait;
use persistence::{ElasticsearchEventStore, RedisPendingInvitationCache};
use sqlx::PgPool;

/// A backing dependency the service needs in order to take traffic.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Name shown in the health report.
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<(), String>;
}

#[async_trait]
impl DependencyProbe for PgPool {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(self)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl DependencyProbe for RedisPendingInvitationCache {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn check(&self) -> Result<(), String> {
        self.ping().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl DependencyProbe for ElasticsearchEventStore {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn check(&self) -> Result<(), String> {
        self.ping().await.map_err(|e| e.to_string())
    }
}
