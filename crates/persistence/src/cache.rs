//! Redis-backed pending invitation cache.
//!
//! Layout:
//! - **Key**: `{namespace}:invitations:{username}` (hash)
//! - **Field**: event id
//! - **Value**: JSON-serialized [`CachedInvitation`] (PascalCase)
//!
//! The layout is shared with existing deployments and must not change.

use std::collections::HashMap;

use domain::models::CachedInvitation;
use domain::services::{PendingInvitationCache, StoreError};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::warn;

use crate::error::{from_json, from_redis};
use crate::metrics::QueryTimer;

pub const DEFAULT_NAMESPACE: &str = "eventmanager";

/// Redis key holding the pending invitations of `username`.
pub fn pending_key(namespace: &str, username: &str) -> String {
    format!("{}:invitations:{}", namespace, username)
}

/// Decode the hash values, skipping entries that no longer deserialize.
fn decode_entries(key: &str, raw: HashMap<String, String>) -> Vec<CachedInvitation> {
    let mut entries: Vec<CachedInvitation> = raw
        .into_iter()
        .filter_map(|(event_id, json)| match serde_json::from_str(&json) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = %key, event_id = %event_id, error = %e, "Skipping unreadable cache entry");
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| e.created_at);
    entries
}

#[derive(Clone)]
pub struct RedisPendingInvitationCache {
    conn_manager: ConnectionManager,
    namespace: String,
}

impl RedisPendingInvitationCache {
    /// Connect to Redis at `redis_url`.
    pub async fn new(redis_url: &str, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let client = Client::open(redis_url).map_err(from_redis)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(from_redis)?;

        Ok(Self {
            conn_manager,
            namespace: namespace.into(),
        })
    }

    fn key(&self, username: &str) -> String {
        pending_key(&self.namespace, username)
    }

    /// Round-trip a PING, used by the readiness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn_manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(from_redis)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PendingInvitationCache for RedisPendingInvitationCache {
    async fn contains(&self, username: &str, event_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn_manager.clone();
        let timer = QueryTimer::cache("hexists");
        let exists = conn.hexists(self.key(username), event_id).await;
        timer.record();

        exists.map_err(from_redis)
    }

    async fn put(&self, invitation: &CachedInvitation) -> Result<(), StoreError> {
        let json = serde_json::to_string(invitation).map_err(from_json)?;
        let mut conn = self.conn_manager.clone();

        let timer = QueryTimer::cache("hset");
        let result: Result<(), _> = conn
            .hset(self.key(&invitation.username), &invitation.event_id, json)
            .await;
        timer.record();

        result.map_err(from_redis)
    }

    async fn put_all(
        &self,
        username: &str,
        invitations: &[CachedInvitation],
    ) -> Result<(), StoreError> {
        if invitations.is_empty() {
            return Ok(());
        }

        let fields = invitations
            .iter()
            .map(|i| Ok((i.event_id.clone(), serde_json::to_string(i).map_err(from_json)?)))
            .collect::<Result<Vec<(String, String)>, StoreError>>()?;

        let mut conn = self.conn_manager.clone();
        let timer = QueryTimer::cache("hset_multiple");
        let result: Result<(), _> = conn.hset_multiple(self.key(username), fields.as_slice()).await;
        timer.record();

        result.map_err(from_redis)
    }

    async fn evict(&self, username: &str, event_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn_manager.clone();
        let timer = QueryTimer::cache("hdel");
        let result: Result<(), _> = conn.hdel(self.key(username), event_id).await;
        timer.record();

        result.map_err(from_redis)
    }

    async fn get_all(&self, username: &str) -> Result<Vec<CachedInvitation>, StoreError> {
        let key = self.key(username);
        let mut conn = self.conn_manager.clone();
        let timer = QueryTimer::cache("hgetall");
        let raw: Result<HashMap<String, String>, _> = conn.hgetall(&key).await;
        timer.record();

        Ok(decode_entries(&key, raw.map_err(from_redis)?))
    }
}
