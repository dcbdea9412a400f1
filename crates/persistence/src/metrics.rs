//! Store call metrics.
//!
//! Every adapter call is timed into a histogram labelled with the operation
//! name, one histogram per backing store.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

const DATABASE_HISTOGRAM: &str = "database_query_duration_seconds";
const CACHE_HISTOGRAM: &str = "cache_operation_duration_seconds";
const SEARCH_HISTOGRAM: &str = "search_request_duration_seconds";

/// Record connection pool gauges. Called periodically by the server.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one store call and records it on [`QueryTimer::record`].
///
/// ```ignore
/// let timer = QueryTimer::new("find_invitation_by_id");
/// let result = sqlx::query_as::<_, InvitationEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    metric: &'static str,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Timer for a relational query.
    pub fn new(operation: &'static str) -> Self {
        Self::start(DATABASE_HISTOGRAM, operation)
    }

    /// Timer for a pending-cache command.
    pub fn cache(operation: &'static str) -> Self {
        Self::start(CACHE_HISTOGRAM, operation)
    }

    /// Timer for a search engine request.
    pub fn search(operation: &'static str) -> Self {
        Self::start(SEARCH_HISTOGRAM, operation)
    }

    fn start(metric: &'static str, operation: &'static str) -> Self {
        Self {
            metric,
            operation,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        histogram!(self.metric, "operation" => self.operation).record(duration);
    }
}
