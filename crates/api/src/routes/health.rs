//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;

use crate::app::AppState;
use crate::probes::DependencyProbe;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub dependencies: Vec<DependencyHealth>,
}

/// Reachability of one backing store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DependencyHealth {
    pub name: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn check_all(probes: &[std::sync::Arc<dyn DependencyProbe>]) -> Vec<DependencyHealth> {
    let mut results = Vec::with_capacity(probes.len());
    for probe in probes {
        let start = Instant::now();
        let outcome = probe.check().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        if let Err(ref e) = outcome {
            tracing::warn!(dependency = probe.name(), error = %e, "Dependency check failed");
        }

        results.push(DependencyHealth {
            name: probe.name().to_string(),
            connected: outcome.is_ok(),
            latency_ms: outcome.is_ok().then_some(latency_ms),
            error: outcome.err(),
        });
    }
    results
}

/// Full health check endpoint.
///
/// Reports every backing store. Responds 503 with the same body when any of
/// them is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let dependencies = check_all(&state.probes).await;
    let healthy = dependencies.iter().all(|d| d.connected);

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK once every backing store answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let dependencies = check_all(&state.probes).await;

    if dependencies.iter().all(|d| d.connected) {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticProbe(Result<(), String>);

    #[async_trait]
    impl DependencyProbe for StaticProbe {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn check(&self) -> Result<(), String> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_check_all_reports_each_probe() {
        let probes: Vec<Arc<dyn DependencyProbe>> = vec![
            Arc::new(StaticProbe(Ok(()))),
            Arc::new(StaticProbe(Err("connection refused".to_string()))),
        ];

        let results = check_all(&probes).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].connected);
        assert!(results[0].latency_ms.is_some());
        assert!(!results[1].connected);
        assert_eq!(results[1].latency_ms, None);
        assert_eq!(results[1].error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_dependency_health_omits_empty_error() {
        let health = DependencyHealth {
            name: "database".to_string(),
            connected: true,
            latency_ms: Some(3),
            error: None,
        };
        let json = serde_json::to_value(&health).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["latency_ms"], 3);
    }
}
