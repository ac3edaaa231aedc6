// SPDX-License-Identifier: MIT

//! The `/health` HTTP endpoint.
//!
//! Bound to `0.0.0.0:$HEALTH_PORT`. The handler only ever reads
//! [`HealthState`]; it never blocks on the orchestrator, so a stuck cycle never
//! makes the health check itself hang.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;
use triad_engine::{HealthState, HealthStatus};

async fn health_handler(State(health): State<HealthState>) -> impl IntoResponse {
    let report = health.report();
    let code = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(report))
}

fn router(health: HealthState) -> Router {
    Router::new().route("/health", get(health_handler)).with_state(health)
}

/// Serve `/health` on `0.0.0.0:port` until `cancel` fires. A `port` of `0` is the
/// caller's signal to skip calling this at all (checked by the caller, not here).
pub async fn serve(port: u16, health: HealthState, cancel: CancellationToken) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "health endpoint listening");
    axum::serve(listener, router(health))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_engine::CycleSummary;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn reports_unhealthy_with_503_before_any_cycle() {
        let health = HealthState::new();
        let response = health_handler(State(health)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["status"], "unhealthy");
    }

    #[tokio::test]
    async fn reports_healthy_with_200_after_a_clean_cycle() {
        let health = HealthState::new();
        health.record_cycle(CycleSummary { completed: true, entities_considered: 10, writes_succeeded: 10, ..Default::default() });
        let response = health_handler(State(health)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert!(json["lastCycle"].is_null() == false || json["last_cycle"].is_null() == false);
    }
}
