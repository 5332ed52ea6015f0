use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use maitred_agent::runtime::AgentRuntime;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    runtime: Arc<AgentRuntime>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_sessions: usize,
    pub daily_tokens_used: u64,
    pub total_tokens_used: u64,
    pub checked_at: String,
}

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { runtime })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let usage = state.runtime.budget_usage();
    let payload = HealthResponse {
        status: "ready",
        active_sessions: state.runtime.active_sessions(),
        daily_tokens_used: usage.daily_tokens,
        total_tokens_used: usage.total_tokens,
        checked_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use maitred_agent::oracle::{OracleGateway, ScriptedOracle};
    use maitred_agent::runtime::AgentRuntime;
    use maitred_core::budget::BudgetQuotas;
    use maitred_core::catalog::Catalog;

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_ready_with_usage_counters() {
        let gateway = OracleGateway::new(Arc::new(ScriptedOracle::new(&[])) as _);
        let runtime = Arc::new(AgentRuntime::new(
            Arc::new(Catalog::builtin()),
            gateway,
            BudgetQuotas::default(),
            150,
        ));

        let (status, axum::Json(payload)) = health(State(HealthState { runtime })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.active_sessions, 0);
        assert_eq!(payload.total_tokens_used, 0);
    }
}
