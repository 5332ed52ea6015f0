use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use maitred_agent::runtime::{AgentRuntime, ChatRequest, ChatResponse};

/// `POST /api/chat` — the caller-facing turn endpoint. Refusals (input too
/// long, budget exhausted) come back as ordinary replies with the booking
/// snapshot untouched, so clients need no special error handling.
/// `DELETE /api/session/{id}` lets a caller signal abandonment explicitly.
pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/session/{id}", delete(end_session))
        .with_state(runtime)
}

pub async fn chat(
    State(runtime): State<Arc<AgentRuntime>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    Json(runtime.handle(request).await)
}

pub async fn end_session(
    State(runtime): State<Arc<AgentRuntime>>,
    Path(session_id): Path<String>,
) -> StatusCode {
    runtime.end_session(&session_id);
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::Json;
    use maitred_agent::oracle::{OracleGateway, ScriptedOracle};
    use maitred_agent::runtime::{AgentRuntime, ChatRequest};
    use maitred_core::budget::BudgetQuotas;
    use maitred_core::catalog::Catalog;

    use crate::chat::chat;

    fn runtime(replies: &[&str]) -> Arc<AgentRuntime> {
        let gateway = OracleGateway::new(Arc::new(ScriptedOracle::new(replies)) as _);
        Arc::new(AgentRuntime::new(
            Arc::new(Catalog::builtin()),
            gateway,
            BudgetQuotas::default(),
            150,
        ))
    }

    #[tokio::test]
    async fn chat_endpoint_returns_reply_and_booking_snapshot() {
        let runtime = runtime(&[]);

        let Json(response) = chat(
            State(Arc::clone(&runtime)),
            Json(ChatRequest { message: "hi".to_string(), session_id: "web-1".to_string() }),
        )
        .await;

        assert!(response.reply.contains("Which city"));
        assert!(!response.booking.confirmed);
        assert!(response.order_number.is_none());
    }

    #[tokio::test]
    async fn abandonment_drops_the_session() {
        let runtime = runtime(&[]);

        let _ = chat(
            State(Arc::clone(&runtime)),
            Json(ChatRequest { message: "hi".to_string(), session_id: "web-3".to_string() }),
        )
        .await;
        assert_eq!(runtime.active_sessions(), 1);

        let status = super::end_session(
            State(Arc::clone(&runtime)),
            axum::extract::Path("web-3".to_string()),
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::NO_CONTENT);
        assert_eq!(runtime.active_sessions(), 0);
    }

    #[tokio::test]
    async fn chat_endpoint_surfaces_the_venue_list_payload() {
        let runtime = runtime(&[]);

        let _ = chat(
            State(Arc::clone(&runtime)),
            Json(ChatRequest { message: "hi".to_string(), session_id: "web-2".to_string() }),
        )
        .await;
        let Json(response) = chat(
            State(runtime),
            Json(ChatRequest { message: "rome".to_string(), session_id: "web-2".to_string() }),
        )
        .await;

        assert_eq!(response.restaurants.map(|venues| venues.len()), Some(3));
        assert_eq!(response.booking.location.map(|id| id.0), Some("rome".to_string()));
    }
}
