use std::sync::Arc;

use maitred_core::budget::{self, BudgetLedger, BudgetQuotas, BudgetUsage};
use maitred_core::catalog::{Catalog, Venue};
use maitred_core::{Booking, SessionStore};
use serde::{Deserialize, Serialize};

use crate::engine::{trailing_question, DialogueEngine, SessionDisposition};
use crate::oracle::OracleGateway;

#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub booking: Booking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurants: Option<Vec<Venue>>,
    #[serde(rename = "orderNumber", skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
}

/// Per-turn pipeline shared by every ingress surface: input ceiling, budget
/// admission, session checkout, dialogue handling, bookkeeping, snapshot.
/// One instance owns the process-wide session store and budget ledger.
pub struct AgentRuntime {
    engine: DialogueEngine,
    sessions: SessionStore,
    budget: BudgetLedger,
    max_input_words: usize,
}

impl AgentRuntime {
    pub fn new(
        catalog: Arc<Catalog>,
        gateway: OracleGateway,
        quotas: BudgetQuotas,
        max_input_words: usize,
    ) -> Self {
        Self {
            engine: DialogueEngine::new(catalog, gateway),
            sessions: SessionStore::new(),
            budget: BudgetLedger::new(quotas),
            max_input_words,
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> ChatResponse {
        self.handle_on_day(request, &budget::today_label()).await
    }

    /// `day_label` is injected so the daily-reset behavior is testable; the
    /// public `handle` passes the real calendar label.
    pub async fn handle_on_day(&self, request: ChatRequest, day_label: &str) -> ChatResponse {
        let session_id = if request.session_id.is_empty() {
            "default".to_string()
        } else {
            request.session_id.clone()
        };

        let words = budget::word_count(&request.message);
        if words > self.max_input_words {
            tracing::info!(
                event_name = "dialogue.input_rejected",
                session_id = %session_id,
                word_count = words,
                "input above word ceiling rejected before budget accounting"
            );
            let reply = format!(
                "Message too long ({words} words). Please keep messages under {} words.",
                self.max_input_words,
            );
            return self.snapshot_reply(&session_id, reply).await;
        }

        let estimate = budget::estimate_request_tokens(words);
        let admission = self.budget.admit(estimate, day_label);
        if let Some(refusal) = admission.refusal() {
            tracing::warn!(
                event_name = "budget.request_denied",
                session_id = %session_id,
                estimated_tokens = estimate,
                "oracle budget exhausted, refusing request"
            );
            return self.snapshot_reply(&session_id, refusal.to_string()).await;
        }

        let handle = self.sessions.checkout(&session_id);
        let mut session = handle.lock().await;
        let outcome = self.engine.handle(&mut session, &request.message).await;

        tracing::info!(
            event_name = "dialogue.turn_handled",
            session_id = %session_id,
            stage = session.stage.as_str(),
            "turn handled"
        );

        match outcome.disposition {
            SessionDisposition::End => self.sessions.remove(&session_id),
            SessionDisposition::Continue => {
                session.last_question = trailing_question(&outcome.reply);
            }
        }

        ChatResponse {
            reply: outcome.reply,
            booking: session.booking.clone(),
            restaurants: outcome.venues,
            order_number: outcome.confirmation_code,
        }
    }

    /// Caller-signaled abandonment: drop the session without a reply.
    pub fn end_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn budget_usage(&self) -> BudgetUsage {
        self.budget.usage()
    }

    async fn snapshot_reply(&self, session_id: &str, reply: String) -> ChatResponse {
        let handle = self.sessions.checkout(session_id);
        let session = handle.lock().await;
        ChatResponse {
            reply,
            booking: session.booking.clone(),
            restaurants: None,
            order_number: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use maitred_core::budget::BudgetQuotas;
    use maitred_core::catalog::Catalog;
    use maitred_core::Stage;

    use super::{AgentRuntime, ChatRequest};
    use crate::oracle::{OracleGateway, ScriptedOracle};

    const DAY: &str = "2026-08-07";

    fn runtime_with(replies: &[&str], quotas: BudgetQuotas, max_words: usize) -> AgentRuntime {
        let oracle = Arc::new(ScriptedOracle::new(replies));
        let gateway = OracleGateway::new(oracle as _);
        AgentRuntime::new(Arc::new(Catalog::builtin()), gateway, quotas, max_words)
    }

    fn request(session: &str, message: &str) -> ChatRequest {
        ChatRequest { message: message.to_string(), session_id: session.to_string() }
    }

    async fn stage_of(runtime: &AgentRuntime, session: &str) -> Stage {
        runtime.sessions.checkout(session).lock().await.stage
    }

    #[tokio::test]
    async fn full_booking_scenario_runs_end_to_end() {
        let runtime = runtime_with(
            &[
                "SELECT_VENUE",
                "Septime",
                "PROVIDE_DATE",
                "Dec 24",
                "PROVIDE_TIME",
                "8:00 PM",
                "PROVIDE_GUESTS",
                "4",
                "CONFIRM_YES",
            ],
            BudgetQuotas::default(),
            150,
        );

        let hello = runtime.handle_on_day(request("s1", "hi"), DAY).await;
        assert!(hello.reply.contains("Which city"));
        assert_eq!(stage_of(&runtime, "s1").await, Stage::Location);

        let city = runtime.handle_on_day(request("s1", "paris"), DAY).await;
        assert_eq!(city.restaurants.as_ref().map(Vec::len), Some(3));
        assert_eq!(stage_of(&runtime, "s1").await, Stage::Venue);

        let venue = runtime.handle_on_day(request("s1", "book Septime"), DAY).await;
        assert_eq!(venue.booking.venue.as_deref(), Some("Septime"));
        assert_eq!(stage_of(&runtime, "s1").await, Stage::Date);

        let date = runtime.handle_on_day(request("s1", "dec 24"), DAY).await;
        assert_eq!(date.booking.date.as_deref(), Some("Dec 24"));
        assert_eq!(stage_of(&runtime, "s1").await, Stage::Time);

        let time = runtime.handle_on_day(request("s1", "8pm"), DAY).await;
        assert_eq!(time.booking.time.as_deref(), Some("8:00 PM"));
        assert_eq!(stage_of(&runtime, "s1").await, Stage::Guests);

        let guests = runtime.handle_on_day(request("s1", "4"), DAY).await;
        assert_eq!(guests.booking.guests, 4);
        assert!(guests.reply.contains("Shall I confirm"));
        assert_eq!(stage_of(&runtime, "s1").await, Stage::Confirm);

        let confirmed = runtime.handle_on_day(request("s1", "yes"), DAY).await;
        assert!(confirmed.booking.confirmed);
        assert!(confirmed.order_number.is_some());
        assert_eq!(runtime.active_sessions(), 0, "completion destroys the session");
    }

    #[tokio::test]
    async fn cancel_destroys_the_session_and_a_new_one_starts_fresh() {
        let runtime = runtime_with(&["CANCEL"], BudgetQuotas::default(), 150);

        let _ = runtime.handle_on_day(request("s2", "hello"), DAY).await;
        let _ = runtime.handle_on_day(request("s2", "paris"), DAY).await;
        let cancelled = runtime.handle_on_day(request("s2", "actually cancel that"), DAY).await;

        assert!(cancelled.reply.contains("start fresh"));
        assert_eq!(runtime.active_sessions(), 0);

        let again = runtime.handle_on_day(request("s2", "hi again"), DAY).await;
        assert_eq!(again.booking.location, None);
        assert_eq!(stage_of(&runtime, "s2").await, Stage::Location);
    }

    #[tokio::test]
    async fn overlong_input_is_refused_before_any_budget_spend() {
        let runtime = runtime_with(&[], BudgetQuotas::default(), 5);

        let response = runtime
            .handle_on_day(request("s3", "one two three four five six seven"), DAY)
            .await;

        assert!(response.reply.contains("Message too long"));
        assert_eq!(runtime.budget_usage().total_tokens, 0);
        assert_eq!(response.booking, maitred_core::Booking::default());
    }

    #[tokio::test]
    async fn quota_exhaustion_refuses_without_touching_the_booking() {
        // One request costs 200+ tokens; a 300-token day admits exactly one.
        let quotas = BudgetQuotas { daily_tokens: 300, lifetime_tokens: 100_000 };
        let runtime = runtime_with(&[], quotas, 150);

        let first = runtime.handle_on_day(request("s4", "hi"), DAY).await;
        assert!(first.reply.contains("Which city"));

        let denied = runtime.handle_on_day(request("s4", "paris"), DAY).await;
        assert!(denied.reply.contains("Daily limit reached"));
        assert_eq!(denied.booking.location, None, "denied requests leave the booking alone");
        assert_eq!(stage_of(&runtime, "s4").await, Stage::Location);

        // Next day the same message is admitted again.
        let tomorrow = runtime.handle_on_day(request("s4", "paris"), "2026-08-08").await;
        assert_eq!(tomorrow.booking.location.as_ref().map(|id| id.as_str()), Some("paris"));
    }

    #[tokio::test]
    async fn last_question_is_remembered_for_the_next_turn() {
        let runtime = runtime_with(&["SELECT_VENUE", "Septime"], BudgetQuotas::default(), 150);

        let welcome = runtime.handle_on_day(request("s5", "hi"), DAY).await;
        assert!(welcome.reply.ends_with('?'));

        {
            let handle = runtime.sessions.checkout("s5");
            let session = handle.lock().await;
            assert_eq!(
                session.last_question.as_deref(),
                Some("Which city would you like to dine in?"),
            );
        }

        let _ = runtime.handle_on_day(request("s5", "paris"), DAY).await;
        let booked = runtime.handle_on_day(request("s5", "book Septime"), DAY).await;
        assert_eq!(booked.booking.venue.as_deref(), Some("Septime"));
    }

    #[tokio::test]
    async fn empty_session_id_maps_to_the_default_session() {
        let runtime = runtime_with(&[], BudgetQuotas::default(), 150);

        let _ = runtime
            .handle_on_day(
                super::ChatRequest { message: "hi".to_string(), session_id: String::new() },
                DAY,
            )
            .await;
        assert!(runtime.sessions.contains("default"));
    }
}
