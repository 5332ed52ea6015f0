use std::sync::Mutex;

/// Rough per-request cost: ~1.3 tokens per input word plus a flat allowance
/// for the prompt scaffolding added around the utterance.
pub fn estimate_request_tokens(word_count: usize) -> u64 {
    (word_count as f64 * 1.3).ceil() as u64 + 200
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Calendar label used for the daily reset. Reset fires on label inequality,
/// not on elapsed time.
pub fn today_label() -> String {
    chrono::Local::now().date_naive().to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetQuotas {
    pub daily_tokens: u64,
    pub lifetime_tokens: u64,
}

impl Default for BudgetQuotas {
    fn default() -> Self {
        Self { daily_tokens: 10_000_000, lifetime_tokens: 100_000_000 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Granted,
    DailyExhausted,
    LifetimeExhausted,
}

impl Admission {
    /// Fixed refusal wording for denied requests; `None` when admitted.
    pub fn refusal(&self) -> Option<&'static str> {
        match self {
            Self::Granted => None,
            Self::DailyExhausted => Some("Daily limit reached. Please try again tomorrow."),
            Self::LifetimeExhausted => {
                Some("Service temporarily unavailable. Global token limit reached.")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetUsage {
    pub daily_tokens: u64,
    pub daily_reset_label: String,
    pub total_tokens: u64,
}

#[derive(Debug)]
struct LedgerState {
    daily_tokens: u64,
    daily_reset_label: String,
    total_tokens: u64,
}

/// Process-wide oracle-usage ledger shared by every session. Admission and
/// accounting happen inside one critical section so concurrent requests
/// cannot jointly overrun a quota.
#[derive(Debug)]
pub struct BudgetLedger {
    quotas: BudgetQuotas,
    state: Mutex<LedgerState>,
}

impl BudgetLedger {
    pub fn new(quotas: BudgetQuotas) -> Self {
        Self {
            quotas,
            state: Mutex::new(LedgerState {
                daily_tokens: 0,
                daily_reset_label: String::new(),
                total_tokens: 0,
            }),
        }
    }

    /// Check-then-increment for one request. A denied request consumes no
    /// budget; a granted one is charged immediately.
    pub fn admit(&self, estimated_tokens: u64, today: &str) -> Admission {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.daily_reset_label != today {
            state.daily_tokens = 0;
            state.daily_reset_label = today.to_string();
        }

        if state.total_tokens + estimated_tokens > self.quotas.lifetime_tokens {
            return Admission::LifetimeExhausted;
        }
        if state.daily_tokens + estimated_tokens > self.quotas.daily_tokens {
            return Admission::DailyExhausted;
        }

        state.daily_tokens += estimated_tokens;
        state.total_tokens += estimated_tokens;
        Admission::Granted
    }

    pub fn usage(&self) -> BudgetUsage {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        BudgetUsage {
            daily_tokens: state.daily_tokens,
            daily_reset_label: state.daily_reset_label.clone(),
            total_tokens: state.total_tokens,
        }
    }
}

impl Default for BudgetLedger {
    fn default() -> Self {
        Self::new(BudgetQuotas::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{estimate_request_tokens, word_count, Admission, BudgetLedger, BudgetQuotas};

    #[test]
    fn denial_near_the_daily_quota_leaves_counters_unchanged() {
        let ledger = BudgetLedger::new(BudgetQuotas { daily_tokens: 10, lifetime_tokens: 1_000 });
        assert_eq!(ledger.admit(9, "2026-08-07"), Admission::Granted);

        let denied = ledger.admit(2, "2026-08-07");
        assert_eq!(denied, Admission::DailyExhausted);
        assert!(denied.refusal().expect("denial carries a refusal").contains("Daily limit"));

        let usage = ledger.usage();
        assert_eq!(usage.daily_tokens, 9);
        assert_eq!(usage.total_tokens, 9);
    }

    #[test]
    fn label_rollover_resets_the_daily_counter_before_admission() {
        let ledger = BudgetLedger::new(BudgetQuotas { daily_tokens: 10, lifetime_tokens: 1_000 });
        assert_eq!(ledger.admit(10, "2026-08-07"), Admission::Granted);
        assert_eq!(ledger.admit(1, "2026-08-07"), Admission::DailyExhausted);

        assert_eq!(ledger.admit(1, "2026-08-08"), Admission::Granted);
        let usage = ledger.usage();
        assert_eq!(usage.daily_tokens, 1);
        assert_eq!(usage.daily_reset_label, "2026-08-08");
        assert_eq!(usage.total_tokens, 11, "lifetime spend is monotonic across resets");
    }

    #[test]
    fn lifetime_quota_survives_the_daily_reset() {
        let ledger = BudgetLedger::new(BudgetQuotas { daily_tokens: 100, lifetime_tokens: 10 });
        assert_eq!(ledger.admit(10, "2026-08-07"), Admission::Granted);

        let denied = ledger.admit(1, "2026-08-08");
        assert_eq!(denied, Admission::LifetimeExhausted);
        assert_eq!(ledger.usage().total_tokens, 10);
    }

    #[test]
    fn estimate_scales_with_word_count() {
        assert_eq!(estimate_request_tokens(0), 200);
        assert_eq!(estimate_request_tokens(10), 213);
        assert_eq!(word_count("  book   Septime tonight "), 3);
        assert_eq!(word_count(""), 0);
    }
}
