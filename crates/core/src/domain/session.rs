use serde::{Deserialize, Serialize};

use crate::domain::booking::Booking;

/// Position in the booking conversation. `Init` exists only until the first
/// utterance is seen; the welcome turn moves straight to `Location`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Init,
    Location,
    Venue,
    Date,
    Time,
    Guests,
    Confirm,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Location => "location",
            Self::Venue => "venue",
            Self::Date => "date",
            Self::Time => "time",
            Self::Guests => "guests",
            Self::Confirm => "confirm",
        }
    }
}

/// Per-conversation state. Ids are opaque and caller-supplied; sessions are
/// created on first reference and destroyed on cancellation or completion.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub booking: Booking,
    pub stage: Stage,
    pub last_question: Option<String>,
    pub last_referenced_venue: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            booking: Booking::default(),
            stage: Stage::Init,
            last_question: None,
            last_referenced_venue: None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, Stage};

    #[test]
    fn fresh_sessions_start_empty_at_init() {
        let session = Session::new();
        assert_eq!(session.stage, Stage::Init);
        assert_eq!(session.booking.guests, 0);
        assert!(!session.booking.confirmed);
        assert!(session.last_question.is_none());
        assert!(session.last_referenced_venue.is_none());
    }
}
