//! Closed per-stage action vocabularies and the pure decision function that
//! maps a raw oracle reply onto one of them.
//!
//! The oracle is verbose and unreliable, so the scan is deliberately
//! tolerant: the first legal label contained anywhere in the reply wins, in
//! declared priority order, and anything else falls back to the stage's
//! `Other` action. The scan never touches the network; classifiers in the
//! agent crate own the prompt and the oracle call.

/// Returns the first label from `ordered_labels` contained in `reply`, or
/// `None`. Priority is the declaration order of the slice.
pub fn first_contained<'a>(reply: &str, ordered_labels: &[&'a str]) -> Option<&'a str> {
    ordered_labels.iter().find(|label| reply.contains(*label)).copied()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VenueAction {
    SelectVenue,
    AskAboutVenue,
    ChangeLocation,
    Cancel,
    Other,
}

impl VenueAction {
    pub const LABELS: [&'static str; 4] =
        ["SELECT_VENUE", "ASK_ABOUT_VENUE", "CHANGE_LOCATION", "CANCEL"];

    pub fn detect(reply: &str) -> Self {
        match first_contained(reply, &Self::LABELS) {
            Some("SELECT_VENUE") => Self::SelectVenue,
            Some("ASK_ABOUT_VENUE") => Self::AskAboutVenue,
            Some("CHANGE_LOCATION") => Self::ChangeLocation,
            Some("CANCEL") => Self::Cancel,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateAction {
    ProvideDate,
    GoBackVenue,
    GoBackLocation,
    ProvideGuests,
    Cancel,
    Other,
}

impl DateAction {
    pub const LABELS: [&'static str; 5] =
        ["PROVIDE_DATE", "GO_BACK_VENUE", "GO_BACK_LOCATION", "PROVIDE_GUESTS", "CANCEL"];

    pub fn detect(reply: &str) -> Self {
        match first_contained(reply, &Self::LABELS) {
            Some("PROVIDE_DATE") => Self::ProvideDate,
            Some("GO_BACK_VENUE") => Self::GoBackVenue,
            Some("GO_BACK_LOCATION") => Self::GoBackLocation,
            Some("PROVIDE_GUESTS") => Self::ProvideGuests,
            Some("CANCEL") => Self::Cancel,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeAction {
    ProvideTime,
    GoBackVenue,
    GoBackLocation,
    GoBackDate,
    Cancel,
    Other,
}

impl TimeAction {
    pub const LABELS: [&'static str; 5] =
        ["PROVIDE_TIME", "GO_BACK_VENUE", "GO_BACK_LOCATION", "GO_BACK_DATE", "CANCEL"];

    pub fn detect(reply: &str) -> Self {
        match first_contained(reply, &Self::LABELS) {
            Some("PROVIDE_TIME") => Self::ProvideTime,
            Some("GO_BACK_VENUE") => Self::GoBackVenue,
            Some("GO_BACK_LOCATION") => Self::GoBackLocation,
            Some("GO_BACK_DATE") => Self::GoBackDate,
            Some("CANCEL") => Self::Cancel,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuestAction {
    ProvideGuests,
    GoBackVenue,
    GoBackLocation,
    GoBackDate,
    ConfirmYes,
    ConfirmNo,
    Cancel,
    Other,
}

impl GuestAction {
    pub const LABELS: [&'static str; 7] = [
        "PROVIDE_GUESTS",
        "GO_BACK_VENUE",
        "GO_BACK_LOCATION",
        "GO_BACK_DATE",
        "CONFIRM_YES",
        "CONFIRM_NO",
        "CANCEL",
    ];

    pub fn detect(reply: &str) -> Self {
        match first_contained(reply, &Self::LABELS) {
            Some("PROVIDE_GUESTS") => Self::ProvideGuests,
            Some("GO_BACK_VENUE") => Self::GoBackVenue,
            Some("GO_BACK_LOCATION") => Self::GoBackLocation,
            Some("GO_BACK_DATE") => Self::GoBackDate,
            Some("CONFIRM_YES") => Self::ConfirmYes,
            Some("CONFIRM_NO") => Self::ConfirmNo,
            Some("CANCEL") => Self::Cancel,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    ConfirmYes,
    ConfirmNo,
    ChangeSomething,
    Other,
}

impl ConfirmAction {
    pub const LABELS: [&'static str; 3] = ["CONFIRM_YES", "CONFIRM_NO", "CHANGE_SOMETHING"];

    pub fn detect(reply: &str) -> Self {
        match first_contained(reply, &Self::LABELS) {
            Some("CONFIRM_YES") => Self::ConfirmYes,
            Some("CONFIRM_NO") => Self::ConfirmNo,
            Some("CHANGE_SOMETHING") => Self::ChangeSomething,
            _ => Self::Other,
        }
    }
}

/// Slot named by the follow-up query behind `ConfirmAction::ChangeSomething`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeTarget {
    Venue,
    Date,
    Time,
    Guests,
}

impl ChangeTarget {
    pub const LABELS: [&'static str; 4] = ["VENUE", "DATE", "TIME", "GUESTS"];

    pub fn detect(reply: &str) -> Option<Self> {
        match first_contained(reply, &Self::LABELS) {
            Some("VENUE") => Some(Self::Venue),
            Some("DATE") => Some(Self::Date),
            Some("TIME") => Some(Self::Time),
            Some("GUESTS") => Some(Self::Guests),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        first_contained, ChangeTarget, ConfirmAction, DateAction, GuestAction, TimeAction,
        VenueAction,
    };

    #[test]
    fn scan_returns_first_label_in_priority_order() {
        let reply = "The user wants to CANCEL, or possibly SELECT_VENUE.";
        assert_eq!(first_contained(reply, &VenueAction::LABELS), Some("SELECT_VENUE"));
        assert_eq!(VenueAction::detect(reply), VenueAction::SelectVenue);
    }

    #[test]
    fn verbose_replies_still_classify() {
        let reply = "Based on the message, the best action here is PROVIDE_DATE because \
                     the user mentioned a concrete day.";
        assert_eq!(DateAction::detect(reply), DateAction::ProvideDate);
    }

    #[test]
    fn empty_or_garbage_replies_default_to_other() {
        assert_eq!(VenueAction::detect(""), VenueAction::Other);
        assert_eq!(TimeAction::detect("I am not sure what you mean"), TimeAction::Other);
        assert_eq!(GuestAction::detect("42"), GuestAction::Other);
        assert_eq!(ConfirmAction::detect("maybe?"), ConfirmAction::Other);
    }

    #[test]
    fn confirm_yes_and_no_do_not_shadow_each_other() {
        assert_eq!(GuestAction::detect("CONFIRM_NO"), GuestAction::ConfirmNo);
        assert_eq!(ConfirmAction::detect("CONFIRM_NO"), ConfirmAction::ConfirmNo);
        assert_eq!(ConfirmAction::detect("CONFIRM_YES"), ConfirmAction::ConfirmYes);
    }

    #[test]
    fn change_target_is_optional() {
        assert_eq!(ChangeTarget::detect("change the TIME please"), Some(ChangeTarget::Time));
        assert_eq!(ChangeTarget::detect("something else entirely"), None);
    }
}
