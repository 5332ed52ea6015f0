//! Per-stage intent classifiers. Each builds a prompt naming exactly the
//! stage's legal labels, hands it to the gateway, and lets the pure scanners
//! in `maitred_core::intent` pick the label out of whatever the oracle says.

use maitred_core::intent::{
    ChangeTarget, ConfirmAction, DateAction, GuestAction, TimeAction, VenueAction,
};
use maitred_core::Booking;

use crate::oracle::{OracleGateway, LABEL_REPLY_TOKENS};
use crate::resolvers::context_line;

pub async fn venue_action(
    gateway: &OracleGateway,
    message: &str,
    venue_names: &str,
    last_question: Option<&str>,
) -> VenueAction {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User replied: \"{message}\"\n\
         Available restaurants: {venue_names}\n\n\
         What does the user want? Pick ONE action:\n\
         - ASK_ABOUT_VENUE: asking for info/details about a restaurant (\"tell me about X\", \"tell me more about X\", \"what's X like?\", \"more info on X\", \"describe X\")\n\
         - SELECT_VENUE: wants to BOOK a restaurant NOW (\"book X\", \"reserve X\", \"I'll take X\", \"yes\", \"book it\", \"let's go with X\")\n\
         - CHANGE_LOCATION: mentions a different city/country\n\
         - CANCEL: wants to cancel\n\
         - OTHER: comparing restaurants, general questions (\"which is best?\", \"recommend one\", \"cheapest?\")\n\n\
         IMPORTANT:\n\
         - \"tell me more about X\" = ASK_ABOUT_VENUE (asking for info, NOT booking)\n\
         - \"tell me about X\" = ASK_ABOUT_VENUE\n\
         - \"book X\" = SELECT_VENUE (explicit booking)\n\
         - \"I want X\" = SELECT_VENUE\n\
         Reply with ONE action name only."
    );

    VenueAction::detect(&gateway.generate(&prompt, LABEL_REPLY_TOKENS).await)
}

pub async fn date_action(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
) -> DateAction {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User replied: \"{message}\"\n\n\
         What does the user want? Pick ONE action:\n\
         - PROVIDE_DATE: giving a date (e.g., \"dec 30\", \"january 5\", \"tomorrow\", \"next friday\")\n\
         - GO_BACK_VENUE: wants different restaurant\n\
         - GO_BACK_LOCATION: wants different city\n\
         - PROVIDE_GUESTS: giving number of guests like \"5\", \"2 people\"\n\
         - CANCEL: wants to cancel\n\
         - OTHER: uncertain, asking questions (\"i dont know\", \"not sure\")\n\n\
         Reply with ONE action name only."
    );

    DateAction::detect(&gateway.generate(&prompt, LABEL_REPLY_TOKENS).await)
}

pub async fn time_action(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
) -> TimeAction {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User replied: \"{message}\"\n\n\
         What does the user want? Pick ONE action:\n\
         - PROVIDE_TIME: giving a time (e.g., \"7pm\", \"8:30\", \"19:00\", \"dinner time\", \"evening\")\n\
         - GO_BACK_VENUE: wants different restaurant\n\
         - GO_BACK_LOCATION: wants different city\n\
         - GO_BACK_DATE: wants to change the date\n\
         - CANCEL: wants to cancel\n\
         - OTHER: uncertain, asking questions\n\n\
         Reply with ONE action name only."
    );

    TimeAction::detect(&gateway.generate(&prompt, LABEL_REPLY_TOKENS).await)
}

pub async fn guest_action(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
) -> GuestAction {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User replied: \"{message}\"\n\n\
         What does the user want? Pick ONE action:\n\
         - PROVIDE_GUESTS: giving a number of guests (\"2\", \"4\", \"just me\", \"me and wife\", \"3 people\")\n\
         - GO_BACK_VENUE: wants different restaurant\n\
         - GO_BACK_LOCATION: wants different city\n\
         - GO_BACK_DATE: wants to change date/time\n\
         - CONFIRM_YES: confirming like \"yes\", \"correct\", \"right\"\n\
         - CONFIRM_NO: denying like \"no\", \"wrong\"\n\
         - CANCEL: wants to cancel\n\
         - OTHER: asking questions (\"why?\", \"what's the max?\")\n\n\
         \"2\"=PROVIDE_GUESTS, \"4\"=PROVIDE_GUESTS.\n\
         Reply with ONE action name only."
    );

    GuestAction::detect(&gateway.generate(&prompt, LABEL_REPLY_TOKENS).await)
}

pub async fn confirm_action(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
) -> ConfirmAction {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User replied: \"{message}\"\n\n\
         What does the user want? Pick ONE action:\n\
         - CONFIRM_YES: confirming the reservation (\"yes\", \"confirm\", \"book it\")\n\
         - CONFIRM_NO: rejecting/cancelling (\"no\", \"cancel\")\n\
         - CHANGE_SOMETHING: wants to change something\n\
         - OTHER: uncertain, asking questions\n\n\
         Reply with ONE action name only."
    );

    ConfirmAction::detect(&gateway.generate(&prompt, LABEL_REPLY_TOKENS).await)
}

/// Follow-up to `CHANGE_SOMETHING`: which slot does the user want to change?
pub async fn change_target(
    gateway: &OracleGateway,
    message: &str,
    booking: &Booking,
) -> Option<ChangeTarget> {
    let venue = booking.venue.as_deref().unwrap_or("-");
    let date = booking.date.as_deref().unwrap_or("-");
    let time = booking.time.as_deref().unwrap_or("-");
    let prompt = format!(
        "Query: \"{message}\"\n\
         Booking: Venue={venue}, Date={date}, Time={time}, Guests={guests}\n\n\
         What to change? VENUE, DATE, TIME, GUESTS, or OTHER?",
        guests = booking.guests,
    );

    ChangeTarget::detect(&gateway.generate(&prompt, LABEL_REPLY_TOKENS).await)
}

/// LOCATION-stage filter for task requests that have nothing to do with
/// dining. Only an explicit UNRELATED verdict counts; everything else,
/// including oracle failure, is treated as related.
pub async fn unrelated_request(gateway: &OracleGateway, message: &str) -> bool {
    let prompt = format!(
        "User: \"{message}\"\n\n\
         Is this asking you to DO a task unrelated to restaurants/dining/travel?\n\
         UNRELATED examples: \"write code for me\", \"solve 2+2\", \"what's the weather\", \"translate this\", \"create an app\"\n\
         RELATED examples: \"hey\", \"hello\", \"can we do X\", \"i want X\", \"how about X\", \"switzerland\", \"paris\", \"near the tower\"\n\n\
         Greetings = RELATED\n\
         Locations/countries/cities/landmarks = RELATED\n\
         \"can we do [place]\" = RELATED\n\
         Wanting/asking about places = RELATED\n\
         Asking for non-restaurant tasks = UNRELATED\n\n\
         Reply RELATED or UNRELATED only."
    );

    gateway.generate(&prompt, LABEL_REPLY_TOKENS).await.to_uppercase().contains("UNRELATED")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use maitred_core::intent::{ConfirmAction, DateAction, GuestAction, VenueAction};
    use maitred_core::Booking;

    use super::{change_target, confirm_action, date_action, guest_action, unrelated_request,
        venue_action};
    use crate::oracle::{OracleGateway, ScriptedOracle};

    fn scripted(replies: &[&str]) -> (Arc<ScriptedOracle>, OracleGateway) {
        let oracle = Arc::new(ScriptedOracle::new(replies));
        let gateway = OracleGateway::new(Arc::clone(&oracle) as _);
        (oracle, gateway)
    }

    #[tokio::test]
    async fn venue_prompt_names_every_legal_label_and_the_context() {
        let (oracle, gateway) = scripted(&["SELECT_VENUE"]);
        let action = venue_action(
            &gateway,
            "book Septime",
            "Le Cinq, Septime, Le Clarence",
            Some("Which restaurant interests you?"),
        )
        .await;

        assert_eq!(action, VenueAction::SelectVenue);
        let prompts = oracle.prompts();
        assert_eq!(prompts.len(), 1);
        for label in VenueAction::LABELS {
            assert!(prompts[0].contains(label), "prompt should name {label}");
        }
        assert!(prompts[0].contains("AI just asked: \"Which restaurant interests you?\""));
        assert!(prompts[0].contains("Le Cinq, Septime, Le Clarence"));
    }

    #[tokio::test]
    async fn verbose_or_empty_replies_fall_back_to_other() {
        let (_, gateway) = scripted(&["that sounds like it could be several things"]);
        assert_eq!(date_action(&gateway, "hmm", None).await, DateAction::Other);

        let (_, gateway) = scripted(&[]);
        assert_eq!(guest_action(&gateway, "hmm", None).await, GuestAction::Other);
        assert_eq!(confirm_action(&gateway, "hmm", None).await, ConfirmAction::Other);
    }

    #[tokio::test]
    async fn change_target_reads_the_booking_into_the_prompt() {
        let booking = Booking {
            venue: Some("Septime".to_string()),
            date: Some("Dec 24".to_string()),
            time: Some("8:00 PM".to_string()),
            guests: 4,
            ..Booking::default()
        };

        let (oracle, gateway) = scripted(&["GUESTS"]);
        let target = change_target(&gateway, "make it six people", &booking).await;

        assert_eq!(target, Some(maitred_core::intent::ChangeTarget::Guests));
        assert!(oracle.prompts()[0].contains("Venue=Septime, Date=Dec 24, Time=8:00 PM, Guests=4"));
    }

    #[tokio::test]
    async fn unrelated_filter_requires_an_explicit_verdict() {
        let (_, gateway) = scripted(&["UNRELATED"]);
        assert!(unrelated_request(&gateway, "write me a compiler").await);

        let (_, gateway) = scripted(&["RELATED"]);
        assert!(!unrelated_request(&gateway, "paris?").await);

        let (_, gateway) = scripted(&[]);
        assert!(!unrelated_request(&gateway, "anything").await, "oracle failure means related");
    }
}
