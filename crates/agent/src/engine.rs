use std::sync::Arc;

use maitred_core::catalog::{Catalog, Location, Venue};
use maitred_core::intent::{ChangeTarget, ConfirmAction, DateAction, GuestAction, TimeAction,
    VenueAction};
use maitred_core::{Booking, Session, Stage};
use rand::Rng;

use crate::classifiers;
use crate::oracle::{OracleGateway, CHAT_REPLY_TOKENS};
use crate::resolvers;

pub const MAX_GUESTS: u8 = 10;

const GREETINGS: [&str; 9] =
    ["hi", "hey", "hello", "hola", "hej", "howdy", "yo", "sup", "greetings"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionDisposition {
    Continue,
    End,
}

/// What one turn produced: the reply, an optional venue list for the current
/// location, an optional confirmation code, and whether the session is over.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub reply: String,
    pub venues: Option<Vec<Venue>>,
    pub confirmation_code: Option<String>,
    pub disposition: SessionDisposition,
}

impl TurnOutcome {
    fn say(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            venues: None,
            confirmation_code: None,
            disposition: SessionDisposition::Continue,
        }
    }

    fn with_venues(mut self, venues: Vec<Venue>) -> Self {
        self.venues = Some(venues);
        self
    }

    fn ending(mut self) -> Self {
        self.disposition = SessionDisposition::End;
        self
    }
}

/// Stage state machine. One handler per stage; every handler leaves the
/// booking and stage untouched when neither classification nor resolution
/// produced anything usable, so a bad oracle reply can never corrupt state.
pub struct DialogueEngine {
    catalog: Arc<Catalog>,
    gateway: OracleGateway,
}

impl DialogueEngine {
    pub fn new(catalog: Arc<Catalog>, gateway: OracleGateway) -> Self {
        Self { catalog, gateway }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn handle(&self, session: &mut Session, message: &str) -> TurnOutcome {
        match session.stage {
            Stage::Init => {
                session.stage = Stage::Location;
                TurnOutcome::say(
                    "Welcome! I can help you book Michelin-starred restaurants across Europe. \
                     Which city would you like to dine in?",
                )
            }
            Stage::Location => self.handle_location(session, message).await,
            Stage::Venue => self.handle_venue(session, message).await,
            Stage::Date => self.handle_date(session, message).await,
            Stage::Time => self.handle_time(session, message).await,
            Stage::Guests => self.handle_guests(session, message).await,
            Stage::Confirm => self.handle_confirm(session, message).await,
        }
    }

    async fn handle_location(&self, session: &mut Session, message: &str) -> TurnOutcome {
        if is_greeting(message) {
            return TurnOutcome::say(
                "Hey there! Ready to find you a great Michelin restaurant. \
                 Which European city would you like to dine in?",
            );
        }

        if let Some(found) = resolvers::resolve_location(&self.gateway, &self.catalog, message).await
        {
            session.booking.location = Some(found.id.clone());
            session.stage = Stage::Venue;
            let venues = self.catalog.venues_in(&found.id);
            let reply = format!(
                "{}! We have {} Michelin restaurants:\n\n{}\nClick a restaurant card or tell me \
                 which one interests you.",
                found.display_name,
                venues.len(),
                venue_lines(&venues),
            );
            return TurnOutcome::say(reply).with_venues(cloned(&venues));
        }

        if let Some(place) =
            resolvers::unsupported_location(&self.gateway, &self.catalog, message).await
        {
            let covered = self
                .catalog
                .locations()
                .iter()
                .map(|location| location.display_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return TurnOutcome::say(format!(
                "Sorry, we don't have restaurants in {place} yet. We cover {covered}. \
                 Which city interests you?"
            ));
        }

        if classifiers::unrelated_request(&self.gateway, message).await {
            return TurnOutcome::say(
                "I'm a Michelin restaurant booking assistant - I can only help with restaurant \
                 reservations across Europe. Which city would you like to dine in?",
            );
        }

        let prompt = format!(
            "You are a friendly Michelin restaurant booking assistant.\n\
             User said: \"{message}\"\n\
             Respond naturally and briefly. Then ask which European city they'd like to dine in. \
             Keep response to 1-2 sentences max."
        );
        let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
        TurnOutcome::say(non_empty(reply, "Which European city would you like to dine in?"))
    }

    async fn handle_venue(&self, session: &mut Session, message: &str) -> TurnOutcome {
        let Some(location_id) = session.booking.location.clone() else {
            session.stage = Stage::Location;
            return TurnOutcome::say("Which European city would you like to dine in?");
        };
        let venues = self.catalog.venues_in(&location_id);
        let names = venues.iter().map(|venue| venue.name.as_str()).collect::<Vec<_>>().join(", ");

        let action = classifiers::venue_action(
            &self.gateway,
            message,
            &names,
            session.last_question.as_deref(),
        )
        .await;

        match action {
            VenueAction::Cancel => cancel(session),
            VenueAction::ChangeLocation => {
                if let Some(found) =
                    resolvers::resolve_location(&self.gateway, &self.catalog, message).await
                {
                    if Some(&found.id) != session.booking.location.as_ref() {
                        session.booking.rewind(Stage::Venue);
                        session.booking.location = Some(found.id.clone());
                        session.last_referenced_venue = None;
                        let moved = self.catalog.venues_in(&found.id);
                        let reply = format!(
                            "Switching to {}!\n\n{}\nWhich restaurant interests you?",
                            found.display_name,
                            venue_lines(&moved),
                        );
                        return TurnOutcome::say(reply).with_venues(cloned(&moved));
                    }
                }
                if let Some(place) =
                    resolvers::unsupported_location(&self.gateway, &self.catalog, message).await
                {
                    let staying = self.location_display(&session.booking.location);
                    return TurnOutcome::say(format!(
                        "Sorry, we don't have restaurants in {place}. \
                         Which restaurant in {staying} would you like?"
                    ));
                }
                self.venue_fallback(session, &venues, message).await
            }
            VenueAction::SelectVenue => {
                if let Some(name) = session.last_referenced_venue.clone() {
                    if let Some(venue) = self.catalog.find_venue(&location_id, &name) {
                        session.booking.venue = Some(venue.name.clone());
                        session.last_referenced_venue = None;
                        session.stage = Stage::Date;
                        return TurnOutcome::say(format!(
                            "Excellent! {} - {} Michelin.\n\nWhat date would you like to dine?",
                            venue.name,
                            venue.stars(),
                        ));
                    }
                }
                if let Some(venue) = resolvers::resolve_venue(&self.gateway, &venues, message).await
                {
                    session.booking.venue = Some(venue.name.clone());
                    session.last_referenced_venue = None;
                    session.stage = Stage::Date;
                    return TurnOutcome::say(format!(
                        "Great choice! {} - {} Michelin, €{} tasting menu.\n\n\
                         What date would you like to reserve?",
                        venue.name,
                        venue.stars(),
                        venue.price_eur,
                    ));
                }
                self.venue_fallback(session, &venues, message).await
            }
            VenueAction::AskAboutVenue => {
                if let Some(venue) = resolvers::resolve_venue(&self.gateway, &venues, message).await
                {
                    session.last_referenced_venue = Some(venue.name.clone());
                    let prompt = format!(
                        "User asked: \"{message}\"\n\n\
                         Restaurant: {}\n\
                         Stars: {} Michelin\n\
                         Price: €{} per person\n\
                         Cuisine: {}\n\
                         Description: {}\n\
                         Signature: {}\n\n\
                         Answer the question about THIS restaurant. Be concise. \
                         Ask if they'd like to book.",
                        venue.name,
                        venue.stars(),
                        venue.price_eur,
                        venue.cuisine,
                        venue.description,
                        venue.signature,
                    );
                    let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
                    let fallback =
                        format!("{} is a lovely choice. Would you like to book it?", venue.name);
                    return TurnOutcome::say(non_empty(reply, &fallback));
                }
                self.venue_fallback(session, &venues, message).await
            }
            VenueAction::Other => self.venue_fallback(session, &venues, message).await,
        }
    }

    async fn handle_date(&self, session: &mut Session, message: &str) -> TurnOutcome {
        let action =
            classifiers::date_action(&self.gateway, message, session.last_question.as_deref())
                .await;

        match action {
            DateAction::Cancel => cancel(session),
            DateAction::GoBackVenue => self.back_to_venues(session),
            DateAction::GoBackLocation => back_to_location(session),
            DateAction::ProvideDate => {
                let today = resolvers::today_sentence();
                if let Some(date) = resolvers::extract_date(
                    &self.gateway,
                    message,
                    session.last_question.as_deref(),
                    &today,
                )
                .await
                {
                    session.booking.date = Some(date.clone());
                    session.stage = Stage::Time;
                    return TurnOutcome::say(format!(
                        "{date}. What time would you like to dine? (e.g., 7pm, 8:30pm)"
                    ));
                }
                self.date_fallback(session, message).await
            }
            DateAction::ProvideGuests => {
                match resolvers::extract_guests(
                    &self.gateway,
                    message,
                    session.last_question.as_deref(),
                )
                .await
                {
                    Some(guests) if (1..=MAX_GUESTS).contains(&guests) => {
                        session.booking.guests = guests;
                        TurnOutcome::say(format!(
                            "Noted, {guests} guests. What date would you like?"
                        ))
                    }
                    _ => self.date_fallback(session, message).await,
                }
            }
            DateAction::Other => self.date_fallback(session, message).await,
        }
    }

    async fn handle_time(&self, session: &mut Session, message: &str) -> TurnOutcome {
        let action =
            classifiers::time_action(&self.gateway, message, session.last_question.as_deref())
                .await;

        match action {
            TimeAction::Cancel => cancel(session),
            TimeAction::GoBackVenue => self.back_to_venues(session),
            TimeAction::GoBackLocation => back_to_location(session),
            TimeAction::GoBackDate => back_to_date(session),
            TimeAction::ProvideTime => {
                if let Some(time) = resolvers::extract_time(
                    &self.gateway,
                    message,
                    session.last_question.as_deref(),
                )
                .await
                {
                    session.booking.time = Some(time.clone());
                    session.stage = Stage::Guests;
                    let date = session.booking.date.clone().unwrap_or_default();
                    return TurnOutcome::say(format!("{date} at {time}. How many guests?"));
                }
                self.time_fallback(session, message).await
            }
            TimeAction::Other => self.time_fallback(session, message).await,
        }
    }

    async fn handle_guests(&self, session: &mut Session, message: &str) -> TurnOutcome {
        let action =
            classifiers::guest_action(&self.gateway, message, session.last_question.as_deref())
                .await;

        match action {
            GuestAction::Cancel => cancel(session),
            GuestAction::GoBackVenue => self.back_to_venues(session),
            GuestAction::GoBackLocation => back_to_location(session),
            GuestAction::GoBackDate => back_to_date(session),
            GuestAction::ConfirmYes if session.booking.guests > 0 => {
                session.stage = Stage::Confirm;
                TurnOutcome::say(self.summary(&session.booking))
            }
            GuestAction::ConfirmNo if session.booking.guests > 0 => {
                session.booking.guests = 0;
                TurnOutcome::say("No problem! How many guests will be dining?")
            }
            GuestAction::ProvideGuests => {
                match resolvers::extract_guests(
                    &self.gateway,
                    message,
                    session.last_question.as_deref(),
                )
                .await
                {
                    Some(guests) if guests > MAX_GUESTS => TurnOutcome::say(
                        "For parties larger than 10, please contact the restaurant directly. \
                         How many guests (up to 10)?",
                    ),
                    Some(guests) if guests >= 1 => {
                        session.booking.guests = guests;
                        session.stage = Stage::Confirm;
                        TurnOutcome::say(self.summary(&session.booking))
                    }
                    _ => self.guests_fallback(session, message).await,
                }
            }
            _ => self.guests_fallback(session, message).await,
        }
    }

    async fn handle_confirm(&self, session: &mut Session, message: &str) -> TurnOutcome {
        let action =
            classifiers::confirm_action(&self.gateway, message, session.last_question.as_deref())
                .await;

        match action {
            ConfirmAction::ConfirmNo => {
                session.booking = Booking::default();
                TurnOutcome::say(
                    "No problem, reservation cancelled. Would you like to start a new search?",
                )
                .ending()
            }
            ConfirmAction::ConfirmYes => {
                session.booking.confirmed = true;
                let code = confirmation_code();
                let mut outcome = TurnOutcome::say(format!(
                    "Reservation confirmed! Reference: #{code}\n\nEnjoy your dining experience!"
                ))
                .ending();
                outcome.confirmation_code = Some(code);
                outcome
            }
            ConfirmAction::ChangeSomething => {
                match classifiers::change_target(&self.gateway, message, &session.booking).await {
                    Some(ChangeTarget::Venue) => {
                        session.booking.rewind(Stage::Venue);
                        session.stage = Stage::Venue;
                        let Some(location_id) = session.booking.location.clone() else {
                            session.stage = Stage::Location;
                            return TurnOutcome::say(
                                "Which European city would you like to dine in?",
                            );
                        };
                        let venues = self.catalog.venues_in(&location_id);
                        let reply = format!(
                            "No problem!\n\n{}\nWhich restaurant would you like?",
                            venue_lines(&venues),
                        );
                        TurnOutcome::say(reply).with_venues(cloned(&venues))
                    }
                    Some(ChangeTarget::Date) => {
                        session.booking.rewind(Stage::Date);
                        session.stage = Stage::Date;
                        TurnOutcome::say("What date would you prefer?")
                    }
                    Some(ChangeTarget::Time) => {
                        session.booking.rewind(Stage::Time);
                        session.stage = Stage::Time;
                        TurnOutcome::say("What time would you prefer?")
                    }
                    Some(ChangeTarget::Guests) => {
                        // A count supplied in the same utterance re-emits the
                        // summary in place; otherwise drop back one stage.
                        match resolvers::extract_guests(
                            &self.gateway,
                            message,
                            session.last_question.as_deref(),
                        )
                        .await
                        {
                            Some(guests) if guests > MAX_GUESTS => TurnOutcome::say(
                                "For parties larger than 10, please contact the restaurant \
                                 directly. How many guests (up to 10)?",
                            ),
                            Some(guests) if guests >= 1 => {
                                session.booking.guests = guests;
                                TurnOutcome::say(self.summary(&session.booking))
                            }
                            _ => {
                                session.booking.rewind(Stage::Guests);
                                session.stage = Stage::Guests;
                                TurnOutcome::say("How many guests will be dining?")
                            }
                        }
                    }
                    None => TurnOutcome::say(
                        "What would you like to change - restaurant, date, time, or number of \
                         guests?",
                    ),
                }
            }
            ConfirmAction::Other => self.confirm_fallback(session, message).await,
        }
    }

    fn back_to_venues(&self, session: &mut Session) -> TurnOutcome {
        session.booking.rewind(Stage::Venue);
        session.last_referenced_venue = None;
        let Some(location_id) = session.booking.location.clone() else {
            session.stage = Stage::Location;
            return TurnOutcome::say("Which European city would you like to dine in?");
        };
        session.stage = Stage::Venue;
        let venues = self.catalog.venues_in(&location_id);
        let reply = format!(
            "No problem! Here are the restaurants:\n\n{}\nWhich one interests you?",
            venue_lines(&venues),
        );
        TurnOutcome::say(reply).with_venues(cloned(&venues))
    }

    async fn venue_fallback(
        &self,
        session: &Session,
        venues: &[&Venue],
        message: &str,
    ) -> TurnOutcome {
        let details = venues
            .iter()
            .map(|venue| {
                format!(
                    "{}: {}, €{}, {} - {}",
                    venue.name,
                    venue.stars(),
                    venue.price_eur,
                    venue.cuisine,
                    venue.description,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let city = self.location_display(&session.booking.location);
        let prompt = format!(
            "You are a Michelin restaurant booking assistant.\n\
             City: {city}\n\
             Available restaurants:\n{details}\n\n\
             User said: \"{message}\"\n\n\
             Answer their question or respond naturally using the restaurant info above. \
             Be helpful. Then ask which restaurant they'd like to book."
        );
        let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
        TurnOutcome::say(non_empty(reply, "Which restaurant would you like to book?"))
    }

    async fn date_fallback(&self, session: &Session, message: &str) -> TurnOutcome {
        let venue = session.booking.venue.as_deref().unwrap_or("your restaurant");
        let city = self.location_display(&session.booking.location);
        let prompt = format!(
            "You are a Michelin restaurant booking assistant.\n\
             Current: {venue} in {city}.\n\
             User said: \"{message}\"\n\
             Answer naturally, then ask for the date they'd like to dine."
        );
        let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
        TurnOutcome::say(non_empty(reply, "What date would you like to dine?"))
    }

    async fn time_fallback(&self, session: &Session, message: &str) -> TurnOutcome {
        let venue = session.booking.venue.as_deref().unwrap_or("your restaurant");
        let date = session.booking.date.as_deref().unwrap_or("your date");
        let prompt = format!(
            "You are a Michelin restaurant booking assistant.\n\
             Current: {venue} on {date}.\n\
             User said: \"{message}\"\n\
             Answer naturally, then ask what time they'd like to dine."
        );
        let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
        TurnOutcome::say(non_empty(reply, "What time would you like to dine?"))
    }

    async fn guests_fallback(&self, session: &Session, message: &str) -> TurnOutcome {
        let venue = session.booking.venue.as_deref().unwrap_or("your restaurant");
        let date = session.booking.date.as_deref().unwrap_or("your date");
        let time = session.booking.time.as_deref().unwrap_or("your time");
        let prompt = format!(
            "You are a Michelin restaurant booking assistant.\n\
             Current: {venue}, {date} at {time}.\n\
             User said: \"{message}\"\n\
             Answer naturally, then ask how many guests will be dining (up to 10)."
        );
        let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
        TurnOutcome::say(non_empty(reply, "How many guests will be dining (up to 10)?"))
    }

    async fn confirm_fallback(&self, session: &Session, message: &str) -> TurnOutcome {
        let booking = &session.booking;
        let venue = booking.venue.as_deref().unwrap_or("your restaurant");
        let date = booking.date.as_deref().unwrap_or("your date");
        let time = booking.time.as_deref().unwrap_or("your time");
        let price = self
            .venue_record(booking)
            .map(|venue| venue.price_eur.to_string())
            .unwrap_or_else(|| "-".to_string());
        let prompt = format!(
            "You are a Michelin restaurant booking assistant.\n\
             Reservation: {venue}, {date} at {time}, {guests} guests.\n\
             Price: €{price}/person.\n\
             User said: \"{message}\"\n\
             Answer naturally, then ask if they'd like to confirm the reservation.",
            guests = booking.guests,
        );
        let reply = self.gateway.generate(&prompt, CHAT_REPLY_TOKENS).await;
        TurnOutcome::say(non_empty(reply, "Shall I confirm this reservation?"))
    }

    fn summary(&self, booking: &Booking) -> String {
        let venue_name = booking.venue.as_deref().unwrap_or("-");
        let city = self.location_display(&booking.location);
        let (stars, price) = match self.venue_record(booking) {
            Some(venue) => (venue.stars(), venue.price_eur.to_string()),
            None => ("★".to_string(), "-".to_string()),
        };
        let date = booking.date.as_deref().unwrap_or("-");
        let time = booking.time.as_deref().unwrap_or("-");
        let plural = if booking.guests > 1 { "s" } else { "" };

        format!(
            "Perfect! Here's your reservation:\n\n\
             {venue_name} - {city}\n\
             {stars} Michelin\n\
             {date} at {time}\n\
             {guests} guest{plural}\n\
             €{price}/person\n\n\
             Shall I confirm this reservation?",
            guests = booking.guests,
        )
    }

    fn venue_record(&self, booking: &Booking) -> Option<&Venue> {
        let location = booking.location.as_ref()?;
        let name = booking.venue.as_deref()?;
        self.catalog.find_venue(location, name)
    }

    fn location_display(&self, id: &Option<maitred_core::LocationId>) -> String {
        id.as_ref()
            .and_then(|id| self.catalog.location(id.as_str()))
            .map(|location: &Location| location.display_name.clone())
            .unwrap_or_default()
    }
}

fn cancel(session: &mut Session) -> TurnOutcome {
    session.booking = Booking::default();
    TurnOutcome::say("No problem! Let's start fresh. Which city interests you?").ending()
}

fn back_to_location(session: &mut Session) -> TurnOutcome {
    session.booking.rewind(Stage::Location);
    session.last_referenced_venue = None;
    session.stage = Stage::Location;
    TurnOutcome::say("Sure! Which city would you like instead?")
}

fn back_to_date(session: &mut Session) -> TurnOutcome {
    session.booking.rewind(Stage::Date);
    session.stage = Stage::Date;
    TurnOutcome::say("Okay, what date would you prefer?")
}

fn is_greeting(message: &str) -> bool {
    let lowered = message.trim().to_lowercase();
    GREETINGS.iter().any(|greeting| {
        lowered == *greeting
            || lowered.starts_with(&format!("{greeting} "))
            || lowered.starts_with(&format!("{greeting}!"))
    })
}

fn venue_lines(venues: &[&Venue]) -> String {
    venues
        .iter()
        .map(|venue| {
            format!(
                "• {} - {} - €{} - {}\n",
                venue.name,
                venue.stars(),
                venue.price_eur,
                venue.cuisine,
            )
        })
        .collect()
}

fn cloned(venues: &[&Venue]) -> Vec<Venue> {
    venues.iter().map(|venue| (*venue).clone()).collect()
}

fn non_empty(reply: String, fallback: &str) -> String {
    if reply.is_empty() {
        fallback.to_string()
    } else {
        reply
    }
}

fn confirmation_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..6).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect()
}

/// Last question-sentence of a reply; carried into the next turn so
/// elliptical answers ("yes", "the second one") classify against it.
pub fn trailing_question(reply: &str) -> Option<String> {
    reply
        .split(['.', '!'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .rev()
        .find(|sentence| sentence.ends_with('?'))
        .map(|sentence| sentence.to_string())
}
