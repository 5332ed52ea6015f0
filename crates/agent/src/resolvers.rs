//! Free-text → typed slot values. Every resolver prefers a lexical answer
//! where one exists and validates anything the oracle proposes against the
//! catalog before accepting it; an unvalidated oracle reply never becomes a
//! slot value.

use maitred_core::catalog::{Catalog, Location, Venue};

use crate::oracle::{OracleGateway, LABEL_REPLY_TOKENS};

/// Replies longer than this cannot be a single date or time value.
const VALUE_REPLY_MAX_LEN: usize = 15;
/// Replies longer than this cannot be a single place name.
const PLACE_REPLY_MAX_LEN: usize = 20;

pub fn context_line(last_question: Option<&str>) -> String {
    match last_question {
        Some(question) => format!("AI just asked: \"{question}\"\n"),
        None => String::new(),
    }
}

/// Today, spelled out for the few-shot date prompt ("Friday, August 7, 2026").
pub fn today_sentence() -> String {
    chrono::Local::now().format("%A, %B %-d, %Y").to_string()
}

/// Location resolution. Tier 1 and 2 are lexical (name substring, alias
/// table) and never build a prompt; tier 3 asks the oracle and accepts only
/// a token that maps back onto a catalog location.
pub async fn resolve_location<'a>(
    gateway: &OracleGateway,
    catalog: &'a Catalog,
    message: &str,
) -> Option<&'a Location> {
    if let Some(location) = catalog.match_location(message) {
        return Some(location);
    }

    let location_list = catalog.location_names().join(", ");
    let prompt = format!(
        "User said: \"{message}\"\n\n\
         Which city is the user referring to? Available: {location_list}\n\n\
         Detect from:\n\
         - City names (even misspelled): \"prauge\"→prague, \"cophenhagen\"→copenhagen\n\
         - Country names (even misspelled): \"swizerland\"→zurich, \"itally\"→rome, \"frace\"→paris\n\
         - Landmark NAMES: \"eiffel tower\"→paris, \"colosseum\"→rome, \"big ben\"→london\n\
         - Landmark DESCRIPTIONS: \"large clock tower\"→london (Big Ben), \"tall iron tower\"→paris (Eiffel)\n\
         - Context: \"near the louvre\"→paris, \"by the vatican\"→rome\n\n\
         Think about what the user means, even with typos.\n\
         If no city/landmark/country mentioned, reply NONE.\n\
         Reply with just the city name in lowercase, or NONE."
    );

    let reply = gateway.generate(&prompt, LABEL_REPLY_TOKENS).await;
    let lowered = reply.to_lowercase();
    let token = lowered
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ':' | '!' | '?'))
        .next()
        .unwrap_or("");

    if token.is_empty() || token.contains("none") {
        return None;
    }
    catalog.location_from_token(token)
}

/// Names the out-of-catalog place the user asked for, if any. Used only to
/// phrase a precise apology, never to resolve a supported location.
pub async fn unsupported_location(
    gateway: &OracleGateway,
    catalog: &Catalog,
    message: &str,
) -> Option<String> {
    let supported = catalog
        .locations()
        .iter()
        .map(|location| format!("- {}", location.display_name))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "User said: \"{message}\"\n\n\
         SUPPORTED cities, including their countries (reply NONE for these):\n{supported}\n\n\
         Is user asking for an UNSUPPORTED location?\n\
         UNSUPPORTED: \"tokyo\"→Tokyo, \"japan\"→Japan, \"new york\"→New York\n\
         SUPPORTED: \"switzerland\"→NONE, \"swizerland\"→NONE, \"france\"→NONE\n\n\
         Reply with unsupported location name, or NONE if supported/unclear."
    );

    let reply = gateway.generate(&prompt, LABEL_REPLY_TOKENS).await;
    if reply.is_empty() || reply.contains("NONE") || reply.len() > PLACE_REPLY_MAX_LEN {
        return None;
    }
    Some(reply.trim().to_string())
}

/// Venue resolution against the current location's list only. The oracle
/// reply is accepted solely when it names a venue already in that list,
/// which discards hallucinated venues outright.
pub async fn resolve_venue<'a>(
    gateway: &OracleGateway,
    venues: &[&'a Venue],
    message: &str,
) -> Option<&'a Venue> {
    let names = venues.iter().map(|venue| venue.name.as_str()).collect::<Vec<_>>().join(", ");
    let prompt = format!(
        "User said: \"{message}\"\n\
         Restaurants: {names}\n\n\
         Which restaurant is user referring to?\n\
         Reply with the EXACT restaurant name from the list, or NONE."
    );

    let reply = gateway.generate(&prompt, LABEL_REPLY_TOKENS).await;
    venues.iter().copied().find(|venue| reply.contains(&venue.name))
}

pub async fn extract_date(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
    today: &str,
) -> Option<String> {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}Today: {today}\n\
         User said: \"{message}\"\n\
         Extract the date if provided.\n\
         \"22 dec\"→\"Dec 22\", \"jan 1\"→\"Jan 1\", \"tomorrow\"→add 1 day to today, \"next friday\"→find next Friday.\n\
         Reply ONLY the date like \"Dec 22\" or \"Jan 27\" or NONE."
    );

    let reply = gateway.generate(&prompt, LABEL_REPLY_TOKENS).await;
    if reply.is_empty() || reply.contains("NONE") || reply.len() > VALUE_REPLY_MAX_LEN {
        return None;
    }
    Some(reply.trim().to_string())
}

pub async fn extract_time(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
) -> Option<String> {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User said: \"{message}\"\n\
         Extract the time if provided.\n\
         \"7pm\"→\"7:00 PM\", \"8:30\"→\"8:30 PM\", \"19:00\"→\"7:00 PM\", \"evening\"→\"7:00 PM\", \"dinner\"→\"7:30 PM\", \"lunch\"→\"12:30 PM\"\n\
         Reply ONLY the time like \"7:00 PM\" or \"8:30 PM\" or NONE."
    );

    let reply = gateway.generate(&prompt, LABEL_REPLY_TOKENS).await;
    if reply.is_empty() || reply.contains("NONE") || reply.len() > VALUE_REPLY_MAX_LEN {
        return None;
    }
    Some(reply.trim().to_string())
}

/// Guest-count extraction. A reply with no integer is a resolution failure,
/// never coerced to a default count.
pub async fn extract_guests(
    gateway: &OracleGateway,
    message: &str,
    last_question: Option<&str>,
) -> Option<u8> {
    let context = context_line(last_question);
    let prompt = format!(
        "{context}User replied: \"{message}\"\n\n\
         How many guests? Extract the number.\n\
         \"2\"→2, \"4\"→4, \"just me\"→1, \"me and wife\"→2, \"5 people\"→5.\n\
         Reply with JUST the number, or NO if not about guests."
    );

    let reply = gateway.generate(&prompt, LABEL_REPLY_TOKENS).await;
    if reply.is_empty() || reply.contains("NO") {
        return None;
    }
    first_integer(&reply)
}

fn first_integer(reply: &str) -> Option<u8> {
    reply
        .split(|c: char| !c.is_ascii_digit())
        .find(|token| !token.is_empty())
        .and_then(|token| token.parse::<u64>().ok())
        .map(|value| value.min(u64::from(u8::MAX)) as u8)
}
