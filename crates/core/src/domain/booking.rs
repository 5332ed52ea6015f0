use serde::Serialize;

use crate::catalog::LocationId;
use crate::domain::session::Stage;

/// One reservation in progress. `confirmed` may only become true once venue,
/// date, and time are set and the guest count is positive.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Booking {
    pub location: Option<LocationId>,
    pub venue: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub guests: u8,
    pub confirmed: bool,
}

impl Booking {
    pub fn ready_for_confirmation(&self) -> bool {
        self.venue.is_some() && self.date.is_some() && self.time.is_some() && self.guests > 0
    }

    /// Clears the slot owned by `target` and every slot filled after it.
    /// The guest count survives every rewind except an explicit rewind to
    /// the guests stage itself.
    pub fn rewind(&mut self, target: Stage) {
        self.confirmed = false;
        match target {
            Stage::Init | Stage::Location => {
                self.location = None;
                self.venue = None;
                self.date = None;
                self.time = None;
            }
            Stage::Venue => {
                self.venue = None;
                self.date = None;
                self.time = None;
            }
            Stage::Date => {
                self.date = None;
                self.time = None;
            }
            Stage::Time => {
                self.time = None;
            }
            Stage::Guests => {
                self.guests = 0;
            }
            Stage::Confirm => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Booking;
    use crate::catalog::LocationId;
    use crate::domain::session::Stage;

    fn full_booking() -> Booking {
        Booking {
            location: Some(LocationId("paris".to_string())),
            venue: Some("Septime".to_string()),
            date: Some("Dec 24".to_string()),
            time: Some("8:00 PM".to_string()),
            guests: 4,
            confirmed: false,
        }
    }

    #[test]
    fn rewind_to_venue_keeps_location_and_guests() {
        let mut booking = full_booking();
        booking.rewind(Stage::Venue);

        assert_eq!(booking.location, Some(LocationId("paris".to_string())));
        assert_eq!(booking.venue, None);
        assert_eq!(booking.date, None);
        assert_eq!(booking.time, None);
        assert_eq!(booking.guests, 4);
    }

    #[test]
    fn rewind_to_location_clears_location_and_venue_but_never_guests() {
        let mut booking = full_booking();
        booking.rewind(Stage::Location);

        assert_eq!(booking.location, None);
        assert_eq!(booking.venue, None);
        assert_eq!(booking.guests, 4);
    }

    #[test]
    fn rewind_to_guests_is_the_only_way_to_drop_the_count() {
        let mut booking = full_booking();
        booking.rewind(Stage::Date);
        assert_eq!(booking.guests, 4);

        booking.rewind(Stage::Guests);
        assert_eq!(booking.guests, 0);
        assert_eq!(booking.venue, Some("Septime".to_string()));
    }

    #[test]
    fn readiness_requires_every_slot() {
        let mut booking = full_booking();
        assert!(booking.ready_for_confirmation());

        booking.time = None;
        assert!(!booking.ready_for_confirmation());

        booking.time = Some("8:00 PM".to_string());
        booking.guests = 0;
        assert!(!booking.ready_for_confirmation());
    }
}
