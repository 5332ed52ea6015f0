pub mod budget;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod intent;
pub mod sessions;

pub use budget::{Admission, BudgetLedger, BudgetQuotas, BudgetUsage};
pub use catalog::{Catalog, Location, LocationId, Venue};
pub use domain::booking::Booking;
pub use domain::session::{Session, Stage};
pub use intent::{ChangeTarget, ConfirmAction, DateAction, GuestAction, TimeAction, VenueAction};
pub use sessions::SessionStore;
