pub mod clock;
pub mod identity;
pub mod memory;
pub mod models;
pub mod services;
pub mod store;
pub mod supabase_store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::StoredUserContext;
pub use models::*;
pub use services::booking::BookingEngine;
pub use store::{AppointmentStore, CentreDirectory, UserContext};
