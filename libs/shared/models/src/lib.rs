pub mod auth;
pub mod vaccination;

pub use auth::User;
pub use vaccination::{Appointment, Centre, CentreId};
