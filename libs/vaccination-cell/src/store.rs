// libs/vaccination-cell/src/store.rs
//! Collaborators the booking engine calls but does not own.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use shared_models::{Appointment, Centre, CentreId, User};

use crate::models::BookingError;

#[async_trait]
pub trait CentreDirectory: Send + Sync {
    /// All centres, in directory order.
    async fn find_all(&self) -> Result<Vec<Centre>, BookingError>;

    async fn find_by_id(&self, id: CentreId) -> Result<Option<Centre>, BookingError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// The appointment occupying a slot, if any. When both a placeholder and
    /// a claimed record exist for the slot the claimed one wins.
    async fn find_by_centre_date_time(
        &self,
        centre: &Centre,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, BookingError>;

    /// Persist an appointment unconditionally and return the stored record.
    async fn save(&self, appointment: Appointment) -> Result<Appointment, BookingError>;

    async fn find_all_by_centre(&self, centre: &Centre) -> Result<Vec<Appointment>, BookingError>;

    /// Appointments claimed by `user_id`, in booking order.
    async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, BookingError>;

    /// Atomically take the slot for `appointment`.
    ///
    /// Succeeds when the slot is free or only holds an unclaimed placeholder
    /// (which is consumed). Fails with `BookingError::SlotTaken` when a user
    /// already holds it.
    async fn claim(&self, appointment: Appointment) -> Result<Appointment, BookingError>;
}

#[async_trait]
pub trait UserContext: Send + Sync {
    /// The authenticated user making the current request.
    async fn current_user(&self) -> Result<User, BookingError>;
}
