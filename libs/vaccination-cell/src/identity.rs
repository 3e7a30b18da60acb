// libs/vaccination-cell/src/identity.rs
//! User context whose booking history is read back from the appointment store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use shared_models::User;

use crate::models::BookingError;
use crate::store::{AppointmentStore, UserContext};

/// Identity fixed at startup (id and recorded doses); appointments are
/// reloaded on every request so each booking moves the status forward.
pub struct StoredUserContext {
    user_id: Uuid,
    number_of_doses: u8,
    appointments: Arc<dyn AppointmentStore>,
}

impl StoredUserContext {
    pub fn new(user_id: Uuid, number_of_doses: u8, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            user_id,
            number_of_doses,
            appointments,
        }
    }
}

#[async_trait]
impl UserContext for StoredUserContext {
    async fn current_user(&self) -> Result<User, BookingError> {
        let mut user = User::new(self.user_id, self.number_of_doses);
        user.appointments = self.appointments.find_all_by_user(self.user_id).await?;

        debug!(
            "Loaded user {} with {} dose(s) and {} appointment(s)",
            user.id,
            user.number_of_doses,
            user.appointments.len()
        );
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared_models::{Appointment, Centre};

    use crate::memory::InMemoryAppointmentStore;

    #[tokio::test]
    async fn test_current_user_reflects_new_bookings() {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let user_id = Uuid::new_v4();
        let context = StoredUserContext::new(user_id, 0, store.clone());

        assert!(context.current_user().await.unwrap().appointments.is_empty());

        let date = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        store
            .claim(Appointment::new(Centre::new(1, "Citywest", "Dublin 24"), date, "09:00", 1).with_user(user_id))
            .await
            .unwrap();

        let user = context.current_user().await.unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.number_of_doses, 0);
        assert_eq!(user.first_dose_appointment().map(|a| a.date), Some(date));
    }
}
