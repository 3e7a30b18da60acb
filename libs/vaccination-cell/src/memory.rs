// libs/vaccination-cell/src/memory.rs
//! In-process collaborators for local runs and tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Appointment, Centre, CentreId, User};

use crate::models::BookingError;
use crate::store::{AppointmentStore, CentreDirectory, UserContext};

pub struct InMemoryCentreDirectory {
    centres: Vec<Centre>,
}

impl InMemoryCentreDirectory {
    pub fn new(centres: Vec<Centre>) -> Self {
        Self { centres }
    }
}

#[async_trait]
impl CentreDirectory for InMemoryCentreDirectory {
    async fn find_all(&self) -> Result<Vec<Centre>, BookingError> {
        Ok(self.centres.clone())
    }

    async fn find_by_id(&self, id: CentreId) -> Result<Option<Centre>, BookingError> {
        Ok(self.centres.iter().find(|centre| centre.id == id).cloned())
    }
}

/// Appointment table kept in insertion order.
///
/// `claim` checks and writes under a single write guard, so two concurrent
/// claims for one slot cannot both succeed.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }

    fn stamp(mut appointment: Appointment) -> Appointment {
        if appointment.id.is_none() {
            appointment.id = Some(Uuid::new_v4());
        }
        appointment
    }
}

fn occupies(appointment: &Appointment, centre_id: CentreId, date: NaiveDate, time: &str) -> bool {
    appointment.centre.id == centre_id && appointment.date == date && appointment.time == time
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_by_centre_date_time(
        &self,
        centre: &Centre,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, BookingError> {
        let appointments = self.appointments.read().await;
        let matching: Vec<&Appointment> = appointments
            .iter()
            .filter(|appointment| occupies(appointment, centre.id, date, time))
            .collect();

        let found = matching
            .iter()
            .find(|appointment| appointment.is_claimed())
            .or(matching.first());

        Ok(found.map(|appointment| (*appointment).clone()))
    }

    async fn save(&self, appointment: Appointment) -> Result<Appointment, BookingError> {
        let stored = Self::stamp(appointment);
        self.appointments.write().await.push(stored.clone());
        debug!("Saved appointment {:?} at {} {}", stored.id, stored.date, stored.time);
        Ok(stored)
    }

    async fn find_all_by_centre(&self, centre: &Centre) -> Result<Vec<Appointment>, BookingError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .filter(|appointment| appointment.centre.id == centre.id)
            .cloned()
            .collect())
    }

    async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .filter(|appointment| appointment.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn claim(&self, appointment: Appointment) -> Result<Appointment, BookingError> {
        let mut appointments = self.appointments.write().await;
        let centre_id = appointment.centre.id;

        let mut placeholder = None;
        for (index, existing) in appointments.iter().enumerate() {
            if !existing.same_slot(&appointment) {
                continue;
            }
            if existing.is_claimed() {
                return Err(BookingError::SlotTaken {
                    centre_id,
                    date: appointment.date,
                    time: appointment.time.clone(),
                });
            }
            placeholder.get_or_insert(index);
        }

        let stored = Self::stamp(appointment);
        match placeholder {
            Some(index) => {
                debug!("Claiming placeholder at {} {} for centre {}", stored.date, stored.time, centre_id);
                appointments[index] = stored.clone();
            }
            None => appointments.push(stored.clone()),
        }

        Ok(stored)
    }
}

/// Hands out a fixed user, standing in for the identity provider.
pub struct StaticUserContext {
    user: User,
}

impl StaticUserContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

#[async_trait]
impl UserContext for StaticUserContext {
    async fn current_user(&self) -> Result<User, BookingError> {
        Ok(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn centre() -> Centre {
        Centre::new(1, "Citywest", "Dublin 24")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_claim_takes_free_slot_once() {
        let store = InMemoryAppointmentStore::new();
        let first = Appointment::new(centre(), date(), "09:00", 1).with_user(Uuid::new_v4());
        let second = Appointment::new(centre(), date(), "09:00", 1).with_user(Uuid::new_v4());

        let stored = store.claim(first).await.unwrap();
        assert!(stored.id.is_some());

        let result = store.claim(second).await;
        assert_matches!(result, Err(BookingError::SlotTaken { centre_id: 1, ref time, .. }) if time == "09:00");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_claim_consumes_placeholder() {
        let store = InMemoryAppointmentStore::new();
        store.save(Appointment::new(centre(), date(), "10:00", 1)).await.unwrap();

        let user_id = Uuid::new_v4();
        store
            .claim(Appointment::new(centre(), date(), "10:00", 1).with_user(user_id))
            .await
            .unwrap();

        let all = store.find_all_by_centre(&centre()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user_id, Some(user_id));
    }

    #[tokio::test]
    async fn test_find_prefers_claimed_record() {
        let store = InMemoryAppointmentStore::new();
        let user_id = Uuid::new_v4();
        store.save(Appointment::new(centre(), date(), "11:00", 1)).await.unwrap();
        store
            .save(Appointment::new(centre(), date(), "11:00", 1).with_user(user_id))
            .await
            .unwrap();

        let found = store
            .find_by_centre_date_time(&centre(), date(), "11:00")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, Some(user_id));

        let missing = store
            .find_by_centre_date_time(&centre(), date(), "11:15")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_all_by_user_keeps_insertion_order() {
        let store = InMemoryAppointmentStore::new();
        let user_id = Uuid::new_v4();
        let later = NaiveDate::from_ymd_opt(2099, 2, 1).unwrap();

        store
            .claim(Appointment::new(centre(), later, "09:00", 1).with_user(user_id))
            .await
            .unwrap();
        store
            .claim(Appointment::new(centre(), date(), "09:00", 1).with_user(Uuid::new_v4()))
            .await
            .unwrap();
        store.save(Appointment::new(centre(), date(), "09:15", 1)).await.unwrap();
        store
            .claim(Appointment::new(centre(), date(), "09:30", 2).with_user(user_id))
            .await
            .unwrap();

        let mine = store.find_all_by_user(user_id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].date, later);
        assert_eq!(mine[1].time, "09:30");
    }
}
