use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Appointment, Centre, User};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing at a mock server, e.g. `MockServer::uri()`.
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            booking_user_id: String::new(),
            booking_user_doses: 0,
        }
    }
}

pub fn test_centre() -> Centre {
    Centre::new(1, "Helix Vaccination Centre", "DCU, Dublin 9")
}

/// Builds users at the different points of the dose sequence.
pub struct TestUser {
    pub id: Uuid,
    pub doses: u8,
    pub appointment_dates: Vec<NaiveDate>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            doses: 0,
            appointment_dates: Vec::new(),
        }
    }
}

impl TestUser {
    pub fn unvaccinated() -> Self {
        Self::default()
    }

    /// One dose received, given on `first_dose`.
    pub fn awaiting_second_dose(first_dose: NaiveDate) -> Self {
        Self {
            doses: 1,
            appointment_dates: vec![first_dose],
            ..Self::default()
        }
    }

    pub fn fully_vaccinated(first_dose: NaiveDate, second_dose: NaiveDate) -> Self {
        Self {
            doses: 2,
            appointment_dates: vec![first_dose, second_dose],
            ..Self::default()
        }
    }

    /// Booked a first dose that has not been administered yet.
    pub fn first_dose_booked(date: NaiveDate) -> Self {
        Self {
            doses: 0,
            appointment_dates: vec![date],
            ..Self::default()
        }
    }

    pub fn to_user(&self) -> User {
        let centre = test_centre();
        let mut user = User::new(self.id, self.doses);
        user.email = Some(format!("{}@example.com", self.id.simple()));
        user.appointments = self
            .appointment_dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                Appointment::new(centre.clone(), *date, "09:00", i as u8 + 1).with_user(self.id)
            })
            .collect();
        user
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn centre_response(id: i64, name: &str, location: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "location": location
        })
    }

    pub fn appointment_response(
        id: Uuid,
        centre_id: i64,
        date: &str,
        time: &str,
        dose_number: u8,
        user_id: Option<Uuid>,
    ) -> Value {
        json!({
            "id": id,
            "centre_id": centre_id,
            "date": date,
            "time": time,
            "dose_number": dose_number,
            "user_id": user_id
        })
    }
}
