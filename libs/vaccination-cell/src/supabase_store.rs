// libs/vaccination-cell/src/supabase_store.rs
//! PostgREST-backed collaborators.
//!
//! Expected tables:
//! - `vaccination_centres (id, name, location)`
//! - `vaccination_appointments (id, centre_id, date, time, dose_number, user_id)`
//!   with a unique constraint on `(centre_id, date, time)` and a foreign key
//!   from `centre_id` to `vaccination_centres`. `time` may be `text` or a
//!   Postgres `time`; rows are read back as `HH:MM` either way.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::{ApiError, SupabaseClient};
use shared_models::{Appointment, Centre, CentreId};

use crate::models::{BookingError, DATE_FORMAT};
use crate::store::{AppointmentStore, CentreDirectory};

const CENTRES_PATH: &str = "/rest/v1/vaccination_centres";
const APPOINTMENTS_PATH: &str = "/rest/v1/vaccination_appointments";
const WITH_CENTRE: &str = "*,centre:vaccination_centres(*)";

fn database_error(err: anyhow::Error) -> BookingError {
    BookingError::Database(err.to_string())
}

fn parse_rows<T: for<'de> Deserialize<'de>>(rows: Vec<Value>) -> Result<Vec<T>, BookingError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| BookingError::Database(format!("Failed to parse row: {}", e)))
}

// ==============================================================================
// CENTRES
// ==============================================================================

pub struct SupabaseCentreDirectory {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseCentreDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

#[async_trait]
impl CentreDirectory for SupabaseCentreDirectory {
    async fn find_all(&self) -> Result<Vec<Centre>, BookingError> {
        let path = format!("{}?order=id.asc", CENTRES_PATH);
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, self.auth_token.as_deref(), None)
            .await
            .map_err(database_error)?;

        parse_rows(rows)
    }

    async fn find_by_id(&self, id: CentreId) -> Result<Option<Centre>, BookingError> {
        debug!("Fetching vaccination centre {}", id);

        let path = format!("{}?id=eq.{}", CENTRES_PATH, id);
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, self.auth_token.as_deref(), None)
            .await
            .map_err(database_error)?;

        Ok(parse_rows(rows)?.into_iter().next())
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

/// Row shape of `vaccination_appointments`; the centre is stored by id only.
#[derive(Debug, Serialize, Deserialize)]
struct AppointmentRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    centre_id: CentreId,
    date: NaiveDate,
    time: String,
    dose_number: u8,
    user_id: Option<Uuid>,
}

impl AppointmentRow {
    fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            centre_id: appointment.centre.id,
            date: appointment.date,
            time: appointment.time.clone(),
            dose_number: appointment.dose_number,
            user_id: appointment.user_id,
        }
    }

    fn into_appointment(self, centre: &Centre) -> Appointment {
        Appointment {
            id: self.id,
            centre: centre.clone(),
            date: self.date,
            time: slot_time(self.time),
            dose_number: self.dose_number,
            user_id: self.user_id,
        }
    }
}

/// Appointment row with its centre embedded, for queries spanning centres.
#[derive(Debug, Deserialize)]
struct AppointmentWithCentre {
    #[serde(flatten)]
    row: AppointmentRow,
    centre: Centre,
}

/// `time` columns come back as `HH:MM:SS`; slots are keyed by `HH:MM`.
fn slot_time(raw: String) -> String {
    match NaiveTime::parse_from_str(&raw, "%H:%M:%S") {
        Ok(time) => time.format("%H:%M").to_string(),
        Err(_) => raw,
    }
}

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    async fn fetch(&self, path: &str, centre: &Centre) -> Result<Vec<Appointment>, BookingError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, self.auth_token.as_deref(), None)
            .await
            .map_err(database_error)?;

        Ok(parse_rows::<AppointmentRow>(rows)?
            .into_iter()
            .map(|row| row.into_appointment(centre))
            .collect())
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        body: Value,
        centre: &Centre,
    ) -> Result<Option<Appointment>, anyhow::Error> {
        let rows: Vec<AppointmentRow> = self.supabase
            .request_with_headers(
                method,
                path,
                self.auth_token.as_deref(),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Ok(rows.into_iter().next().map(|row| row.into_appointment(centre)))
    }

    async fn insert(&self, appointment: &Appointment) -> Result<Option<Appointment>, anyhow::Error> {
        let body = serde_json::to_value(AppointmentRow::from_appointment(appointment))?;
        self.write(Method::POST, APPOINTMENTS_PATH, body, &appointment.centre).await
    }
}

fn slot_taken(appointment: &Appointment) -> BookingError {
    BookingError::SlotTaken {
        centre_id: appointment.centre.id,
        date: appointment.date,
        time: appointment.time.clone(),
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_by_centre_date_time(
        &self,
        centre: &Centre,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, BookingError> {
        let path = format!(
            "{}?centre_id=eq.{}&date=eq.{}&time=eq.{}&order=user_id.nullslast&limit=1",
            APPOINTMENTS_PATH,
            centre.id,
            date.format(DATE_FORMAT),
            urlencoding::encode(time),
        );

        Ok(self.fetch(&path, centre).await?.into_iter().next())
    }

    async fn save(&self, appointment: Appointment) -> Result<Appointment, BookingError> {
        self.insert(&appointment)
            .await
            .map_err(database_error)?
            .ok_or_else(|| BookingError::Database("Failed to create appointment".to_string()))
    }

    async fn find_all_by_centre(&self, centre: &Centre) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "{}?centre_id=eq.{}&order=date.asc,time.asc",
            APPOINTMENTS_PATH, centre.id
        );
        self.fetch(&path, centre).await
    }

    async fn find_all_by_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "{}?user_id=eq.{}&select={}&order=date.asc,time.asc",
            APPOINTMENTS_PATH, user_id, WITH_CENTRE
        );
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, self.auth_token.as_deref(), None)
            .await
            .map_err(database_error)?;

        Ok(parse_rows::<AppointmentWithCentre>(rows)?
            .into_iter()
            .map(|AppointmentWithCentre { row, centre }| row.into_appointment(&centre))
            .collect())
    }

    async fn claim(&self, appointment: Appointment) -> Result<Appointment, BookingError> {
        let existing = self
            .find_by_centre_date_time(&appointment.centre, appointment.date, &appointment.time)
            .await?;

        match existing {
            Some(current) if current.is_claimed() => Err(slot_taken(&appointment)),
            Some(Appointment { id: Some(placeholder_id), .. }) => {
                // Only matches while the placeholder is still unclaimed.
                let path = format!(
                    "{}?id=eq.{}&user_id=is.null",
                    APPOINTMENTS_PATH, placeholder_id
                );
                let body = serde_json::json!({
                    "user_id": appointment.user_id,
                    "dose_number": appointment.dose_number,
                });

                self.write(Method::PATCH, &path, body, &appointment.centre)
                    .await
                    .map_err(database_error)?
                    .ok_or_else(|| {
                        warn!("Placeholder {} claimed concurrently", placeholder_id);
                        slot_taken(&appointment)
                    })
            }
            _ => match self.insert(&appointment).await {
                Ok(Some(stored)) => Ok(stored),
                Ok(None) => Err(BookingError::Database("Failed to create appointment".to_string())),
                Err(err) if err.downcast_ref::<ApiError>().is_some_and(ApiError::is_conflict) => {
                    warn!("Slot {} {} taken concurrently", appointment.date, appointment.time);
                    Err(slot_taken(&appointment))
                }
                Err(err) => Err(database_error(err)),
            },
        }
    }
}
