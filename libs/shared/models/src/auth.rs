use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vaccination::Appointment;

/// The authenticated user as handed over by the identity provider.
///
/// `appointments` is in booking order, so the first entry is always the
/// first-dose appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub number_of_doses: u8,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

impl User {
    pub fn new(id: Uuid, number_of_doses: u8) -> Self {
        Self {
            id,
            email: None,
            number_of_doses,
            appointments: Vec::new(),
        }
    }

    pub fn first_dose_appointment(&self) -> Option<&Appointment> {
        self.appointments.first()
    }
}
