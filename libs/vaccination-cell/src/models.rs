// libs/vaccination-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use shared_models::{Appointment, Centre, CentreId};

// ==============================================================================
// BOOKING RULES
// ==============================================================================

/// Minimum number of whole days between the first and second dose.
pub const SECOND_DOSE_GAP_DAYS: i64 = 21;

/// Wire format of every date handled by the engine.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily slot template, 09:00 to 17:45 in 15-minute steps.
pub const SLOT_TIMES: [&str; 36] = [
    "09:00", "09:15", "09:30", "09:45",
    "10:00", "10:15", "10:30", "10:45",
    "11:00", "11:15", "11:30", "11:45",
    "12:00", "12:15", "12:30", "12:45",
    "13:00", "13:15", "13:30", "13:45",
    "14:00", "14:15", "14:30", "14:45",
    "15:00", "15:15", "15:30", "15:45",
    "16:00", "16:15", "16:30", "16:45",
    "17:00", "17:15", "17:30", "17:45",
];

// ==============================================================================
// BOOKING STATUS
// ==============================================================================

/// Where a user stands in the two-dose sequence. Derived on every request,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    First,
    Second,
    #[serde(rename = "APPT_PENDING")]
    AppointmentPending,
    FullyVaccinated,
}

impl BookingStatus {
    /// Dose number a new booking gets in this status. `None` means the
    /// status blocks booking altogether.
    pub fn dose_number(self) -> Option<u8> {
        match self {
            BookingStatus::First => Some(1),
            BookingStatus::Second => Some(2),
            BookingStatus::AppointmentPending | BookingStatus::FullyVaccinated => None,
        }
    }

    pub fn can_book(self) -> bool {
        self.dose_number().is_some()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::First => write!(f, "FIRST"),
            BookingStatus::Second => write!(f, "SECOND"),
            BookingStatus::AppointmentPending => write!(f, "APPT_PENDING"),
            BookingStatus::FullyVaccinated => write!(f, "FULLY_VACCINATED"),
        }
    }
}

// ==============================================================================
// RESPONSE MODELS
// ==============================================================================

/// Result of submitting a date for a centre: the slots still open that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSelection {
    pub status: BookingStatus,
    pub centre: Centre,
    pub date: NaiveDate,
    pub slots: Vec<Appointment>,
}

impl SlotSelection {
    pub fn times(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.time.as_str()).collect()
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// A candidate date the user has to correct before slots are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DateRejection {
    #[error("{date} is not a future date")]
    MustBeFuture { date: NaiveDate },

    #[error("second dose on {date} is too soon after the first dose on {first_dose}, earliest is {earliest}")]
    SecondDoseTooSoon {
        date: NaiveDate,
        first_dose: NaiveDate,
        earliest: NaiveDate,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Vaccination centre {0} not found")]
    CentreNotFound(CentreId),

    #[error("Booking not allowed in status {0}")]
    IllegalBooking(BookingStatus),

    #[error("Date rejected: {0}")]
    Rejected(#[from] DateRejection),

    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Unknown slot time: {0}")]
    UnknownSlot(String),

    #[error("Slot {time} on {date} at centre {centre_id} is already taken")]
    SlotTaken {
        centre_id: CentreId,
        date: NaiveDate,
        time: String,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl BookingError {
    /// Errors the user fixes by choosing another date or slot. Everything
    /// else is a precondition or infrastructure failure.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            BookingError::Rejected(_)
                | BookingError::InvalidDate { .. }
                | BookingError::UnknownSlot(_)
                | BookingError::SlotTaken { .. }
        )
    }
}

/// Parses a `YYYY-MM-DD` date, failing fast on anything else.
pub fn parse_date(value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| BookingError::InvalidDate {
        value: value.to_string(),
        source,
    })
}
