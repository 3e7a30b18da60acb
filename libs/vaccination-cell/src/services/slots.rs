// libs/vaccination-cell/src/services/slots.rs
use chrono::NaiveDate;
use tracing::debug;

use shared_models::{Appointment, Centre};

use crate::models::{BookingError, SLOT_TIMES};
use crate::store::AppointmentStore;

pub fn is_template_slot(time: &str) -> bool {
    SLOT_TIMES.contains(&time)
}

/// Walk the slot template and keep every time nobody has claimed.
///
/// The result is built fresh for each call and returned by value.
pub async fn available_slots(
    store: &dyn AppointmentStore,
    centre: &Centre,
    date: NaiveDate,
    dose_number: u8,
) -> Result<Vec<Appointment>, BookingError> {
    let mut available = Vec::with_capacity(SLOT_TIMES.len());

    for time in SLOT_TIMES {
        let existing = store.find_by_centre_date_time(centre, date, time).await?;
        let open = existing.map_or(true, |appointment| !appointment.is_claimed());

        if open {
            available.push(Appointment::new(centre.clone(), date, time, dose_number));
        }
    }

    debug!(
        "{} of {} slots open at centre {} on {}",
        available.len(),
        SLOT_TIMES.len(),
        centre.id,
        date
    );
    Ok(available)
}
