// libs/vaccination-cell/src/services/booking.rs
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info, warn};

use shared_models::{Appointment, Centre, CentreId, User};

use crate::clock::{Clock, SystemClock};
use crate::models::{parse_date, BookingError, BookingStatus, SlotSelection};
use crate::services::{eligibility, slots};
use crate::store::{AppointmentStore, CentreDirectory, UserContext};

/// Booking rules for vaccination appointments.
///
/// Holds only shared handles to its collaborators, so one engine can serve
/// any number of concurrent requests.
pub struct BookingEngine {
    centres: Arc<dyn CentreDirectory>,
    appointments: Arc<dyn AppointmentStore>,
    users: Arc<dyn UserContext>,
    clock: Arc<dyn Clock>,
}

impl BookingEngine {
    pub fn new(
        centres: Arc<dyn CentreDirectory>,
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserContext>,
    ) -> Self {
        Self::with_clock(centres, appointments, users, Arc::new(SystemClock))
    }

    pub fn with_clock(
        centres: Arc<dyn CentreDirectory>,
        appointments: Arc<dyn AppointmentStore>,
        users: Arc<dyn UserContext>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            centres,
            appointments,
            users,
            clock,
        }
    }

    // ==========================================================================
    // STATUS AND DATE RULES
    // ==========================================================================

    pub fn check_booking_status(&self, user: &User) -> BookingStatus {
        eligibility::check_booking_status(user)
    }

    pub async fn current_status(&self) -> Result<BookingStatus, BookingError> {
        let user = self.users.current_user().await?;
        Ok(self.check_booking_status(&user))
    }

    pub fn is_future_date(&self, date: &str) -> Result<bool, BookingError> {
        eligibility::is_future_date(date, self.clock.today())
    }

    pub fn is_valid_second_dose_gap(&self, date: &str, user: &User) -> Result<bool, BookingError> {
        eligibility::is_valid_second_dose_gap(date, user)
    }

    /// Minimum date offered by the date picker.
    pub fn earliest_bookable_date(&self) -> NaiveDate {
        self.clock.today() + Duration::days(1)
    }

    pub fn validate_date(&self, date: &str, user: &User) -> Result<NaiveDate, BookingError> {
        eligibility::validate_date(date, user, self.clock.today())
    }

    // ==========================================================================
    // CENTRES
    // ==========================================================================

    pub async fn find_all_centres(&self) -> Result<Vec<Centre>, BookingError> {
        self.centres.find_all().await
    }

    pub async fn check_centre_exists(&self, centre_id: CentreId) -> Result<Centre, BookingError> {
        self.centres
            .find_by_id(centre_id)
            .await?
            .ok_or(BookingError::CentreNotFound(centre_id))
    }

    pub async fn appointments_for_centre(&self, centre_id: CentreId) -> Result<Vec<Appointment>, BookingError> {
        let centre = self.check_centre_exists(centre_id).await?;
        self.appointments.find_all_by_centre(&centre).await
    }

    // ==========================================================================
    // SLOTS AND BOOKING
    // ==========================================================================

    /// Open slots for the current user at a centre on a date, in template
    /// order. Does not apply the date rules; see [`BookingEngine::select_date`].
    pub async fn list_available_slots(
        &self,
        centre_id: CentreId,
        date: &str,
    ) -> Result<Vec<Appointment>, BookingError> {
        let centre = self.check_centre_exists(centre_id).await?;
        let date = parse_date(date)?;
        let user = self.users.current_user().await?;
        let dose_number = dose_number_for(self.check_booking_status(&user))?;

        slots::available_slots(self.appointments.as_ref(), &centre, date, dose_number).await
    }

    /// Submit a date for a centre: validate it for the current user, then list
    /// what is still open that day. The date is judged before the centre is
    /// looked up.
    pub async fn select_date(&self, centre_id: CentreId, date: &str) -> Result<SlotSelection, BookingError> {
        let user = self.users.current_user().await?;
        let status = self.check_booking_status(&user);
        let dose_number = dose_number_for(status)?;

        let date = self.validate_date(date, &user)?;
        let centre = self.check_centre_exists(centre_id).await?;
        let slots = slots::available_slots(self.appointments.as_ref(), &centre, date, dose_number).await?;

        Ok(SlotSelection {
            status,
            centre,
            date,
            slots,
        })
    }

    /// Book a slot for `user`. Blocked statuses fail before anything is
    /// written.
    pub async fn book_appointment(
        &self,
        centre_id: CentreId,
        date: &str,
        time: &str,
        user: &User,
    ) -> Result<Appointment, BookingError> {
        let status = self.check_booking_status(user);
        let dose_number = dose_number_for(status)?;

        let centre = self.check_centre_exists(centre_id).await?;
        let date = parse_date(date)?;
        if !slots::is_template_slot(time) {
            return Err(BookingError::UnknownSlot(time.to_string()));
        }

        let appointment = Appointment::new(centre, date, time, dose_number).with_user(user.id);
        let booked = self.appointments.claim(appointment).await?;

        info!(
            "Booked dose {} for user {} at centre {} on {} {}",
            dose_number, user.id, centre_id, booked.date, booked.time
        );
        Ok(booked)
    }

    pub async fn book_for_current_user(
        &self,
        centre_id: CentreId,
        date: &str,
        time: &str,
    ) -> Result<Appointment, BookingError> {
        let user = self.users.current_user().await?;
        debug!("Booking for current user {}", user.id);
        self.book_appointment(centre_id, date, time, &user).await
    }
}

fn dose_number_for(status: BookingStatus) -> Result<u8, BookingError> {
    status.dose_number().ok_or_else(|| {
        warn!("Booking blocked in status {}", status);
        BookingError::IllegalBooking(status)
    })
}
