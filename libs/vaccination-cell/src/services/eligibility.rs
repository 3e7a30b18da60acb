// libs/vaccination-cell/src/services/eligibility.rs
use chrono::{Duration, NaiveDate};
use tracing::debug;

use shared_models::User;

use crate::models::{parse_date, BookingError, BookingStatus, DateRejection, SECOND_DOSE_GAP_DAYS};

/// Classify a user by dose count and booked appointments. First match wins.
pub fn check_booking_status(user: &User) -> BookingStatus {
    let doses = user.number_of_doses;
    let booked = user.appointments.len();

    if doses == 0 && booked == 0 {
        BookingStatus::First
    } else if doses == 1 && booked == 1 {
        BookingStatus::Second
    } else if doses == 2 {
        BookingStatus::FullyVaccinated
    } else {
        BookingStatus::AppointmentPending
    }
}

/// True when `date` is strictly after `today`.
pub fn is_future_date(date: &str, today: NaiveDate) -> Result<bool, BookingError> {
    Ok(parse_date(date)? > today)
}

/// Gap rule. Only a user waiting on their second dose is constrained;
/// every other status passes.
pub fn is_valid_second_dose_gap(date: &str, user: &User) -> Result<bool, BookingError> {
    let candidate = parse_date(date)?;
    Ok(second_dose_rejection(candidate, user).is_none())
}

/// First day the second dose may be booked, if the user is at that stage.
pub fn earliest_second_dose(user: &User) -> Option<NaiveDate> {
    if check_booking_status(user) != BookingStatus::Second {
        return None;
    }
    user.first_dose_appointment()
        .map(|first| first.date + Duration::days(SECOND_DOSE_GAP_DAYS))
}

/// Run the future rule, then the gap rule.
pub fn validate_date(date: &str, user: &User, today: NaiveDate) -> Result<NaiveDate, BookingError> {
    let candidate = parse_date(date)?;

    if candidate <= today {
        debug!("Rejecting {}: not after {}", candidate, today);
        return Err(DateRejection::MustBeFuture { date: candidate }.into());
    }

    if let Some(rejection) = second_dose_rejection(candidate, user) {
        debug!("Rejecting {}: {}", candidate, rejection);
        return Err(rejection.into());
    }

    Ok(candidate)
}

fn second_dose_rejection(candidate: NaiveDate, user: &User) -> Option<DateRejection> {
    let earliest = earliest_second_dose(user)?;
    let first_dose = user.first_dose_appointment()?.date;

    if (candidate - first_dose).num_days() >= SECOND_DOSE_GAP_DAYS {
        None
    } else {
        Some(DateRejection::SecondDoseTooSoon {
            date: candidate,
            first_dose,
            earliest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_models::{Appointment, Centre};
    use uuid::Uuid;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user_with(doses: u8, appointment_dates: &[NaiveDate]) -> User {
        let mut user = User::new(Uuid::new_v4(), doses);
        let centre = Centre::new(1, "Aviva", "Dublin 4");
        user.appointments = appointment_dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                Appointment::new(centre.clone(), *date, "09:00", i as u8 + 1).with_user(user.id)
            })
            .collect();
        user
    }

    #[test]
    fn test_status_classification() {
        let day = ymd(2024, 1, 1);

        assert_eq!(check_booking_status(&user_with(0, &[])), BookingStatus::First);
        assert_eq!(check_booking_status(&user_with(1, &[day])), BookingStatus::Second);
        assert_eq!(check_booking_status(&user_with(2, &[day, day])), BookingStatus::FullyVaccinated);
        assert_eq!(check_booking_status(&user_with(2, &[])), BookingStatus::FullyVaccinated);
    }

    #[test]
    fn test_inconsistent_combinations_are_pending() {
        let day = ymd(2024, 1, 1);

        // booked but no dose recorded yet
        assert_eq!(check_booking_status(&user_with(0, &[day])), BookingStatus::AppointmentPending);
        assert_eq!(check_booking_status(&user_with(1, &[])), BookingStatus::AppointmentPending);
        assert_eq!(check_booking_status(&user_with(1, &[day, day])), BookingStatus::AppointmentPending);
        assert_eq!(check_booking_status(&user_with(3, &[])), BookingStatus::AppointmentPending);
    }

    #[test]
    fn test_future_date_boundaries() {
        let today = ymd(2026, 3, 10);

        assert!(!is_future_date("2026-03-10", today).unwrap());
        assert!(is_future_date("2026-03-11", today).unwrap());
        assert!(!is_future_date("2026-03-09", today).unwrap());
        assert_matches!(is_future_date("10-03-2026", today), Err(BookingError::InvalidDate { .. }));
    }

    #[test]
    fn test_gap_is_inclusive_at_21_days() {
        let user = user_with(1, &[ymd(2024, 1, 1)]);

        assert!(!is_valid_second_dose_gap("2024-01-21", &user).unwrap());
        assert!(is_valid_second_dose_gap("2024-01-22", &user).unwrap());
        assert!(is_valid_second_dose_gap("2024-03-01", &user).unwrap());
        assert!(!is_valid_second_dose_gap("2023-12-31", &user).unwrap());
        assert_eq!(earliest_second_dose(&user), Some(ymd(2024, 1, 22)));
    }

    #[test]
    fn test_gap_does_not_constrain_other_statuses() {
        assert!(is_valid_second_dose_gap("2024-01-02", &user_with(0, &[])).unwrap());
        assert!(is_valid_second_dose_gap("2024-01-02", &user_with(1, &[ymd(2024, 1, 1), ymd(2024, 1, 1)])).unwrap());
        assert_eq!(earliest_second_dose(&user_with(0, &[])), None);
    }

    #[test]
    fn test_gap_check_still_parses_the_date() {
        assert_matches!(
            is_valid_second_dose_gap("tomorrow", &user_with(0, &[])),
            Err(BookingError::InvalidDate { .. })
        );
    }

    #[test]
    fn test_validate_date_reports_which_rule_failed() {
        let today = ymd(2024, 1, 5);
        let user = user_with(1, &[ymd(2024, 1, 1)]);

        assert_matches!(
            validate_date("2024-01-05", &user, today),
            Err(BookingError::Rejected(DateRejection::MustBeFuture { .. }))
        );
        assert_matches!(
            validate_date("2024-01-10", &user, today),
            Err(BookingError::Rejected(DateRejection::SecondDoseTooSoon { earliest, .. })) if earliest == ymd(2024, 1, 22)
        );
        assert_eq!(validate_date("2024-01-22", &user, today).unwrap(), ymd(2024, 1, 22));
    }
}
