use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CentreId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centre {
    pub id: CentreId,
    pub name: String,
    pub location: String,
}

impl Centre {
    pub fn new(id: CentreId, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
        }
    }
}

/// A vaccination slot at a centre.
///
/// Stored appointments without a `user_id` are placeholders: the slot is
/// reserved in the store but nobody has claimed it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub centre: Centre,
    pub date: NaiveDate,
    pub time: String,
    pub dose_number: u8,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl Appointment {
    pub fn new(centre: Centre, date: NaiveDate, time: impl Into<String>, dose_number: u8) -> Self {
        Self {
            id: None,
            centre,
            date,
            time: time.into(),
            dose_number,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn is_claimed(&self) -> bool {
        self.user_id.is_some()
    }

    /// True when both values refer to the same centre, date and slot time.
    pub fn same_slot(&self, other: &Appointment) -> bool {
        self.centre.id == other.centre.id && self.date == other.date && self.time == other.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn centre() -> Centre {
        Centre::new(1, "Rotunda", "Dublin 1")
    }

    #[test]
    fn test_date_serializes_as_plain_calendar_date() {
        let date = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        let value = serde_json::to_value(Appointment::new(centre(), date, "09:00", 1)).unwrap();

        assert_eq!(value["date"], json!("2099-01-01"));
        assert_eq!(value["time"], json!("09:00"));
        assert!(value.get("id").is_none());
        assert_eq!(value["user_id"], json!(null));
    }

    #[test]
    fn test_placeholder_is_not_claimed() {
        let date = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        let placeholder = Appointment::new(centre(), date, "09:15", 1);
        let booked = placeholder.clone().with_user(Uuid::new_v4());

        assert!(!placeholder.is_claimed());
        assert!(booked.is_claimed());
        assert!(placeholder.same_slot(&booked));
    }
}
