use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dose_time::DoseTime;
use super::enums::Frequency;

/// A medication definition. Immutable once stored; only deletion is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: Frequency,
    /// Ordered, deduplicated, never empty.
    pub times: Vec<DoseTime>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl Medication {
    /// Whether `on_date` falls inside the inclusive start/end window.
    /// A missing bound is open-ended on that side.
    pub fn is_active(&self, on_date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| on_date >= start)
            && self.end_date.map_or(true, |end| on_date <= end)
    }

    pub fn is_scheduled_at(&self, time: DoseTime) -> bool {
        self.times.contains(&time)
    }
}

/// Caller input for registering a medication. Times arrive as raw
/// `HH:MM` strings and are validated by the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMedication {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: Frequency,
    pub times: Vec<String>,
    #[serde(default, with = "super::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "super::optional_date")]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn med(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: "Ibuprofen".into(),
            dosage: "200mg".into(),
            frequency: Frequency::Daily,
            times: vec!["09:00".parse().unwrap()],
            start_date: start,
            end_date: end,
            created_at: d(2024, 1, 1).and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn unbounded_medication_always_active() {
        let m = med(None, None);
        assert!(m.is_active(d(1970, 1, 1)));
        assert!(m.is_active(d(2099, 12, 31)));
    }

    #[test]
    fn active_window_is_inclusive() {
        let m = med(Some(d(2024, 1, 5)), Some(d(2024, 1, 10)));
        assert!(!m.is_active(d(2024, 1, 4)));
        assert!(m.is_active(d(2024, 1, 5)));
        assert!(m.is_active(d(2024, 1, 10)));
        assert!(!m.is_active(d(2024, 1, 11)));
    }

    #[test]
    fn open_start_and_open_end() {
        let until = med(None, Some(d(2024, 3, 1)));
        assert!(until.is_active(d(2000, 1, 1)));
        assert!(!until.is_active(d(2024, 3, 2)));

        let from = med(Some(d(2024, 3, 1)), None);
        assert!(!from.is_active(d(2024, 2, 29)));
        assert!(from.is_active(d(2030, 1, 1)));
    }

    #[test]
    fn single_day_window() {
        let m = med(Some(d(2024, 6, 1)), Some(d(2024, 6, 1)));
        assert!(m.is_active(d(2024, 6, 1)));
        assert!(!m.is_active(d(2024, 5, 31)));
        assert!(!m.is_active(d(2024, 6, 2)));
    }

    #[test]
    fn new_medication_deserializes_with_defaults() {
        let input: NewMedication =
            serde_json::from_str(r#"{"name":"Vitamin D","times":["08:00"]}"#).unwrap();
        assert_eq!(input.dosage, "");
        assert_eq!(input.frequency, Frequency::Daily);
        assert!(input.start_date.is_none());
    }

    #[test]
    fn new_medication_dates_must_be_strict_iso() {
        let input: NewMedication = serde_json::from_str(
            r#"{"name":"Vitamin D","times":["08:00"],"start_date":"2024-01-05","end_date":null}"#,
        )
        .unwrap();
        assert_eq!(input.start_date, Some(d(2024, 1, 5)));
        assert!(input.end_date.is_none());

        for bad in ["+10000-01-01", "2024-1-5", "-0001-01-01"] {
            let json = format!(r#"{{"name":"Vitamin D","times":["08:00"],"start_date":"{bad}"}}"#);
            assert!(serde_json::from_str::<NewMedication>(&json).is_err(), "{bad}");
        }
    }
}
