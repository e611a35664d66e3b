//! Medication registry — definitions and their active date windows.
//!
//! Medications are validated in full before anything is written, then stored
//! as immutable records. Removal cascades to the dose log.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::TrackerError;
use crate::models::{ensure_storable_date, DoseTime, Medication, NewMedication};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DOSAGE_LEN: usize = 100;

/// Validates `input` and stores it under a fresh id.
pub fn add_medication(conn: &Connection, input: &NewMedication) -> Result<Medication, TrackerError> {
    let med = validate_new_medication(input)?;
    repository::insert_medication(conn, &med)?;
    tracing::info!(
        medication_id = %med.id,
        name = %med.name,
        slots = med.times.len(),
        "Medication added"
    );
    Ok(med)
}

/// Builds the record that `add_medication` would store, without touching storage.
pub fn validate_new_medication(input: &NewMedication) -> Result<Medication, TrackerError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(TrackerError::validation("Medication name is required"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(TrackerError::validation(format!(
            "Medication name must be {MAX_NAME_LEN} characters or fewer"
        )));
    }

    let dosage = input.dosage.trim();
    if dosage.len() > MAX_DOSAGE_LEN {
        return Err(TrackerError::validation(format!(
            "Dosage must be {MAX_DOSAGE_LEN} characters or fewer"
        )));
    }

    let times = normalize_times(&input.times)?;

    for date in [input.start_date, input.end_date].into_iter().flatten() {
        ensure_storable_date(date)?;
    }

    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if start > end {
            return Err(TrackerError::validation(format!(
                "Start date {start} is after end date {end}"
            )));
        }
    }

    Ok(Medication {
        id: Uuid::new_v4(),
        name: name.to_string(),
        dosage: dosage.to_string(),
        frequency: input.frequency,
        times,
        start_date: input.start_date,
        end_date: input.end_date,
        created_at: Local::now().naive_local(),
    })
}

/// Parses every time, drops repeats (first occurrence wins) and rejects an
/// empty result.
fn normalize_times(raw: &[String]) -> Result<Vec<DoseTime>, TrackerError> {
    let mut seen = HashSet::new();
    let mut times = Vec::with_capacity(raw.len());
    for value in raw {
        let time: DoseTime = value.trim().parse()?;
        if seen.insert(time) {
            times.push(time);
        }
    }
    if times.is_empty() {
        return Err(TrackerError::validation("At least one scheduled time is required"));
    }
    Ok(times)
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Medication, TrackerError> {
    repository::get_medication(conn, id)?.ok_or_else(|| TrackerError::medication_not_found(id))
}

pub fn list_medications(conn: &Connection) -> Result<Vec<Medication>, TrackerError> {
    Ok(repository::get_all_medications(conn)?)
}

/// Removes the medication and all of its dose logs atomically.
/// Unknown ids fail with `NotFound` and leave storage untouched.
pub fn delete_medication(conn: &Connection, id: &Uuid) -> Result<(), TrackerError> {
    repository::delete_medication_cascade(conn, id)?;
    tracing::info!(medication_id = %id, "Medication deleted");
    Ok(())
}

pub fn is_active(med: &Medication, on_date: NaiveDate) -> bool {
    med.is_active(on_date)
}
