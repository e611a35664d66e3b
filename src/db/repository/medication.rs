use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, parse_date_column, parse_timestamp_column, parse_uuid_column};
use crate::db::DatabaseError;
use crate::models::*;

const MEDICATION_COLUMNS: &str =
    "id, name, dosage, frequency, times, start_date, end_date, created_at";

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    let times_json = serde_json::to_string(&med.times)?;
    conn.execute(
        "INSERT INTO medications (id, name, dosage, frequency, times, start_date, end_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            med.id.to_string(),
            med.name,
            med.dosage,
            med.frequency.as_str(),
            times_json,
            med.start_date.map(|d| d.to_string()),
            med.end_date.map(|d| d.to_string()),
            format_timestamp(&med.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?1"),
            params![id.to_string()],
            medication_row_from_rusqlite,
        )
        .optional()?;

    row.map(medication_from_row).transpose()
}

/// All medications in stable insertion order.
pub fn get_all_medications(conn: &Connection) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICATION_COLUMNS} FROM medications ORDER BY created_at, rowid"
    ))?;

    let rows = stmt.query_map([], medication_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(meds)
}

pub fn medication_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM medications WHERE id = ?1)",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists != 0)
}

/// Deletes the medication and every dose log that references it, in one
/// transaction. Nothing is removed when the id is unknown.
pub fn delete_medication_cascade(conn: &Connection, med_id: &Uuid) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let logs_removed = tx.execute(
        "DELETE FROM dose_logs WHERE medication_id = ?1",
        params![med_id.to_string()],
    )?;
    let deleted = tx.execute("DELETE FROM medications WHERE id = ?1", params![med_id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: med_id.to_string(),
        });
    }
    tx.commit()?;
    tracing::debug!(%med_id, logs_removed, "Medication rows deleted");
    Ok(())
}

// Internal row type for Medication mapping
struct MedicationRow {
    id: String,
    name: String,
    dosage: String,
    frequency: String,
    times: String,
    start_date: Option<String>,
    end_date: Option<String>,
    created_at: String,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        dosage: row.get(2)?,
        frequency: row.get(3)?,
        times: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: parse_uuid_column(&row.id)?,
        name: row.name,
        dosage: row.dosage,
        frequency: row.frequency.parse()?,
        times: serde_json::from_str::<Vec<DoseTime>>(&row.times)?,
        start_date: row.start_date.as_deref().map(parse_date_column).transpose()?,
        end_date: row.end_date.as_deref().map(parse_date_column).transpose()?,
        created_at: parse_timestamp_column(&row.created_at)?,
    })
}
