use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{
    format_timestamp, parse_date_column, parse_time_column, parse_timestamp_column,
    parse_uuid_column,
};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert or update the single row for `(medication_id, date, time)`.
///
/// One statement, so concurrent writers cannot both miss the existing row
/// and insert duplicates; the UNIQUE constraint arbitrates.
pub fn upsert_dose_log(conn: &Connection, entry: &LogEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO dose_logs (medication_id, date, time, taken, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (medication_id, date, time)
         DO UPDATE SET taken = excluded.taken, timestamp = excluded.timestamp",
        params![
            entry.medication_id.to_string(),
            entry.date.to_string(),
            entry.time.to_string(),
            entry.taken as i32,
            format_timestamp(&entry.timestamp),
        ],
    )?;
    Ok(())
}

pub fn get_dose_log(
    conn: &Connection,
    med_id: &Uuid,
    date: NaiveDate,
    time: DoseTime,
) -> Result<Option<LogEntry>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT medication_id, date, time, taken, timestamp FROM dose_logs
             WHERE medication_id = ?1 AND date = ?2 AND time = ?3",
            params![med_id.to_string(), date.to_string(), time.to_string()],
            log_row_from_rusqlite,
        )
        .optional()?;

    row.map(log_entry_from_row).transpose()
}

pub fn get_dose_logs_for_date(conn: &Connection, date: NaiveDate) -> Result<Vec<LogEntry>, DatabaseError> {
    get_dose_logs_in_range(conn, date, date)
}

/// Every log row with `from <= date <= to`, ordered by date then time.
pub fn get_dose_logs_in_range(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<LogEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT medication_id, date, time, taken, timestamp FROM dose_logs
         WHERE date >= ?1 AND date <= ?2
         ORDER BY date, time, medication_id",
    )?;

    let rows = stmt.query_map(params![from.to_string(), to.to_string()], log_row_from_rusqlite)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(log_entry_from_row(row?)?);
    }
    Ok(entries)
}

pub fn count_dose_logs(conn: &Connection, med_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM dose_logs WHERE medication_id = ?1",
        params![med_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Logged doses joined with medication labels, newest first.
pub fn fetch_history(conn: &Connection, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, DatabaseError> {
    let mut sql = String::from(
        "SELECT l.medication_id, m.name, m.dosage, l.date, l.time, l.taken, l.timestamp
         FROM dose_logs l
         JOIN medications m ON l.medication_id = m.id
         WHERE 1=1",
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref med_id) = filter.medication_id {
        params_vec.push(Box::new(med_id.to_string()));
        sql.push_str(&format!(" AND l.medication_id = ?{}", params_vec.len()));
    }
    if let Some(ref from) = filter.date_from {
        params_vec.push(Box::new(from.to_string()));
        sql.push_str(&format!(" AND l.date >= ?{}", params_vec.len()));
    }
    if let Some(ref to) = filter.date_to {
        params_vec.push(Box::new(to.to_string()));
        sql.push_str(&format!(" AND l.date <= ?{}", params_vec.len()));
    }

    sql.push_str(" ORDER BY l.date DESC, l.time DESC, m.name");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i32>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (med_id, name, dosage, date, time, taken, timestamp) = row?;
        entries.push(HistoryEntry {
            medication_id: parse_uuid_column(&med_id)?,
            name,
            dosage,
            date: parse_date_column(&date)?,
            time: parse_time_column(&time)?,
            taken: taken != 0,
            timestamp: parse_timestamp_column(&timestamp)?,
        });
    }
    Ok(entries)
}

struct LogRow {
    medication_id: String,
    date: String,
    time: String,
    taken: i32,
    timestamp: String,
}

fn log_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<LogRow, rusqlite::Error> {
    Ok(LogRow {
        medication_id: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        taken: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

fn log_entry_from_row(row: LogRow) -> Result<LogEntry, DatabaseError> {
    Ok(LogEntry {
        medication_id: parse_uuid_column(&row.medication_id)?,
        date: parse_date_column(&row.date)?,
        time: parse_time_column(&row.time)?,
        taken: row.taken != 0,
        timestamp: parse_timestamp_column(&row.timestamp)?,
    })
}
