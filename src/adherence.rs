//! Adherence engine — due doses per date, their status, and percentages.
//!
//! Every call recomputes from the stored medications and dose logs; nothing
//! is cached between calls. The pure helpers (`build_schedule`,
//! `percentage_of`) carry the logic and the `Connection` functions only
//! fetch inputs for them.

use std::collections::{BTreeMap, HashMap};

use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::TrackerError;
use crate::models::*;

type SlotKey = (Uuid, NaiveDate, DoseTime);

/// Longest span `percentage_for_range` will compute in one call.
pub const MAX_RANGE_DAYS: i64 = 3660;

// ═══════════════════════════════════════════
// Pure computation
// ═══════════════════════════════════════════

fn index_logs(logs: &[LogEntry]) -> HashMap<SlotKey, bool> {
    logs.iter()
        .map(|entry| ((entry.medication_id, entry.date, entry.time), entry.taken))
        .collect()
}

fn slots_for_date(
    meds: &[Medication],
    taken: &HashMap<SlotKey, bool>,
    date: NaiveDate,
) -> Vec<ScheduleSlot> {
    let mut slots: Vec<ScheduleSlot> = meds
        .iter()
        .filter(|med| med.is_active(date))
        .flat_map(|med| {
            med.times.iter().map(move |&time| ScheduleSlot {
                medication_id: med.id,
                name: med.name.clone(),
                dosage: med.dosage.clone(),
                time,
                // No log row means not yet taken.
                taken: taken.get(&(med.id, date, time)).copied().unwrap_or(false),
            })
        })
        .collect();

    slots.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| a.medication_id.cmp(&b.medication_id))
    });
    slots
}

/// Due slots for `date` with their taken status, ordered by time then
/// medication id. Log entries for other dates are ignored.
pub fn build_schedule(meds: &[Medication], logs: &[LogEntry], date: NaiveDate) -> Vec<ScheduleSlot> {
    slots_for_date(meds, &index_logs(logs), date)
}

/// `(taken, due)` for `date` under the same rules as `slots_for_date`,
/// without materializing the slots.
fn tally_for_date(meds: &[Medication], taken: &HashMap<SlotKey, bool>, date: NaiveDate) -> (usize, usize) {
    meds.iter()
        .filter(|med| med.is_active(date))
        .flat_map(|med| med.times.iter().map(move |&time| (med.id, time)))
        .fold((0, 0), |(done, due), (id, time)| {
            let hit = taken.get(&(id, date, time)).copied().unwrap_or(false);
            (done + usize::from(hit), due + 1)
        })
}

fn ratio(taken: usize, due: usize) -> f64 {
    if due == 0 {
        return 0.0;
    }
    100.0 * taken as f64 / due as f64
}

/// `100 * taken / due`, or `0.0` when nothing is due.
pub fn percentage_of(slots: &[ScheduleSlot]) -> f64 {
    ratio(slots.iter().filter(|s| s.taken).count(), slots.len())
}

// ═══════════════════════════════════════════
// Engine operations
// ═══════════════════════════════════════════

pub fn status_for_date(conn: &Connection, date: NaiveDate) -> Result<Vec<ScheduleSlot>, TrackerError> {
    let meds = repository::get_all_medications(conn)?;
    let logs = repository::get_dose_logs_for_date(conn, date)?;
    Ok(build_schedule(&meds, &logs, date))
}

pub fn percentage_for_date(conn: &Connection, date: NaiveDate) -> Result<f64, TrackerError> {
    Ok(percentage_of(&status_for_date(conn, date)?))
}

/// Schedule for `date` with progress counters.
pub fn daily_summary(conn: &Connection, date: NaiveDate) -> Result<DailySummary, TrackerError> {
    let slots = status_for_date(conn, date)?;
    Ok(DailySummary {
        date,
        taken_count: slots.iter().filter(|s| s.taken).count(),
        due_count: slots.len(),
        percentage: percentage_of(&slots),
        slots,
    })
}

/// One point per calendar day in `[start, end]`, ascending. Days with no due
/// slots report `0.0`. Spans longer than `MAX_RANGE_DAYS` are rejected.
pub fn percentage_for_range(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AdherencePoint>, TrackerError> {
    ensure_storable_date(start)?;
    ensure_storable_date(end)?;
    if start > end {
        return Err(TrackerError::validation(format!(
            "Range start {start} is after range end {end}"
        )));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(TrackerError::validation(format!(
            "Range spans {days} days; at most {MAX_RANGE_DAYS} are allowed"
        )));
    }

    let meds = repository::get_all_medications(conn)?;
    let logs = repository::get_dose_logs_in_range(conn, start, end)?;
    let taken = index_logs(&logs);

    let points: Vec<AdherencePoint> = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let (done, due) = tally_for_date(&meds, &taken, date);
            AdherencePoint { date, percentage: ratio(done, due) }
        })
        .collect();

    tracing::debug!(%start, %end, days = points.len(), "Adherence range computed");
    Ok(points)
}

/// Marks one slot taken or not taken. Repeated calls for the same
/// `(medication, date, time)` overwrite the same row, so `taken = false`
/// undoes an earlier `true`.
pub fn record_dose(
    conn: &Connection,
    medication_id: &Uuid,
    date: NaiveDate,
    time: DoseTime,
    taken: bool,
) -> Result<(), TrackerError> {
    ensure_storable_date(date)?;
    let med = repository::get_medication(conn, medication_id)?
        .ok_or_else(|| TrackerError::medication_not_found(medication_id))?;

    if !med.is_scheduled_at(time) {
        return Err(TrackerError::validation(format!(
            "{} is not scheduled at {time}",
            med.name
        )));
    }

    repository::upsert_dose_log(
        conn,
        &LogEntry {
            medication_id: med.id,
            date,
            time,
            taken,
            timestamp: Local::now().naive_local(),
        },
    )?;

    tracing::debug!(medication_id = %med.id, %date, %time, taken, "Dose recorded");
    Ok(())
}

/// Logged doses with medication labels, newest first.
pub fn dose_history(conn: &Connection, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>, TrackerError> {
    validate_history_filter(filter)?;
    Ok(repository::fetch_history(conn, filter)?)
}

/// Share of logged rows marked taken, per date that has any log rows.
///
/// Unlike `percentage_for_range` this only looks at what was logged, so
/// a day where one dose was ticked and the rest never touched reads 100.
pub fn logged_adherence_by_date(
    conn: &Connection,
    filter: &HistoryFilter,
) -> Result<Vec<AdherencePoint>, TrackerError> {
    let history = dose_history(conn, filter)?;

    let mut per_day: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for entry in &history {
        let (taken, total) = per_day.entry(entry.date).or_insert((0, 0));
        *total += 1;
        if entry.taken {
            *taken += 1;
        }
    }

    Ok(per_day
        .into_iter()
        .map(|(date, (taken, total))| AdherencePoint {
            date,
            percentage: 100.0 * taken as f64 / total as f64,
        })
        .collect())
}

fn validate_history_filter(filter: &HistoryFilter) -> Result<(), TrackerError> {
    for date in [filter.date_from, filter.date_to].into_iter().flatten() {
        ensure_storable_date(date)?;
    }
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(TrackerError::validation(format!(
                "History start {from} is after history end {to}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::registry;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(s: &str) -> DoseTime {
        s.parse().unwrap()
    }

    fn add(
        conn: &Connection,
        name: &str,
        times: &[&str],
        start: Option<&str>,
        end: Option<&str>,
    ) -> Medication {
        registry::add_medication(
            conn,
            &NewMedication {
                name: name.into(),
                dosage: "200mg".into(),
                frequency: Frequency::Daily,
                times: times.iter().map(|s| s.to_string()).collect(),
                start_date: start.map(d),
                end_date: end.map(d),
            },
        )
        .unwrap()
    }

    fn ibuprofen(conn: &Connection) -> Medication {
        add(conn, "Ibuprofen", &["09:00", "21:00"], Some("2024-01-01"), None)
    }

    #[test]
    fn ibuprofen_scenario() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();

        let slots = status_for_date(&conn, d("2024-01-01")).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].time, t("09:00"));
        assert!(slots[0].taken);
        assert_eq!(slots[1].time, t("21:00"));
        assert!(!slots[1].taken);
        assert_eq!(slots[0].name, "Ibuprofen");
        assert_eq!(slots[0].dosage, "200mg");

        assert_eq!(percentage_for_date(&conn, d("2024-01-01")).unwrap(), 50.0);
    }

    #[test]
    fn empty_day_has_no_slots_and_zero_percent() {
        let conn = test_db();
        assert!(status_for_date(&conn, d("2024-01-01")).unwrap().is_empty());
        assert_eq!(percentage_for_date(&conn, d("2024-01-01")).unwrap(), 0.0);

        ibuprofen(&conn);
        assert!(status_for_date(&conn, d("2023-12-31")).unwrap().is_empty());
        assert_eq!(percentage_for_date(&conn, d("2023-12-31")).unwrap(), 0.0);
    }

    #[test]
    fn window_scenario() {
        let conn = test_db();
        add(&conn, "Antibiotic", &["08:00", "20:00"], Some("2024-01-05"), Some("2024-01-10"));

        assert!(status_for_date(&conn, d("2024-01-01")).unwrap().is_empty());
        assert_eq!(status_for_date(&conn, d("2024-01-06")).unwrap().len(), 2);
        assert!(status_for_date(&conn, d("2024-01-11")).unwrap().is_empty());
    }

    #[test]
    fn slots_sorted_across_medications() {
        let conn = test_db();
        add(&conn, "Evening", &["21:00", "07:00"], None, None);
        add(&conn, "Morning", &["08:00"], None, None);

        let times: Vec<String> = status_for_date(&conn, d("2024-03-01"))
            .unwrap()
            .iter()
            .map(|s| s.time.to_string())
            .collect();
        assert_eq!(times, vec!["07:00", "08:00", "21:00"]);
    }

    #[test]
    fn equal_times_ordered_by_medication_id() {
        let conn = test_db();
        let a = add(&conn, "A", &["09:00"], None, None);
        let b = add(&conn, "B", &["09:00"], None, None);

        let slots = status_for_date(&conn, d("2024-03-01")).unwrap();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(slots.iter().map(|s| s.medication_id).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn as_needed_still_generates_slots() {
        let conn = test_db();
        registry::add_medication(
            &conn,
            &NewMedication {
                name: "Paracetamol".into(),
                dosage: "500mg".into(),
                frequency: Frequency::AsNeeded,
                times: vec!["12:00".into()],
                start_date: None,
                end_date: None,
            },
        )
        .unwrap();
        assert_eq!(status_for_date(&conn, d("2024-03-01")).unwrap().len(), 1);
    }

    #[test]
    fn record_twice_keeps_single_entry() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();

        assert_eq!(repository::count_dose_logs(&conn, &med.id).unwrap(), 1);
    }

    #[test]
    fn toggle_round_trip() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), false).unwrap();

        let slots = status_for_date(&conn, d("2024-01-01")).unwrap();
        let slot = slots.iter().find(|s| s.time == t("09:00")).unwrap();
        assert!(!slot.taken);
        assert_eq!(repository::count_dose_logs(&conn, &med.id).unwrap(), 1);
    }

    #[test]
    fn record_unknown_medication_not_found() {
        let conn = test_db();
        let result = record_dose(&conn, &Uuid::new_v4(), d("2024-01-01"), t("09:00"), true);
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }

    #[test]
    fn record_unscheduled_time_rejected() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        let result = record_dose(&conn, &med.id, d("2024-01-01"), t("10:00"), true);
        assert!(matches!(result, Err(TrackerError::Validation(_))));
        assert_eq!(repository::count_dose_logs(&conn, &med.id).unwrap(), 0);
    }

    #[test]
    fn logs_only_affect_their_own_date() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();

        let next_day = status_for_date(&conn, d("2024-01-02")).unwrap();
        assert!(next_day.iter().all(|s| !s.taken));
    }

    #[test]
    fn range_has_one_point_per_day_ascending() {
        let conn = test_db();
        ibuprofen(&conn);

        let points = percentage_for_range(&conn, d("2024-01-30"), d("2024-03-01")).unwrap();
        // 2024 is a leap year: 2 + 29 + 1 days
        assert_eq!(points.len(), 32);
        assert_eq!(points.first().unwrap().date, d("2024-01-30"));
        assert_eq!(points.last().unwrap().date, d("2024-03-01"));
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn range_single_day() {
        let conn = test_db();
        let points = percentage_for_range(&conn, d("2024-01-01"), d("2024-01-01")).unwrap();
        assert_eq!(points, vec![AdherencePoint { date: d("2024-01-01"), percentage: 0.0 }]);
    }

    #[test]
    fn range_matches_per_day_percentages() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-02"), t("09:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-02"), t("21:00"), true).unwrap();

        let points = percentage_for_range(&conn, d("2023-12-31"), d("2024-01-03")).unwrap();
        let values: Vec<f64> = points.iter().map(|p| p.percentage).collect();
        // before start, half, full, nothing taken
        assert_eq!(values, vec![0.0, 50.0, 100.0, 0.0]);

        for point in &points {
            assert_eq!(point.percentage, percentage_for_date(&conn, point.date).unwrap());
        }
    }

    #[test]
    fn range_longer_than_cap_rejected() {
        let conn = test_db();
        ibuprofen(&conn);
        let start = d("2000-01-01");
        let at_cap = start + chrono::Duration::days(MAX_RANGE_DAYS - 1);

        let points = percentage_for_range(&conn, start, at_cap).unwrap();
        assert_eq!(points.len() as i64, MAX_RANGE_DAYS);

        let past_cap = at_cap + chrono::Duration::days(1);
        let result = percentage_for_range(&conn, start, past_cap);
        assert!(matches!(result, Err(TrackerError::Validation(_))));

        let result = percentage_for_range(&conn, d("0000-01-01"), d("9999-12-31"));
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }

    #[test]
    fn range_tally_agrees_with_slot_schedule() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        add(&conn, "Antibiotic", &["08:00", "20:00"], Some("2024-01-02"), Some("2024-01-03"));
        record_dose(&conn, &med.id, d("2024-01-02"), t("21:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-03"), t("09:00"), false).unwrap();

        for point in percentage_for_range(&conn, d("2024-01-01"), d("2024-01-04")).unwrap() {
            let slots = status_for_date(&conn, point.date).unwrap();
            assert_eq!(point.percentage, percentage_of(&slots));
        }
    }

    #[test]
    fn dates_beyond_four_digit_years_rejected() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();

        let result = record_dose(&conn, &med.id, far, t("09:00"), true);
        assert!(matches!(result, Err(TrackerError::Validation(_))));
        assert_eq!(repository::count_dose_logs(&conn, &med.id).unwrap(), 0);

        let result = percentage_for_range(&conn, d("9999-12-31"), far);
        assert!(matches!(result, Err(TrackerError::Validation(_))));

        let filter = HistoryFilter { date_to: Some(far), ..Default::default() };
        assert!(matches!(dose_history(&conn, &filter), Err(TrackerError::Validation(_))));
    }

    #[test]
    fn last_representable_day_is_consistent() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        let last = d("9999-12-31");
        record_dose(&conn, &med.id, last, t("09:00"), true).unwrap();

        let points = percentage_for_range(&conn, d("9999-12-30"), last).unwrap();
        assert_eq!(points[1].percentage, 50.0);
        assert_eq!(points[1].percentage, percentage_for_date(&conn, last).unwrap());
        assert!(status_for_date(&conn, last).unwrap()[0].taken);
    }

    #[test]
    fn inverted_range_rejected() {
        let conn = test_db();
        let result = percentage_for_range(&conn, d("2024-01-02"), d("2024-01-01"));
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }

    #[test]
    fn delete_removes_slots_and_logs() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();

        registry::delete_medication(&conn, &med.id).unwrap();

        assert!(status_for_date(&conn, d("2024-01-01")).unwrap().is_empty());
        assert!(dose_history(&conn, &HistoryFilter::default()).unwrap().is_empty());
        assert_eq!(repository::count_dose_logs(&conn, &med.id).unwrap(), 0);
    }

    #[test]
    fn daily_summary_counts() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        add(&conn, "Vitamin D", &["08:00"], None, None);
        record_dose(&conn, &med.id, d("2024-01-01"), t("21:00"), true).unwrap();

        let summary = daily_summary(&conn, d("2024-01-01")).unwrap();
        assert_eq!(summary.due_count, 3);
        assert_eq!(summary.taken_count, 1);
        assert!((summary.percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.slots.len(), 3);
    }

    #[test]
    fn build_schedule_ignores_other_dates() {
        let med = Medication {
            id: Uuid::new_v4(),
            name: "Ibuprofen".into(),
            dosage: String::new(),
            frequency: Frequency::Daily,
            times: vec![t("09:00")],
            start_date: None,
            end_date: None,
            created_at: d("2024-01-01").and_hms_opt(0, 0, 0).unwrap(),
        };
        let logs = vec![LogEntry {
            medication_id: med.id,
            date: d("2024-01-02"),
            time: t("09:00"),
            taken: true,
            timestamp: d("2024-01-02").and_hms_opt(9, 5, 0).unwrap(),
        }];

        assert!(!build_schedule(&[med.clone()], &logs, d("2024-01-01"))[0].taken);
        assert!(build_schedule(&[med], &logs, d("2024-01-02"))[0].taken);
    }

    #[test]
    fn percentage_of_empty_is_zero() {
        assert_eq!(percentage_of(&[]), 0.0);
    }

    #[test]
    fn logged_adherence_uses_logged_rows_only() {
        let conn = test_db();
        let med = ibuprofen(&conn);
        record_dose(&conn, &med.id, d("2024-01-01"), t("09:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-02"), t("09:00"), true).unwrap();
        record_dose(&conn, &med.id, d("2024-01-02"), t("21:00"), false).unwrap();

        let points = logged_adherence_by_date(&conn, &HistoryFilter::default()).unwrap();
        assert_eq!(
            points,
            vec![
                AdherencePoint { date: d("2024-01-01"), percentage: 100.0 },
                AdherencePoint { date: d("2024-01-02"), percentage: 50.0 },
            ]
        );
    }

    #[test]
    fn history_filter_by_medication() {
        let conn = test_db();
        let ibu = ibuprofen(&conn);
        let vit = add(&conn, "Vitamin D", &["08:00"], None, None);
        record_dose(&conn, &ibu.id, d("2024-01-01"), t("09:00"), true).unwrap();
        record_dose(&conn, &vit.id, d("2024-01-01"), t("08:00"), true).unwrap();

        let filter = HistoryFilter { medication_id: Some(vit.id), ..Default::default() };
        let history = dose_history(&conn, &filter).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "Vitamin D");
    }

    #[test]
    fn history_inverted_dates_rejected() {
        let conn = test_db();
        let filter = HistoryFilter {
            date_from: Some(d("2024-02-01")),
            date_to: Some(d("2024-01-01")),
            ..Default::default()
        };
        assert!(matches!(dose_history(&conn, &filter), Err(TrackerError::Validation(_))));
    }
}
