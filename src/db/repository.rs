use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::AttendanceError;
use crate::models::subject::{validate_goal, validate_name};
use crate::models::{AttendanceRecord, AttendanceStatus, DailyStats, Subject, SubjectAttendance};
use crate::utils::dates::format_date;

// ─── Subject repo ────────────────────────────────────────────────────────────

pub struct SubjectRepo;

impl SubjectRepo {
    pub fn add(conn: &Connection, name: &str, goal: i64) -> Result<i64> {
        let name = validate_name(name)?;
        let goal = validate_goal(goal)?;

        if Self::find_by_name(conn, &name)?.is_some() {
            return Err(AttendanceError::DuplicateSubject(name).into());
        }

        conn.execute(
            "INSERT INTO subjects (name, goal) VALUES (?1, ?2)",
            params![name, goal],
        )?;
        let id = conn.last_insert_rowid();
        log::info!("Added subject '{}' (id {}, goal {}%)", name, id, goal);
        Ok(id)
    }

    pub fn list(conn: &Connection) -> Result<Vec<Subject>> {
        let mut stmt =
            conn.prepare("SELECT id, name, goal, created_at FROM subjects ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
                goal: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Case-insensitive lookup.
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Subject>> {
        conn.query_row(
            "SELECT id, name, goal, created_at FROM subjects WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            |row| {
                Ok(Subject {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    goal: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn require(conn: &Connection, name: &str) -> Result<Subject> {
        Self::find_by_name(conn, name)?
            .ok_or_else(|| AttendanceError::SubjectNotFound(name.trim().to_string()).into())
    }

    pub fn set_goal(conn: &Connection, name: &str, goal: i64) -> Result<()> {
        let goal = validate_goal(goal)?;
        let subject = Self::require(conn, name)?;
        conn.execute(
            "UPDATE subjects SET goal = ?1 WHERE id = ?2",
            params![goal, subject.id],
        )?;
        log::info!("Goal for '{}' set to {}%", subject.name, goal);
        Ok(())
    }

    pub fn rename(conn: &Connection, old: &str, new: &str) -> Result<()> {
        let new = validate_name(new)?;
        let subject = Self::require(conn, old)?;
        if let Some(existing) = Self::find_by_name(conn, &new)? {
            if existing.id != subject.id {
                return Err(AttendanceError::DuplicateSubject(new).into());
            }
        }
        conn.execute(
            "UPDATE subjects SET name = ?1 WHERE id = ?2",
            params![new, subject.id],
        )?;
        Ok(())
    }

    /// Delete a subject and all of its records.
    pub fn remove(conn: &Connection, name: &str) -> Result<()> {
        let subject = Self::require(conn, name)?;
        conn.execute(
            "DELETE FROM attendance_records WHERE subject_id = ?1",
            params![subject.id],
        )?;
        conn.execute("DELETE FROM subjects WHERE id = ?1", params![subject.id])?;
        log::info!("Removed subject '{}'", subject.name);
        Ok(())
    }
}

// ─── Record repo ─────────────────────────────────────────────────────────────

pub struct RecordRepo;

impl RecordRepo {
    /// Record a status for one day. An existing entry for the same day is replaced.
    pub fn mark(
        conn: &Connection,
        subject_id: i64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO attendance_records (subject_id, date, status)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(subject_id, date) DO UPDATE
                SET status = ?3, updated_at = datetime('now')",
            params![subject_id, format_date(date), status.as_str()],
        )?;
        log::debug!("Subject {} marked {} on {}", subject_id, status, date);
        Ok(())
    }

    /// Returns false when there was nothing to remove.
    pub fn unmark(conn: &Connection, subject_id: i64, date: NaiveDate) -> Result<bool> {
        let removed = conn.execute(
            "DELETE FROM attendance_records WHERE subject_id = ?1 AND date = ?2",
            params![subject_id, format_date(date)],
        )?;
        Ok(removed > 0)
    }

    /// Full history in ascending date order.
    pub fn history(conn: &Connection, subject_id: i64) -> Result<Vec<AttendanceRecord>> {
        let mut stmt = conn.prepare(
            "SELECT date, status FROM attendance_records
             WHERE subject_id = ?1 ORDER BY date",
        )?;

        let rows = stmt.query_map(params![subject_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (date, status) = r?;
            result.push(AttendanceRecord {
                date,
                status: status_from_sql(&status)?,
            });
        }
        Ok(result)
    }

    pub fn load_subject(conn: &Connection, subject: &Subject) -> Result<SubjectAttendance> {
        let history = Self::history(conn, subject.id)?;
        Ok(SubjectAttendance::new(subject.name.clone(), Some(subject.goal)).with_history(history))
    }

    pub fn load_all(conn: &Connection) -> Result<Vec<(Subject, SubjectAttendance)>> {
        let mut result = Vec::new();
        for subject in SubjectRepo::list(conn)? {
            let attendance = Self::load_subject(conn, &subject)?;
            result.push((subject, attendance));
        }
        Ok(result)
    }

    /// Merge an imported subject into the store, creating it when missing.
    /// Records with a malformed date are skipped; same-date records replace
    /// whatever is stored for that day.
    pub fn import_subject(
        conn: &Connection,
        incoming: &SubjectAttendance,
        default_goal: i32,
    ) -> Result<ImportOutcome> {
        let valid_goal = incoming.goal.filter(|g| (1..=100).contains(g));
        if let Some(raw) = incoming.goal.filter(|_| valid_goal.is_none()) {
            log::warn!("Ignoring out-of-range goal {} for '{}'", raw, incoming.name);
        }

        let subject = match SubjectRepo::find_by_name(conn, &incoming.name)? {
            Some(existing) => {
                if let Some(goal) = valid_goal.filter(|g| *g != existing.goal) {
                    SubjectRepo::set_goal(conn, &existing.name, goal as i64)?;
                }
                existing
            }
            None => {
                let goal = valid_goal.unwrap_or(default_goal);
                SubjectRepo::add(conn, &incoming.name, goal as i64)?;
                SubjectRepo::require(conn, &incoming.name)?
            }
        };

        let mut outcome = ImportOutcome::default();
        for record in &incoming.history {
            match record.parsed_date() {
                Some(date) => {
                    Self::mark(conn, subject.id, date, record.status)?;
                    outcome.imported += 1;
                }
                None => {
                    log::warn!(
                        "Skipping '{}' record with malformed date '{}'",
                        subject.name,
                        record.date
                    );
                    outcome.skipped += 1;
                }
            }
        }
        Ok(outcome)
    }

    /// Merge a whole import file in one transaction: either every subject
    /// lands or none does.
    pub fn import_all(
        conn: &Connection,
        subjects: &[SubjectAttendance],
        default_goal: i32,
    ) -> Result<ImportOutcome> {
        let tx = conn.unchecked_transaction()?;
        let mut total = ImportOutcome::default();
        for subject in subjects {
            let outcome = Self::import_subject(&tx, subject, default_goal)
                .with_context(|| format!("Importing '{}'", subject.name))?;
            total.imported += outcome.imported;
            total.skipped += outcome.skipped;
        }
        tx.commit()?;
        Ok(total)
    }
}

fn status_from_sql(raw: &str) -> rusqlite::Result<AttendanceStatus> {
    AttendanceStatus::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: u32,
    pub skipped: u32,
}

// ─── Stats repo ──────────────────────────────────────────────────────────────

pub struct StatsRepo;

impl StatsRepo {
    /// Per-day counts across every subject for `[start, end]`, one entry per day.
    pub fn daily_counts(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyStats>> {
        let mut stmt = conn.prepare(
            "SELECT date,
                    SUM(CASE WHEN status = 'present'  THEN 1 ELSE 0 END),
                    SUM(CASE WHEN status = 'absent'   THEN 1 ELSE 0 END),
                    SUM(CASE WHEN status = 'no-class' THEN 1 ELSE 0 END)
             FROM attendance_records
             WHERE date >= ?1 AND date <= ?2
             GROUP BY date",
        )?;

        let rows = stmt.query_map(params![format_date(start), format_date(end)], |row| {
            Ok(DailyStats {
                date: row.get(0)?,
                present: row.get::<_, i64>(1)? as u32,
                absent: row.get::<_, i64>(2)? as u32,
                no_class: row.get::<_, i64>(3)? as u32,
            })
        })?;

        let mut by_date: HashMap<String, DailyStats> = HashMap::new();
        for r in rows {
            let stats = r?;
            by_date.insert(stats.date.clone(), stats);
        }

        Ok(start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| {
                let key = format_date(d);
                by_date.remove(&key).unwrap_or(DailyStats {
                    date: key,
                    ..DailyStats::default()
                })
            })
            .collect())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn add_and_find_subject() {
        let conn = setup();
        let id = SubjectRepo::add(&conn, "  Compiler Design ", 80).unwrap();

        let found = SubjectRepo::find_by_name(&conn, "compiler design")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Compiler Design");
        assert_eq!(found.goal, 80);
    }

    #[test]
    fn rejects_duplicates_and_bad_input() {
        let conn = setup();
        SubjectRepo::add(&conn, "DBMS", 75).unwrap();

        let dup = SubjectRepo::add(&conn, "dbms", 75).unwrap_err();
        assert_eq!(
            dup.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::DuplicateSubject("dbms".to_string()))
        );

        let goal = SubjectRepo::add(&conn, "OS", 0).unwrap_err();
        assert_eq!(
            goal.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::InvalidGoal(0))
        );

        let missing = SubjectRepo::set_goal(&conn, "Networks", 60).unwrap_err();
        assert_eq!(
            missing.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::SubjectNotFound("Networks".to_string()))
        );
    }

    #[test]
    fn marking_same_day_replaces() {
        let conn = setup();
        let id = SubjectRepo::add(&conn, "DBMS", 75).unwrap();

        RecordRepo::mark(&conn, id, day(3), AttendanceStatus::Absent).unwrap();
        RecordRepo::mark(&conn, id, day(1), AttendanceStatus::Present).unwrap();
        RecordRepo::mark(&conn, id, day(3), AttendanceStatus::Present).unwrap();

        let history = RecordRepo::history(&conn, id).unwrap();
        assert_eq!(
            history,
            vec![
                AttendanceRecord::new(day(1), AttendanceStatus::Present),
                AttendanceRecord::new(day(3), AttendanceStatus::Present),
            ]
        );
    }

    #[test]
    fn unmark_reports_whether_anything_changed() {
        let conn = setup();
        let id = SubjectRepo::add(&conn, "DBMS", 75).unwrap();
        RecordRepo::mark(&conn, id, day(2), AttendanceStatus::NoClass).unwrap();

        assert!(RecordRepo::unmark(&conn, id, day(2)).unwrap());
        assert!(!RecordRepo::unmark(&conn, id, day(2)).unwrap());
        assert!(RecordRepo::history(&conn, id).unwrap().is_empty());
    }

    #[test]
    fn remove_drops_records() {
        let conn = setup();
        let id = SubjectRepo::add(&conn, "DBMS", 75).unwrap();
        RecordRepo::mark(&conn, id, day(2), AttendanceStatus::Present).unwrap();

        SubjectRepo::remove(&conn, "DBMS").unwrap();
        assert!(SubjectRepo::list(&conn).unwrap().is_empty());
        let left: i64 = conn
            .query_row("SELECT COUNT(*) FROM attendance_records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn rename_keeps_history() {
        let conn = setup();
        let id = SubjectRepo::add(&conn, "Maths", 75).unwrap();
        SubjectRepo::add(&conn, "Physics", 75).unwrap();
        RecordRepo::mark(&conn, id, day(2), AttendanceStatus::Present).unwrap();

        assert!(SubjectRepo::rename(&conn, "Maths", "physics").is_err());
        SubjectRepo::rename(&conn, "Maths", "Discrete Maths").unwrap();

        let subject = SubjectRepo::require(&conn, "Discrete Maths").unwrap();
        assert_eq!(subject.id, id);
        assert_eq!(RecordRepo::history(&conn, id).unwrap().len(), 1);
    }

    #[test]
    fn load_all_pairs_subjects_with_history() {
        let conn = setup();
        let a = SubjectRepo::add(&conn, "A", 60).unwrap();
        SubjectRepo::add(&conn, "B", 75).unwrap();
        RecordRepo::mark(&conn, a, day(1), AttendanceStatus::Present).unwrap();

        let all = RecordRepo::load_all(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].1.name, "A");
        assert_eq!(all[0].1.goal, Some(60));
        assert_eq!(all[0].1.history.len(), 1);
        assert!(all[1].1.history.is_empty());
    }

    #[test]
    fn import_skips_malformed_dates() {
        let conn = setup();
        let incoming = SubjectAttendance::new("OS", None).with_history(vec![
            AttendanceRecord::new(day(1), AttendanceStatus::Present),
            AttendanceRecord {
                date: "2026-08-xx".to_string(),
                status: AttendanceStatus::Absent,
            },
            AttendanceRecord::new(day(2), AttendanceStatus::Absent),
            AttendanceRecord::new(day(2), AttendanceStatus::Present),
        ]);

        let outcome = RecordRepo::import_subject(&conn, &incoming, 70).unwrap();
        assert_eq!(outcome, ImportOutcome { imported: 3, skipped: 1 });

        let subject = SubjectRepo::require(&conn, "OS").unwrap();
        assert_eq!(subject.goal, 70);
        let history = RecordRepo::history(&conn, subject.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, AttendanceStatus::Present);
    }

    #[test]
    fn import_keeps_goal_when_file_goal_out_of_range() {
        let conn = setup();
        SubjectRepo::add(&conn, "DBMS", 60).unwrap();

        let incoming = SubjectAttendance::new("DBMS", Some(150));
        RecordRepo::import_subject(&conn, &incoming, 75).unwrap();
        assert_eq!(SubjectRepo::require(&conn, "DBMS").unwrap().goal, 60);

        let incoming = SubjectAttendance::new("DBMS", Some(80));
        RecordRepo::import_subject(&conn, &incoming, 75).unwrap();
        assert_eq!(SubjectRepo::require(&conn, "DBMS").unwrap().goal, 80);

        let fresh = SubjectAttendance::new("OS", Some(0));
        RecordRepo::import_subject(&conn, &fresh, 75).unwrap();
        assert_eq!(SubjectRepo::require(&conn, "OS").unwrap().goal, 75);
    }

    #[test]
    fn failed_import_leaves_store_untouched() {
        let conn = setup();
        let subjects = vec![
            SubjectAttendance::new("DBMS", Some(75)).with_history(vec![
                AttendanceRecord::new(day(1), AttendanceStatus::Present),
                AttendanceRecord::new(day(2), AttendanceStatus::Absent),
            ]),
            SubjectAttendance::new("   ", None),
        ];

        let err = RecordRepo::import_all(&conn, &subjects, 75).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::EmptySubjectName)
        );
        assert!(SubjectRepo::list(&conn).unwrap().is_empty());
        let stored: i64 = conn
            .query_row("SELECT COUNT(*) FROM attendance_records", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, 0);

        let outcome = RecordRepo::import_all(&conn, &subjects[..1], 75).unwrap();
        assert_eq!(outcome, ImportOutcome { imported: 2, skipped: 0 });
        assert_eq!(SubjectRepo::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn unknown_stored_status_is_a_conversion_failure() {
        assert_eq!(status_from_sql("p").unwrap(), AttendanceStatus::Present);
        match status_from_sql("late") {
            Err(rusqlite::Error::FromSqlConversionFailure(1, Type::Text, _)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn daily_counts_fill_empty_days() {
        let conn = setup();
        let a = SubjectRepo::add(&conn, "A", 75).unwrap();
        let b = SubjectRepo::add(&conn, "B", 75).unwrap();
        RecordRepo::mark(&conn, a, day(2), AttendanceStatus::Present).unwrap();
        RecordRepo::mark(&conn, b, day(2), AttendanceStatus::Absent).unwrap();
        RecordRepo::mark(&conn, b, day(4), AttendanceStatus::NoClass).unwrap();

        let stats = StatsRepo::daily_counts(&conn, day(1), day(4)).unwrap();
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].date, "2026-08-01");
        assert_eq!(stats[0].held(), 0);
        assert_eq!((stats[1].present, stats[1].absent), (1, 1));
        assert_eq!(stats[3].no_class, 1);
    }

    #[test]
    fn meta_round_trip() {
        let conn = setup();
        assert_eq!(MetaRepo::get(&conn, "last_import").unwrap(), None);
        MetaRepo::set(&conn, "last_import", "2026-08-01").unwrap();
        MetaRepo::set(&conn, "last_import", "2026-08-02").unwrap();
        assert_eq!(
            MetaRepo::get(&conn, "last_import").unwrap().as_deref(),
            Some("2026-08-02")
        );
    }
}
