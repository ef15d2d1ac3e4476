use std::sync::Mutex;

use chrono::NaiveDate;
use chrono_tz::Tz;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use hirewire_core::types::{Interview, OwnerCount, DEFAULT_CATEGORY, NO_TIME};
use hirewire_core::update::InterviewPatch;
use hirewire_core::validate::looks_like_time;

use crate::db::init_db;
use crate::error::Result;

const SELECT_COLUMNS: &str = "id, owner_id, owner_name, interview_date, interview_time, \
                              category, description, created_at";

/// Map a SELECT row (column order from [`SELECT_COLUMNS`]) to an
/// Interview. Centralised so every query in this crate stays consistent.
fn row_to_interview(row: &rusqlite::Row<'_>) -> rusqlite::Result<Interview> {
    let date_str: String = row.get(3)?;
    let date = date_str.parse::<NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Interview {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_name: row.get(2)?,
        date,
        time: row.get(4)?,
        category: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Owner-scoped persistence for interview records.
///
/// Thread-safe: the SQLite connection sits behind a Mutex, and every
/// write is owner-scoped in its WHERE clause, so two owners can never
/// both hit the same row.
pub struct InterviewStore {
    db: Mutex<Connection>,
    tz: Tz,
}

impl InterviewStore {
    /// Wrap `conn`, initialising the schema (and the time-column
    /// migration) if needed. `tz` anchors every "today" computation.
    pub fn new(conn: Connection, tz: Tz) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
            tz,
        })
    }

    /// The current date in the store's time zone.
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Insert a record and return its assigned id. A missing time is
    /// stored as the [`NO_TIME`] sentinel.
    pub fn create(
        &self,
        owner_id: i64,
        owner_name: &str,
        date: NaiveDate,
        time: Option<&str>,
        category: &str,
        description: &str,
    ) -> Result<i64> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO interviews
             (owner_id, owner_name, interview_date, interview_time,
              category, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                owner_id,
                owner_name,
                date.to_string(),
                time.unwrap_or(NO_TIME),
                category,
                description,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        let id = db.last_insert_rowid();
        debug!(id, owner_id, "interview created");
        Ok(id)
    }

    /// Unscoped lookup by id. Used by the update path to inspect the
    /// stored category before the repair rule fires.
    pub fn get(&self, id: i64) -> Result<Option<Interview>> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM interviews WHERE id = ?1"),
                [id],
                row_to_interview,
            )
            .optional()?;
        Ok(row)
    }

    /// All records of one owner, `(date, time)` ascending (NULL/blank
    /// times sort before populated ones). With `include_past` false,
    /// only records dated today or later are returned.
    pub fn list_for_owner(&self, owner_id: i64, include_past: bool) -> Result<Vec<Interview>> {
        let today = self.today().to_string();
        let db = self.db.lock().unwrap();
        let mut stmt;
        let rows = if include_past {
            stmt = db.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM interviews WHERE owner_id = ?1
                 ORDER BY interview_date, interview_time"
            ))?;
            stmt.query_map([owner_id], row_to_interview)?
        } else {
            stmt = db.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM interviews
                 WHERE owner_id = ?1 AND interview_date >= ?2
                 ORDER BY interview_date, interview_time"
            ))?;
            stmt.query_map(rusqlite::params![owner_id, today], row_to_interview)?
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All records on a single date, ordered by time.
    pub fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Interview>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM interviews WHERE interview_date = ?1
             ORDER BY interview_time"
        ))?;
        let rows = stmt.query_map([date.to_string()], row_to_interview)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every record dated today or later, across all owners.
    pub fn list_all_future(&self) -> Result<Vec<Interview>> {
        let today = self.today().to_string();
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM interviews WHERE interview_date >= ?1
             ORDER BY interview_date, interview_time"
        ))?;
        let rows = stmt.query_map([today], row_to_interview)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Total records per owner, descending by count. Ties keep SQLite's
    /// natural (insertion-stable) order.
    pub fn count_by_owner(&self) -> Result<Vec<OwnerCount>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT owner_name, COUNT(*) AS n FROM interviews
             GROUP BY owner_id ORDER BY n DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(OwnerCount {
                owner_name: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// All-time record count for one owner.
    pub fn count_for_owner(&self, owner_id: i64) -> Result<i64> {
        let db = self.db.lock().unwrap();
        let count = db.query_row(
            "SELECT COUNT(*) FROM interviews WHERE owner_id = ?1",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Apply a partial update to the record matching both `id` and
    /// `owner_id`. Returns whether a row changed; "not found" and "not
    /// owned" are indistinguishable here, and stay that way upstream.
    ///
    /// Repair rule: when the patch sets a time but no category, and the
    /// stored category is itself time-shaped (misfiled legacy data),
    /// the category is reset to [`DEFAULT_CATEGORY`] in the same
    /// statement.
    pub fn update(&self, id: i64, owner_id: i64, patch: &InterviewPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut patch = patch.clone();
        if patch.time.is_some() && patch.category.is_none() {
            if let Some(current) = self.get(id)? {
                if looks_like_time(&current.category) {
                    patch.category = Some(DEFAULT_CATEGORY.to_string());
                }
            }
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();
        if let Some(ref v) = patch.date {
            sets.push("interview_date = ?");
            params.push(v);
        }
        if let Some(ref v) = patch.time {
            sets.push("interview_time = ?");
            params.push(v);
        }
        if let Some(ref v) = patch.category {
            sets.push("category = ?");
            params.push(v);
        }
        if let Some(ref v) = patch.description {
            sets.push("description = ?");
            params.push(v);
        }
        params.push(&id);
        params.push(&owner_id);

        let sql = format!(
            "UPDATE interviews SET {} WHERE id = ? AND owner_id = ?",
            sets.join(", ")
        );
        let db = self.db.lock().unwrap();
        let n = db.execute(&sql, &params[..])?;
        debug!(id, owner_id, changed = n > 0, "interview update");
        Ok(n > 0)
    }

    /// Delete the record matching both `id` and `owner_id`. Returns
    /// whether a row was removed (same ambiguity as [`update`]).
    ///
    /// [`update`]: InterviewStore::update
    pub fn delete(&self, id: i64, owner_id: i64) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "DELETE FROM interviews WHERE id = ?1 AND owner_id = ?2",
            rusqlite::params![id, owner_id],
        )?;
        Ok(n > 0)
    }

    /// Retention sweep: remove every record dated before `cutoff`.
    /// Returns the number removed.
    pub fn delete_before(&self, cutoff: NaiveDate) -> Result<usize> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "DELETE FROM interviews WHERE interview_date < ?1",
            [cutoff.to_string()],
        )?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> InterviewStore {
        let conn = Connection::open_in_memory().unwrap();
        InterviewStore::new(conn, chrono_tz::Europe::Paris).unwrap()
    }

    fn date(store: &InterviewStore, offset: i64) -> NaiveDate {
        store.today() + Duration::days(offset)
    }

    #[test]
    fn create_then_list_round_trips_all_fields() {
        let store = store();
        let day = date(&store, 2);
        let id = store
            .create(10, "alex", day, Some("14:30"), "Technical", "System Design")
            .unwrap();

        let listed = store.list_for_owner(10, false).unwrap();
        assert_eq!(listed.len(), 1);
        let record = &listed[0];
        assert_eq!(record.id, id);
        assert_eq!(record.owner_id, 10);
        assert_eq!(record.owner_name, "alex");
        assert_eq!(record.date, day);
        assert_eq!(record.time.as_deref(), Some("14:30"));
        assert_eq!(record.category, "Technical");
        assert_eq!(record.description, "System Design");
    }

    #[test]
    fn missing_time_is_stored_as_the_sentinel() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), None, "Technical", "prep")
            .unwrap();
        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.time.as_deref(), Some(NO_TIME));
        assert_eq!(record.clock_time(), None);
    }

    #[test]
    fn list_for_owner_hides_other_owners_and_the_past() {
        let store = store();
        store
            .create(10, "alex", date(&store, -2), None, "HR", "done")
            .unwrap();
        store
            .create(10, "alex", date(&store, 1), None, "HR", "soon")
            .unwrap();
        store
            .create(11, "sam", date(&store, 1), None, "HR", "other owner")
            .unwrap();

        let future = store.list_for_owner(10, false).unwrap();
        assert_eq!(future.len(), 1);
        assert_eq!(future[0].description, "soon");

        let all = store.list_for_owner(10, true).unwrap();
        assert_eq!(all.len(), 2);
        // Ascending by date: the past record first.
        assert_eq!(all[0].description, "done");
    }

    #[test]
    fn update_applies_only_named_fields() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), Some("10:00"), "Technical", "prep")
            .unwrap();

        let patch = InterviewPatch {
            description: Some("final round".into()),
            ..Default::default()
        };
        assert!(store.update(id, 10, &patch).unwrap());

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.description, "final round");
        assert_eq!(record.category, "Technical");
        assert_eq!(record.time.as_deref(), Some("10:00"));
    }

    #[test]
    fn update_by_non_owner_changes_nothing() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), None, "Technical", "prep")
            .unwrap();
        let before = store.get(id).unwrap().unwrap();

        let patch = InterviewPatch {
            description: Some("hijacked".into()),
            ..Default::default()
        };
        assert!(!store.update(id, 99, &patch).unwrap());
        assert_eq!(store.get(id).unwrap().unwrap(), before);
    }

    #[test]
    fn time_update_repairs_a_time_shaped_category() {
        let store = store();
        // Legacy-style row: the time was misfiled into the category.
        let id = store
            .create(10, "alex", date(&store, 1), None, "14:30", "prep")
            .unwrap();

        let patch = InterviewPatch {
            time: Some("09:00".into()),
            ..Default::default()
        };
        assert!(store.update(id, 10, &patch).unwrap());

        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.time.as_deref(), Some("09:00"));
        assert_eq!(record.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn explicit_category_suppresses_the_repair() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), None, "14:30", "prep")
            .unwrap();

        let patch = InterviewPatch {
            time: Some("09:00".into()),
            category: Some("Behavioral".into()),
            ..Default::default()
        };
        assert!(store.update(id, 10, &patch).unwrap());
        assert_eq!(store.get(id).unwrap().unwrap().category, "Behavioral");
    }

    #[test]
    fn healthy_category_is_left_alone_on_time_update() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), None, "Technical", "prep")
            .unwrap();

        let patch = InterviewPatch {
            time: Some("09:00".into()),
            ..Default::default()
        };
        assert!(store.update(id, 10, &patch).unwrap());
        assert_eq!(store.get(id).unwrap().unwrap().category, "Technical");
    }

    #[test]
    fn delete_by_non_owner_keeps_the_record() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), None, "Technical", "prep")
            .unwrap();

        assert!(!store.delete(id, 99).unwrap());
        assert!(store.get(id).unwrap().is_some());

        assert!(store.delete(id, 10).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn delete_before_respects_the_cutoff_boundary() {
        let store = store();
        let cutoff = date(&store, 0);
        store
            .create(10, "alex", cutoff - Duration::days(3), None, "HR", "old")
            .unwrap();
        store
            .create(10, "alex", cutoff, None, "HR", "boundary")
            .unwrap();
        store
            .create(10, "alex", cutoff + Duration::days(3), None, "HR", "future")
            .unwrap();

        assert_eq!(store.delete_before(cutoff).unwrap(), 1);
        let left = store.list_for_owner(10, true).unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|r| r.date >= cutoff));
    }

    #[test]
    fn counts_aggregate_per_owner_descending() {
        let store = store();
        store
            .create(10, "alex", date(&store, 1), None, "HR", "a")
            .unwrap();
        store
            .create(10, "alex", date(&store, 2), None, "HR", "b")
            .unwrap();
        store
            .create(11, "sam", date(&store, 1), None, "HR", "c")
            .unwrap();

        let counts = store.count_by_owner().unwrap();
        assert_eq!(
            counts,
            vec![
                OwnerCount {
                    owner_name: "alex".into(),
                    count: 2
                },
                OwnerCount {
                    owner_name: "sam".into(),
                    count: 1
                },
            ]
        );

        assert_eq!(store.count_for_owner(10).unwrap(), 2);
        assert_eq!(store.count_for_owner(12).unwrap(), 0);
    }

    #[test]
    fn list_for_date_orders_by_time_with_sentinel_rows() {
        let store = store();
        let day = date(&store, 1);
        store
            .create(10, "alex", day, Some("15:00"), "HR", "late")
            .unwrap();
        store
            .create(11, "sam", day, Some("09:00"), "HR", "early")
            .unwrap();
        store
            .create(12, "kim", date(&store, 2), None, "HR", "other day")
            .unwrap();

        let listed = store.list_for_date(day).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].description, "early");
        assert_eq!(listed[1].description, "late");
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let store = store();
        let id = store
            .create(10, "alex", date(&store, 1), None, "Technical", "prep")
            .unwrap();
        assert!(!store.update(id, 10, &InterviewPatch::default()).unwrap());
    }
}
