use super::{CalendarStore, GroupDirectory, PersistenceResult, StudentGroup};
use crate::class_session::DaySchedule;
use crate::entity::Identified;
use crate::holiday::CalendarEntry;
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use tracing::debug;

/// SQLite-backed store. Each collection is a table of JSON documents kept in
/// insertion order; a save rewrites the whole table in one transaction.
pub struct SqliteCalendarStore {
    connection: Mutex<Connection>,
}

impl SqliteCalendarStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS day_schedules (
                position INTEGER PRIMARY KEY,
                day TEXT NOT NULL,
                day_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS calendar_entries (
                position INTEGER PRIMARY KEY,
                entry_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                entry_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS student_groups (
                position INTEGER PRIMARY KEY,
                group_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    pub fn save_student_groups(&self, groups: &[StudentGroup]) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM student_groups", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO student_groups (position, group_json) VALUES (?1, ?2)")?;
            for (position, group) in groups.iter().enumerate() {
                stmt.execute(params![position as i64, serde_json::to_string(group)?])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn read_documents<T: serde::de::DeserializeOwned>(&self, sql: &str) -> PersistenceResult<Vec<T>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut items = Vec::new();
        for json in rows {
            items.push(serde_json::from_str(&json?)?);
        }
        Ok(items)
    }
}

impl CalendarStore for SqliteCalendarStore {
    fn get_regular_schedule(&self) -> PersistenceResult<Vec<DaySchedule>> {
        self.read_documents("SELECT day_json FROM day_schedules ORDER BY position ASC")
    }

    fn save_regular_schedule(&self, schedule: &[DaySchedule]) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM day_schedules", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO day_schedules (position, day, day_json) VALUES (?1, ?2, ?3)",
            )?;
            for (position, day) in schedule.iter().enumerate() {
                let json = serde_json::to_string(day)?;
                stmt.execute(params![position as i64, day.day.as_str(), json])?;
            }
        }
        tx.commit()?;
        debug!(days = schedule.len(), "weekly schedule stored");
        Ok(())
    }

    fn get_holidays(&self) -> PersistenceResult<Vec<CalendarEntry>> {
        self.read_documents("SELECT entry_json FROM calendar_entries ORDER BY position ASC")
    }

    fn save_holidays(&self, entries: &[CalendarEntry]) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM calendar_entries", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO calendar_entries (position, entry_id, kind, entry_json) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, entry) in entries.iter().enumerate() {
                let kind = match entry {
                    CalendarEntry::Holiday(_) => "holiday",
                    CalendarEntry::Vacation(_) => "vacation",
                };
                let json = serde_json::to_string(entry)?;
                stmt.execute(params![position as i64, entry.id(), kind, json])?;
            }
        }
        tx.commit()?;
        debug!(entries = entries.len(), "calendar entries stored");
        Ok(())
    }
}

impl GroupDirectory for SqliteCalendarStore {
    fn get_all_student_groups(&self) -> PersistenceResult<Vec<StudentGroup>> {
        self.read_documents("SELECT group_json FROM student_groups ORDER BY position ASC")
    }
}
