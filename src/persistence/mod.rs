use crate::class_session::DaySchedule;
use crate::holiday::{CalendarEntry, EntryShapeError};
use crate::settings::{Settings, StoreBackend};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    EntryShape(#[from] EntryShapeError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Whole-collection storage for the weekly schedule and the combined
/// holiday/vacation collection. Every save replaces what was stored.
pub trait CalendarStore {
    fn get_regular_schedule(&self) -> PersistenceResult<Vec<DaySchedule>>;
    fn save_regular_schedule(&self, schedule: &[DaySchedule]) -> PersistenceResult<()>;
    fn get_holidays(&self) -> PersistenceResult<Vec<CalendarEntry>>;
    fn save_holidays(&self, entries: &[CalendarEntry]) -> PersistenceResult<()>;
}

/// A student group as listed by the group directory. Only `group` is read;
/// any other fields are carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGroup {
    pub group: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StudentGroup {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            extra: Map::new(),
        }
    }
}

pub trait GroupDirectory {
    fn get_all_student_groups(&self) -> PersistenceResult<Vec<StudentGroup>>;
}

impl<T: CalendarStore + ?Sized> CalendarStore for Arc<T> {
    fn get_regular_schedule(&self) -> PersistenceResult<Vec<DaySchedule>> {
        (**self).get_regular_schedule()
    }

    fn save_regular_schedule(&self, schedule: &[DaySchedule]) -> PersistenceResult<()> {
        (**self).save_regular_schedule(schedule)
    }

    fn get_holidays(&self) -> PersistenceResult<Vec<CalendarEntry>> {
        (**self).get_holidays()
    }

    fn save_holidays(&self, entries: &[CalendarEntry]) -> PersistenceResult<()> {
        (**self).save_holidays(entries)
    }
}

impl<T: GroupDirectory + ?Sized> GroupDirectory for Arc<T> {
    fn get_all_student_groups(&self) -> PersistenceResult<Vec<StudentGroup>> {
        (**self).get_all_student_groups()
    }
}

/// A store that also serves student groups and can be shared across threads.
pub trait CalendarBackend: CalendarStore + GroupDirectory + Send + Sync {}

impl<T: CalendarStore + GroupDirectory + Send + Sync> CalendarBackend for T {}

pub type SharedBackend = Arc<dyn CalendarBackend>;

/// Open the backend named in the settings.
pub fn open_backend(settings: &Settings) -> PersistenceResult<SharedBackend> {
    let backend: SharedBackend = match settings.backend {
        StoreBackend::Json => Arc::new(JsonCalendarStore::new(&settings.data_dir)?),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => {
            std::fs::create_dir_all(&settings.data_dir)?;
            Arc::new(sqlite::SqliteCalendarStore::new(
                settings.data_dir.join("calendar.sqlite3"),
            )?)
        }
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => {
            return Err(PersistenceError::Unavailable(
                "built without the `sqlite` feature".into(),
            ));
        }
        StoreBackend::Memory => Arc::new(MemoryCalendarStore::new()),
    };
    info!(backend = ?settings.backend, data_dir = %settings.data_dir.display(), "calendar store opened");
    Ok(backend)
}

/// Distinct group names in first-seen order, blanks skipped.
pub fn group_names(groups: &[StudentGroup]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(groups.len());
    for entry in groups {
        let name = entry.group.trim();
        if !name.is_empty() && !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonCalendarStore, export_entries_to_csv, import_entries_from_csv};
pub use memory::MemoryCalendarStore;
