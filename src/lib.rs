pub mod calendar;
pub mod class_session;
pub mod editor;
pub mod entity;
pub mod holiday;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod manager;
pub mod persistence;
pub mod settings;
pub mod status;
pub mod validation;
pub mod views;

pub use calendar::{DayOfWeek, WeekType};
pub use class_session::{ClassSession, DaySchedule, SessionPlacement, WeeklySchedule};
pub use editor::{
    ClassDraft, ClassEditor, ClassField, Draft, Editor, EditorError, EditorMode, EntityDraft,
    FieldValue, HolidayDraft, HolidayEditor, HolidayField, VacationDraft, VacationEditor,
    VacationField,
};
pub use entity::{Entity, EntityKind, Identified};
pub use holiday::{CalendarEntry, Holiday, HolidayType, VacationPeriod, VacationType};
pub use manager::{CalendarManager, ManagerError};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteCalendarStore;
pub use persistence::{
    CalendarBackend, CalendarStore, GroupDirectory, JsonCalendarStore, MemoryCalendarStore,
    PersistenceError, SharedBackend, StudentGroup, export_entries_to_csv, import_entries_from_csv,
    open_backend,
};
pub use settings::{Settings, StoreBackend};
pub use status::{ClearPolicy, Clock, ManualClock, StatusBoard, SystemClock};
pub use validation::{FieldErrors, FormField};
pub use views::{DayGroup, ListAction, RowAction};
