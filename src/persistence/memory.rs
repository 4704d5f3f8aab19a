use super::{CalendarStore, GroupDirectory, PersistenceError, PersistenceResult, StudentGroup};
use crate::class_session::DaySchedule;
use crate::holiday::CalendarEntry;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct MemoryState {
    schedule: Vec<DaySchedule>,
    entries: Vec<CalendarEntry>,
    groups: Vec<StudentGroup>,
    fail_reads: bool,
    fail_writes: bool,
    schedule_saves: usize,
    holiday_saves: usize,
}

/// Store kept entirely in memory. Reads and writes can be made to fail on
/// demand, which hosts use for demos and tests use for error paths.
#[derive(Debug, Default)]
pub struct MemoryCalendarStore {
    state: Mutex<MemoryState>,
}

impl MemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(self, schedule: Vec<DaySchedule>) -> Self {
        self.state.lock().schedule = schedule;
        self
    }

    pub fn with_entries(self, entries: Vec<CalendarEntry>) -> Self {
        self.state.lock().entries = entries;
        self
    }

    pub fn with_groups(self, groups: Vec<StudentGroup>) -> Self {
        self.state.lock().groups = groups;
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn stored_schedule(&self) -> Vec<DaySchedule> {
        self.state.lock().schedule.clone()
    }

    pub fn stored_entries(&self) -> Vec<CalendarEntry> {
        self.state.lock().entries.clone()
    }

    pub fn schedule_saves(&self) -> usize {
        self.state.lock().schedule_saves
    }

    pub fn holiday_saves(&self) -> usize {
        self.state.lock().holiday_saves
    }

    fn check_read(state: &MemoryState) -> PersistenceResult<()> {
        if state.fail_reads {
            return Err(PersistenceError::Unavailable("read refused".into()));
        }
        Ok(())
    }

    fn check_write(state: &MemoryState) -> PersistenceResult<()> {
        if state.fail_writes {
            return Err(PersistenceError::Unavailable("write refused".into()));
        }
        Ok(())
    }
}

impl CalendarStore for MemoryCalendarStore {
    fn get_regular_schedule(&self) -> PersistenceResult<Vec<DaySchedule>> {
        let state = self.state.lock();
        Self::check_read(&state)?;
        Ok(state.schedule.clone())
    }

    fn save_regular_schedule(&self, schedule: &[DaySchedule]) -> PersistenceResult<()> {
        let mut state = self.state.lock();
        Self::check_write(&state)?;
        state.schedule = schedule.to_vec();
        state.schedule_saves += 1;
        Ok(())
    }

    fn get_holidays(&self) -> PersistenceResult<Vec<CalendarEntry>> {
        let state = self.state.lock();
        Self::check_read(&state)?;
        Ok(state.entries.clone())
    }

    fn save_holidays(&self, entries: &[CalendarEntry]) -> PersistenceResult<()> {
        let mut state = self.state.lock();
        Self::check_write(&state)?;
        state.entries = entries.to_vec();
        state.holiday_saves += 1;
        Ok(())
    }
}

impl GroupDirectory for MemoryCalendarStore {
    fn get_all_student_groups(&self) -> PersistenceResult<Vec<StudentGroup>> {
        let state = self.state.lock();
        Self::check_read(&state)?;
        Ok(state.groups.clone())
    }
}
