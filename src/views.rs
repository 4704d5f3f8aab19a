//! Display ordering for the three lists. Nothing here mutates its input.

use crate::calendar::DayOfWeek;
use crate::class_session::{ClassSession, WeeklySchedule};
use crate::entity::EntityKind;
use crate::holiday::{CalendarEntry, Holiday, VacationPeriod};
use chrono::NaiveDate;
use serde::Serialize;

/// The sessions of one weekday, earliest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup<'a> {
    pub day: DayOfWeek,
    pub sessions: Vec<&'a ClassSession>,
}

/// Row-level action a list forwards to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Edit(String),
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub kind: EntityKind,
    pub action: ListAction,
}

impl RowAction {
    pub fn edit(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            action: ListAction::Edit(id.into()),
        }
    }

    pub fn delete(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            action: ListAction::Delete(id.into()),
        }
    }
}

/// Group by weekday in Monday..Sunday order, sessions sorted by start time.
/// Days without sessions are left out.
pub fn class_list(schedule: &WeeklySchedule) -> Vec<DayGroup<'_>> {
    DayOfWeek::ALL
        .iter()
        .filter_map(|&day| {
            let mut sessions: Vec<&ClassSession> = schedule
                .days()
                .iter()
                .filter(|entry| entry.day == day)
                .flat_map(|entry| entry.classes.iter())
                .collect();
            if sessions.is_empty() {
                return None;
            }
            sessions.sort_by_key(|session| session.start_minutes());
            Some(DayGroup { day, sessions })
        })
        .collect()
}

/// Same as [`class_list`] but only the sessions running in the ISO week.
pub fn sessions_for_week(schedule: &WeeklySchedule, iso_week: u32) -> Vec<DayGroup<'_>> {
    class_list(schedule)
        .into_iter()
        .filter_map(|mut group| {
            group.sessions.retain(|session| session.occurs_in_week(iso_week));
            (!group.sessions.is_empty()).then_some(group)
        })
        .collect()
}

pub fn holiday_list(holidays: &[Holiday]) -> Vec<&Holiday> {
    let mut rows: Vec<&Holiday> = holidays.iter().collect();
    rows.sort_by_key(|holiday| holiday.date);
    rows
}

pub fn vacation_list(vacations: &[VacationPeriod]) -> Vec<&VacationPeriod> {
    let mut rows: Vec<&VacationPeriod> = vacations.iter().collect();
    rows.sort_by_key(|period| period.start_date);
    rows
}

/// Holidays and vacations still running on or after `from`, by first day.
pub fn upcoming_entries(entries: &[CalendarEntry], from: NaiveDate) -> Vec<&CalendarEntry> {
    let mut rows: Vec<&CalendarEntry> = entries
        .iter()
        .filter(|entry| entry.last_day() >= from)
        .collect();
    rows.sort_by_key(|entry| entry.first_day());
    rows
}
