use crate::calendar::{DayOfWeek, WeekType, hhmm, minutes_since_midnight};
use crate::entity::{Identified, new_entity_id, remove_by_id, upsert_by_id};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One recurring class in the weekly timetable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    /// Empty when read from a record written without one.
    #[serde(default)]
    pub id: String,
    pub day: DayOfWeek,
    pub subject: String,
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub alternating: bool,
    /// Only meaningful when `alternating` is set.
    #[serde(default)]
    pub week_type: WeekType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ClassSession {
    pub fn new(
        day: DayOfWeek,
        subject: impl Into<String>,
        group: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: new_entity_id(),
            day,
            subject: subject.into(),
            group: group.into(),
            room: None,
            start_time,
            end_time,
            alternating: false,
            week_type: WeekType::default(),
            note: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn start_minutes(&self) -> u32 {
        minutes_since_midnight(self.start_time)
    }

    pub fn end_minutes(&self) -> u32 {
        minutes_since_midnight(self.end_time)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_minutes().saturating_sub(self.start_minutes())
    }

    /// Ends strictly after it starts.
    pub fn has_valid_times(&self) -> bool {
        self.end_minutes() > self.start_minutes()
    }

    /// Whether the session runs during the given ISO week number.
    pub fn occurs_in_week(&self, iso_week: u32) -> bool {
        !self.alternating || WeekType::for_iso_week(iso_week) == self.week_type
    }
}

impl Identified for ClassSession {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: DayOfWeek,
    #[serde(default)]
    pub classes: Vec<ClassSession>,
}

impl DaySchedule {
    pub fn new(day: DayOfWeek) -> Self {
        Self {
            day,
            classes: Vec::new(),
        }
    }

    pub fn sort_by_time(&mut self) {
        self.classes.sort_by_key(ClassSession::start_minutes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPlacement {
    Replaced,
    Appended,
    NewDay,
}

/// The weekly timetable: at most one `DaySchedule` per day in normal use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: Vec<DaySchedule>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_days(days: Vec<DaySchedule>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }

    pub fn into_days(self) -> Vec<DaySchedule> {
        self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, day: DayOfWeek) -> Option<&DaySchedule> {
        self.days.iter().find(|entry| entry.day == day)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &ClassSession> {
        self.days.iter().flat_map(|entry| entry.classes.iter())
    }

    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut ClassSession> {
        self.days.iter_mut().flat_map(|entry| entry.classes.iter_mut())
    }

    pub fn session_count(&self) -> usize {
        self.days.iter().map(|entry| entry.classes.len()).sum()
    }

    pub fn find_session(&self, id: &str) -> Option<&ClassSession> {
        self.sessions().find(|session| session.id == id)
    }

    /// Merge a session into the first entry of the day it names: replace by
    /// id, append, or start a new day. Copies held by any other entry (another
    /// day, or a second entry for the same day) are dropped; those entries
    /// stay, even when emptied.
    pub fn upsert_session(&mut self, session: ClassSession) -> SessionPlacement {
        let target = self.days.iter().position(|entry| entry.day == session.day);
        for (idx, entry) in self.days.iter_mut().enumerate() {
            if Some(idx) != target {
                remove_by_id(&mut entry.classes, &session.id);
            }
        }

        match target {
            Some(idx) => {
                if upsert_by_id(&mut self.days[idx].classes, session) {
                    SessionPlacement::Replaced
                } else {
                    SessionPlacement::Appended
                }
            }
            None => {
                self.days.push(DaySchedule {
                    day: session.day,
                    classes: vec![session],
                });
                SessionPlacement::NewDay
            }
        }
    }

    /// Remove a session from whichever day holds it. Day entries are kept.
    pub fn remove_session(&mut self, id: &str) -> bool {
        let mut removed = false;
        for entry in &mut self.days {
            removed |= remove_by_id(&mut entry.classes, id);
        }
        removed
    }
}

impl From<Vec<DaySchedule>> for WeeklySchedule {
    fn from(days: Vec<DaySchedule>) -> Self {
        Self::from_days(days)
    }
}
