//! Form state for adding and editing calendar entities.
//!
//! An [`Editor`] owns one draft at a time. The same editor is reused for every
//! add/edit action, so [`Editor::open`] rebuilds the draft from scratch on each
//! call. Editors never persist anything: a successful [`Editor::submit`] hands
//! the finished entity back and the caller decides what to do with it.

use crate::calendar::{DayOfWeek, WeekType, format_date, format_time, parse_date, parse_time};
use crate::class_session::ClassSession;
use crate::entity::{EntityKind, Identified, new_entity_id};
use crate::holiday::{Holiday, HolidayType, VacationPeriod, VacationType};
use crate::validation::{self, FieldErrors, FormField};
use serde::{Deserialize, Serialize};

/// Raw value typed into a form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Flag(flag) => flag.to_string(),
        }
    }

    pub fn into_flag(self) -> bool {
        match self {
            FieldValue::Flag(flag) => flag,
            FieldValue::Text(text) => matches!(
                text.trim().to_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// The in-progress copy of an entity that an editor works on.
pub trait Draft: Clone + Default {
    type Entity: Identified + Clone;
    type Field: FormField;

    fn from_entity(entity: &Self::Entity) -> Self;
    fn set(&mut self, field: Self::Field, value: FieldValue);
    fn validate(&self) -> FieldErrors;
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);
    /// Build the entity from a draft that passed validation.
    fn build(&self) -> Result<Self::Entity, FieldErrors>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("editor is not open")]
    Closed,
    #[error("invalid fields: {0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
struct OpenState<D> {
    draft: D,
    errors: FieldErrors,
    mode: EditorMode,
}

#[derive(Debug, Clone)]
pub struct Editor<D: Draft> {
    state: Option<OpenState<D>>,
}

pub type ClassEditor = Editor<ClassDraft>;
pub type HolidayEditor = Editor<HolidayDraft>;
pub type VacationEditor = Editor<VacationDraft>;

impl<D: Draft> Default for Editor<D> {
    fn default() -> Self {
        Self { state: None }
    }
}

impl<D: Draft> Editor<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `existing`, or a fresh draft with defaults when `None`.
    pub fn open(&mut self, existing: Option<&D::Entity>) {
        let (draft, mode) = match existing {
            Some(entity) => (D::from_entity(entity), EditorMode::Edit(entity.id().to_string())),
            None => (D::default(), EditorMode::Create),
        };
        self.state = Some(OpenState {
            draft,
            errors: FieldErrors::new(),
            mode,
        });
    }

    /// Start on a draft built elsewhere. A draft carrying an id edits that entity.
    pub fn open_with_draft(&mut self, draft: D) {
        let mode = match draft.id() {
            Some(id) => EditorMode::Edit(id.to_string()),
            None => EditorMode::Create,
        };
        self.state = Some(OpenState {
            draft,
            errors: FieldErrors::new(),
            mode,
        });
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn mode(&self) -> Option<&EditorMode> {
        self.state.as_ref().map(|state| &state.mode)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode(), Some(EditorMode::Edit(_)))
    }

    pub fn draft(&self) -> Option<&D> {
        self.state.as_ref().map(|state| &state.draft)
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.state.as_ref().map(|state| &state.errors)
    }

    /// Update one input. Its previous error is dropped until the next submit.
    pub fn set_field(
        &mut self,
        field: D::Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), EditorError> {
        let state = self.state.as_mut().ok_or(EditorError::Closed)?;
        state.draft.set(field, value.into());
        state.errors.clear_field(field);
        Ok(())
    }

    /// Validate and return the finished entity. The editor stays open either
    /// way; on failure the errors are kept for display.
    pub fn submit(&mut self) -> Result<D::Entity, EditorError> {
        let state = self.state.as_mut().ok_or(EditorError::Closed)?;
        let errors = state.draft.validate();
        if !errors.is_empty() {
            state.errors = errors.clone();
            return Err(EditorError::Invalid(errors));
        }
        if state.draft.id().is_none() {
            state.draft.set_id(new_entity_id());
        }
        state.errors = FieldErrors::new();
        state.draft.build().map_err(EditorError::Invalid)
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    pub fn close(&mut self) {
        self.state = None;
    }
}

/// A draft of any of the three entity kinds, as received from a host.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDraft {
    Class(ClassDraft),
    Holiday(HolidayDraft),
    Vacation(VacationDraft),
}

impl EntityDraft {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDraft::Class(_) => EntityKind::Class,
            EntityDraft::Holiday(_) => EntityKind::Holiday,
            EntityDraft::Vacation(_) => EntityKind::Vacation,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            EntityDraft::Class(draft) => draft.id(),
            EntityDraft::Holiday(draft) => draft.id(),
            EntityDraft::Vacation(draft) => draft.id(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassField {
    Day,
    Subject,
    Group,
    Room,
    StartTime,
    EndTime,
    Alternating,
    WeekType,
    Note,
}

impl FormField for ClassField {
    fn as_str(&self) -> &'static str {
        match self {
            ClassField::Day => "day",
            ClassField::Subject => "subject",
            ClassField::Group => "group",
            ClassField::Room => "room",
            ClassField::StartTime => "startTime",
            ClassField::EndTime => "endTime",
            ClassField::Alternating => "alternating",
            ClassField::WeekType => "weekType",
            ClassField::Note => "note",
        }
    }
}

impl std::str::FromStr for ClassField {
    type Err = crate::calendar::UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "day" => ClassField::Day,
            "subject" => ClassField::Subject,
            "group" => ClassField::Group,
            "room" => ClassField::Room,
            "startTime" | "start" => ClassField::StartTime,
            "endTime" | "end" => ClassField::EndTime,
            "alternating" => ClassField::Alternating,
            "weekType" => ClassField::WeekType,
            "note" => ClassField::Note,
            other => {
                return Err(crate::calendar::UnknownValue {
                    kind: "class field",
                    value: other.to_string(),
                });
            }
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassDraft {
    pub id: Option<String>,
    pub day: String,
    pub subject: String,
    pub group: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub alternating: bool,
    pub week_type: String,
    pub note: String,
}

impl Default for ClassDraft {
    fn default() -> Self {
        Self {
            id: None,
            day: DayOfWeek::Monday.as_str().to_string(),
            subject: String::new(),
            group: String::new(),
            room: String::new(),
            start_time: "08:00".to_string(),
            end_time: "09:00".to_string(),
            alternating: false,
            week_type: WeekType::Odd.as_str().to_string(),
            note: String::new(),
        }
    }
}

impl Draft for ClassDraft {
    type Entity = ClassSession;
    type Field = ClassField;

    fn from_entity(session: &ClassSession) -> Self {
        Self {
            id: Some(session.id.clone()),
            day: session.day.as_str().to_string(),
            subject: session.subject.clone(),
            group: session.group.clone(),
            room: session.room.clone().unwrap_or_default(),
            start_time: format_time(session.start_time),
            end_time: format_time(session.end_time),
            alternating: session.alternating,
            week_type: session.week_type.as_str().to_string(),
            note: session.note.clone().unwrap_or_default(),
        }
    }

    fn set(&mut self, field: ClassField, value: FieldValue) {
        match field {
            ClassField::Day => self.day = value.into_text(),
            ClassField::Subject => self.subject = value.into_text(),
            ClassField::Group => self.group = value.into_text(),
            ClassField::Room => self.room = value.into_text(),
            ClassField::StartTime => self.start_time = value.into_text(),
            ClassField::EndTime => self.end_time = value.into_text(),
            ClassField::Alternating => self.alternating = value.into_flag(),
            ClassField::WeekType => self.week_type = value.into_text(),
            ClassField::Note => self.note = value.into_text(),
        }
    }

    fn validate(&self) -> FieldErrors {
        validation::validate_class(self)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn build(&self) -> Result<ClassSession, FieldErrors> {
        let errors = self.validate();
        let parsed = (
            self.day.parse::<DayOfWeek>().ok(),
            parse_time(&self.start_time),
            parse_time(&self.end_time),
        );
        let (Some(day), Some(start_time), Some(end_time)) = parsed else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ClassSession {
            id: self.id.clone().unwrap_or_else(new_entity_id),
            day,
            subject: self.subject.trim().to_string(),
            group: self.group.trim().to_string(),
            room: non_blank(&self.room),
            start_time,
            end_time,
            alternating: self.alternating,
            week_type: self.week_type.parse().unwrap_or_default(),
            note: non_blank(&self.note),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayField {
    Name,
    Date,
    Type,
    Description,
}

impl FormField for HolidayField {
    fn as_str(&self) -> &'static str {
        match self {
            HolidayField::Name => "name",
            HolidayField::Date => "date",
            HolidayField::Type => "type",
            HolidayField::Description => "description",
        }
    }
}

impl std::str::FromStr for HolidayField {
    type Err = crate::calendar::UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(HolidayField::Name),
            "date" => Ok(HolidayField::Date),
            "type" => Ok(HolidayField::Type),
            "description" => Ok(HolidayField::Description),
            other => Err(crate::calendar::UnknownValue {
                kind: "holiday field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HolidayDraft {
    pub id: Option<String>,
    pub name: String,
    pub date: String,
    #[serde(rename = "type")]
    pub holiday_type: String,
    pub description: String,
}

impl Default for HolidayDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            date: String::new(),
            holiday_type: HolidayType::BankHoliday.as_str().to_string(),
            description: String::new(),
        }
    }
}

impl Draft for HolidayDraft {
    type Entity = Holiday;
    type Field = HolidayField;

    fn from_entity(holiday: &Holiday) -> Self {
        Self {
            id: Some(holiday.id.clone()),
            name: holiday.name.clone(),
            date: format_date(holiday.date),
            holiday_type: holiday.holiday_type.as_str().to_string(),
            description: holiday.description.clone().unwrap_or_default(),
        }
    }

    fn set(&mut self, field: HolidayField, value: FieldValue) {
        let value = value.into_text();
        match field {
            HolidayField::Name => self.name = value,
            HolidayField::Date => self.date = value,
            HolidayField::Type => self.holiday_type = value,
            HolidayField::Description => self.description = value,
        }
    }

    fn validate(&self) -> FieldErrors {
        validation::validate_holiday(self)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn build(&self) -> Result<Holiday, FieldErrors> {
        let errors = self.validate();
        let parsed = (
            parse_date(&self.date),
            self.holiday_type.parse::<HolidayType>().ok(),
        );
        let (Some(date), Some(holiday_type)) = parsed else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Holiday {
            id: self.id.clone().unwrap_or_else(new_entity_id),
            name: self.name.trim().to_string(),
            date,
            holiday_type,
            description: non_blank(&self.description),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacationField {
    Name,
    StartDate,
    EndDate,
    Type,
    Description,
}

impl FormField for VacationField {
    fn as_str(&self) -> &'static str {
        match self {
            VacationField::Name => "name",
            VacationField::StartDate => "startDate",
            VacationField::EndDate => "endDate",
            VacationField::Type => "type",
            VacationField::Description => "description",
        }
    }
}

impl std::str::FromStr for VacationField {
    type Err = crate::calendar::UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(VacationField::Name),
            "startDate" | "start" => Ok(VacationField::StartDate),
            "endDate" | "end" => Ok(VacationField::EndDate),
            "type" => Ok(VacationField::Type),
            "description" => Ok(VacationField::Description),
            other => Err(crate::calendar::UnknownValue {
                kind: "vacation field",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VacationDraft {
    pub id: Option<String>,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "type")]
    pub vacation_type: String,
    pub description: String,
}

impl Default for VacationDraft {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            vacation_type: VacationType::Vacation.as_str().to_string(),
            description: String::new(),
        }
    }
}

impl Draft for VacationDraft {
    type Entity = VacationPeriod;
    type Field = VacationField;

    fn from_entity(period: &VacationPeriod) -> Self {
        Self {
            id: Some(period.id.clone()),
            name: period.name.clone(),
            start_date: format_date(period.start_date),
            end_date: format_date(period.end_date),
            vacation_type: period.vacation_type.as_str().to_string(),
            description: period.description.clone().unwrap_or_default(),
        }
    }

    fn set(&mut self, field: VacationField, value: FieldValue) {
        let value = value.into_text();
        match field {
            VacationField::Name => self.name = value,
            VacationField::StartDate => self.start_date = value,
            VacationField::EndDate => self.end_date = value,
            VacationField::Type => self.vacation_type = value,
            VacationField::Description => self.description = value,
        }
    }

    fn validate(&self) -> FieldErrors {
        validation::validate_vacation(self)
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn build(&self) -> Result<VacationPeriod, FieldErrors> {
        let errors = self.validate();
        let parsed = (
            parse_date(&self.start_date),
            parse_date(&self.end_date),
            self.vacation_type.parse::<VacationType>().ok(),
        );
        let (Some(start_date), Some(end_date), Some(vacation_type)) = parsed else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(VacationPeriod {
            id: self.id.clone().unwrap_or_else(new_entity_id),
            name: self.name.trim().to_string(),
            start_date,
            end_date,
            vacation_type,
            description: non_blank(&self.description),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn open_without_entity_uses_defaults() {
        let mut editor = ClassEditor::new();
        editor.open(None);
        let draft = editor.draft().expect("open");
        assert_eq!(draft.day, "lundi");
        assert_eq!(draft.start_time, "08:00");
        assert_eq!(draft.end_time, "09:00");
        assert_eq!(draft.week_type, "odd");
        assert_eq!(editor.mode(), Some(&EditorMode::Create));
    }

    #[test]
    fn reopening_discards_previous_draft() {
        let mut editor = HolidayEditor::new();
        editor.open(None);
        editor.set_field(HolidayField::Name, "Leftover").unwrap();
        editor.open(None);
        assert_eq!(editor.draft().unwrap().name, "");
    }

    #[test]
    fn failed_submit_keeps_errors_until_field_changes() {
        let mut editor = ClassEditor::new();
        editor.open(None);
        let err = editor.submit().unwrap_err();
        assert!(matches!(err, EditorError::Invalid(ref errors) if errors.contains("subject")));
        assert!(editor.is_open());
        assert!(editor.errors().unwrap().contains("group"));

        editor.set_field(ClassField::Subject, "History").unwrap();
        let errors = editor.errors().unwrap();
        assert!(!errors.contains("subject"));
        assert!(errors.contains("group"));
    }

    #[test]
    fn submit_assigns_id_once() {
        let mut editor = VacationEditor::new();
        editor.open(None);
        editor.set_field(VacationField::Name, "Winter").unwrap();
        editor.set_field(VacationField::StartDate, "2025-02-15").unwrap();
        editor.set_field(VacationField::EndDate, "2025-03-02").unwrap();

        let first = editor.submit().unwrap();
        let second = editor.submit().unwrap();
        assert!(!first.id.is_empty());
        assert_eq!(first.id, second.id);
        assert_eq!(first.duration_days(), 16);
    }

    #[test]
    fn editing_keeps_the_entity_id() {
        let holiday = Holiday::new("Labour Day", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .with_id("h-1");
        let mut editor = HolidayEditor::new();
        editor.open(Some(&holiday));
        assert!(editor.is_editing());
        editor.set_field(HolidayField::Description, "  ").unwrap();
        let saved = editor.submit().unwrap();
        assert_eq!(saved.id, "h-1");
        assert_eq!(saved.description, None);
    }

    #[test]
    fn class_draft_trims_and_drops_blank_optionals() {
        let mut editor = ClassEditor::new();
        editor.open(None);
        editor.set_field(ClassField::Subject, "  Physics ").unwrap();
        editor.set_field(ClassField::Group, "5B").unwrap();
        editor.set_field(ClassField::Room, "").unwrap();
        editor.set_field(ClassField::Day, "wednesday").unwrap();
        editor.set_field(ClassField::Alternating, "yes").unwrap();
        editor.set_field(ClassField::WeekType, "even").unwrap();

        let session = editor.submit().unwrap();
        assert_eq!(session.subject, "Physics");
        assert_eq!(session.day, DayOfWeek::Wednesday);
        assert_eq!(session.room, None);
        assert!(session.alternating);
        assert_eq!(session.week_type, WeekType::Even);
    }

    #[test]
    fn closed_editor_rejects_input() {
        let mut editor = ClassEditor::new();
        assert!(matches!(
            editor.set_field(ClassField::Subject, "x"),
            Err(EditorError::Closed)
        ));
        assert!(matches!(editor.submit(), Err(EditorError::Closed)));
    }

    #[test]
    fn blank_draft_id_counts_as_new() {
        let draft = HolidayDraft {
            id: Some(String::new()),
            ..HolidayDraft::default()
        };
        assert_eq!(draft.id(), None);
    }
}
