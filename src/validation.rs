//! Form validation for the three editors.
//!
//! Every check runs on every call so the caller can show all messages at
//! once; an empty [`FieldErrors`] means the draft is valid.

use crate::calendar::{DayOfWeek, WeekType, parse_date, time_to_minutes};
use crate::editor::{ClassDraft, ClassField, HolidayDraft, HolidayField, VacationDraft, VacationField};
use crate::holiday::{HolidayType, VacationType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A named input of an editor form.
pub trait FormField: Copy {
    fn as_str(&self) -> &'static str;
}

/// Field name to message. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert<F: FormField>(&mut self, field: F, message: impl Into<String>) {
        self.0.insert(field.as_str(), message.into());
    }

    pub fn clear_field<F: FormField>(&mut self, field: F) -> Option<String> {
        self.0.remove(field.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require<F: FormField>(errors: &mut FieldErrors, field: F, value: &str, message: &str) -> bool {
    if is_blank(value) {
        errors.insert(field, message);
        false
    } else {
        true
    }
}

fn required_minutes<F: FormField>(
    errors: &mut FieldErrors,
    field: F,
    value: &str,
    missing: &str,
) -> Option<u32> {
    if !require(errors, field, value, missing) {
        return None;
    }
    let minutes = time_to_minutes(value);
    if minutes.is_none() {
        errors.insert(field, "Use the HH:MM format");
    }
    minutes
}

fn required_date<F: FormField>(
    errors: &mut FieldErrors,
    field: F,
    value: &str,
    missing: &str,
) -> Option<chrono::NaiveDate> {
    if !require(errors, field, value, missing) {
        return None;
    }
    let date = parse_date(value);
    if date.is_none() {
        errors.insert(field, "Use the YYYY-MM-DD format");
    }
    date
}

pub fn validate_class(draft: &ClassDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.day.parse::<DayOfWeek>().is_err() {
        errors.insert(ClassField::Day, "Choose a day of the week");
    }
    require(&mut errors, ClassField::Subject, &draft.subject, "Subject is required");
    require(&mut errors, ClassField::Group, &draft.group, "Group is required");

    let start = required_minutes(
        &mut errors,
        ClassField::StartTime,
        &draft.start_time,
        "Start time is required",
    );
    let end = required_minutes(
        &mut errors,
        ClassField::EndTime,
        &draft.end_time,
        "End time is required",
    );
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.insert(ClassField::EndTime, "End time must be after start time");
        }
    }

    if draft.alternating && draft.week_type.parse::<WeekType>().is_err() {
        errors.insert(ClassField::WeekType, "Choose odd or even weeks");
    }

    errors
}

pub fn validate_holiday(draft: &HolidayDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, HolidayField::Name, &draft.name, "Name is required");
    required_date(&mut errors, HolidayField::Date, &draft.date, "Date is required");
    if draft.holiday_type.parse::<HolidayType>().is_err() {
        errors.insert(HolidayField::Type, "Choose a holiday type");
    }
    errors
}

pub fn validate_vacation(draft: &VacationDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    require(&mut errors, VacationField::Name, &draft.name, "Name is required");

    let start = required_date(
        &mut errors,
        VacationField::StartDate,
        &draft.start_date,
        "Start date is required",
    );
    let end = required_date(
        &mut errors,
        VacationField::EndDate,
        &draft.end_date,
        "End date is required",
    );
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            errors.insert(VacationField::EndDate, "End date must not be before start date");
        }
    }

    if draft.vacation_type.parse::<VacationType>().is_err() {
        errors.insert(VacationField::Type, "Choose a vacation type");
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_draft() -> ClassDraft {
        ClassDraft {
            subject: "Maths".into(),
            group: "6A".into(),
            ..ClassDraft::default()
        }
    }

    #[test]
    fn complete_class_draft_is_valid() {
        assert!(validate_class(&class_draft()).is_empty());
    }

    #[test]
    fn blank_required_class_fields_are_reported_together() {
        let draft = ClassDraft {
            subject: "   ".into(),
            group: String::new(),
            start_time: String::new(),
            ..ClassDraft::default()
        };
        let errors = validate_class(&draft);
        assert_eq!(errors.get("subject"), Some("Subject is required"));
        assert_eq!(errors.get("group"), Some("Group is required"));
        assert_eq!(errors.get("startTime"), Some("Start time is required"));
        assert!(!errors.contains("endTime"));
    }

    #[test]
    fn end_time_must_follow_start_time() {
        let equal = ClassDraft {
            start_time: "10:00".into(),
            end_time: "10:00".into(),
            ..class_draft()
        };
        assert_eq!(
            validate_class(&equal).get("endTime"),
            Some("End time must be after start time")
        );

        let earlier = ClassDraft {
            start_time: "10:00".into(),
            end_time: "09:30".into(),
            ..class_draft()
        };
        assert_eq!(validate_class(&earlier).len(), 1);
    }

    #[test]
    fn malformed_time_is_a_format_error() {
        let draft = ClassDraft {
            start_time: "8h".into(),
            ..class_draft()
        };
        assert_eq!(validate_class(&draft).get("startTime"), Some("Use the HH:MM format"));
    }

    #[test]
    fn week_type_only_checked_for_alternating_classes() {
        let draft = ClassDraft {
            week_type: "weekly".into(),
            ..class_draft()
        };
        assert!(validate_class(&draft).is_empty());

        let alternating = ClassDraft {
            alternating: true,
            ..draft
        };
        assert!(validate_class(&alternating).contains("weekType"));
    }

    #[test]
    fn holiday_needs_name_and_date() {
        let errors = validate_holiday(&HolidayDraft::default());
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("date"), Some("Date is required"));
        assert!(!errors.contains("type"));

        let draft = HolidayDraft {
            name: "Armistice".into(),
            date: "2024-11-11".into(),
            ..HolidayDraft::default()
        };
        assert!(validate_holiday(&draft).is_empty());
    }

    #[test]
    fn vacation_may_be_a_single_day() {
        let draft = VacationDraft {
            name: "Bridge day".into(),
            start_date: "2024-05-10".into(),
            end_date: "2024-05-10".into(),
            ..VacationDraft::default()
        };
        assert!(validate_vacation(&draft).is_empty());
    }

    #[test]
    fn empty_vacation_reports_every_required_field() {
        let errors = validate_vacation(&VacationDraft::default());
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("startDate"), Some("Start date is required"));
        assert_eq!(errors.get("endDate"), Some("End date is required"));
        assert!(!errors.contains("type"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn unparseable_vacation_dates_are_format_errors() {
        let draft = VacationDraft {
            name: "Hiver".into(),
            start_date: "15/02/2025".into(),
            end_date: "2025-02-30".into(),
            ..VacationDraft::default()
        };
        let errors = validate_vacation(&draft);
        assert_eq!(errors.get("startDate"), Some("Use the YYYY-MM-DD format"));
        assert_eq!(errors.get("endDate"), Some("Use the YYYY-MM-DD format"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn vacation_end_before_start_is_rejected() {
        let draft = VacationDraft {
            name: "Spring".into(),
            start_date: "2024-04-20".into(),
            end_date: "2024-04-19".into(),
            ..VacationDraft::default()
        };
        let errors = validate_vacation(&draft);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("endDate"));
    }

    #[test]
    fn display_joins_messages_in_field_order() {
        let errors = validate_holiday(&HolidayDraft::default());
        assert_eq!(
            errors.to_string(),
            "date: Date is required; name: Name is required"
        );
    }
}
