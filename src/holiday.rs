use crate::calendar::{UnknownValue, days_between};
use crate::entity::{Identified, new_entity_id};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HolidayType {
    #[default]
    BankHoliday,
    LocalHoliday,
    SchoolHoliday,
    Other,
}

impl HolidayType {
    pub const ALL: [HolidayType; 4] = [
        HolidayType::BankHoliday,
        HolidayType::LocalHoliday,
        HolidayType::SchoolHoliday,
        HolidayType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayType::BankHoliday => "bankHoliday",
            HolidayType::LocalHoliday => "localHoliday",
            HolidayType::SchoolHoliday => "schoolHoliday",
            HolidayType::Other => "other",
        }
    }
}

impl fmt::Display for HolidayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HolidayType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownValue {
                kind: "holiday type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationType {
    #[default]
    Vacation,
    Holiday,
    Closure,
    Other,
}

impl VacationType {
    pub const ALL: [VacationType; 4] = [
        VacationType::Vacation,
        VacationType::Holiday,
        VacationType::Closure,
        VacationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VacationType::Vacation => "vacation",
            VacationType::Holiday => "holiday",
            VacationType::Closure => "closure",
            VacationType::Other => "other",
        }
    }
}

impl fmt::Display for VacationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VacationType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownValue {
                kind: "vacation type",
                value: s.to_string(),
            })
    }
}

/// A single-day closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(rename = "type", default)]
    pub holiday_type: HolidayType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Holiday {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            date,
            holiday_type: HolidayType::default(),
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Identified for Holiday {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A multi-day closure, both endpoints inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationPeriod {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type", default)]
    pub vacation_type: VacationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VacationPeriod {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            start_date,
            end_date,
            vacation_type: VacationType::default(),
            description: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn has_valid_range(&self) -> bool {
        self.start_date <= self.end_date
    }

    /// Number of calendar days covered, counting both endpoints.
    pub fn duration_days(&self) -> i64 {
        days_between(self.start_date, self.end_date) + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl Identified for VacationPeriod {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One record of the combined holiday/vacation collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarEntry {
    Holiday(Holiday),
    Vacation(VacationPeriod),
}

impl CalendarEntry {
    pub fn name(&self) -> &str {
        match self {
            CalendarEntry::Holiday(holiday) => &holiday.name,
            CalendarEntry::Vacation(period) => &period.name,
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        match self {
            CalendarEntry::Holiday(holiday) => holiday.date,
            CalendarEntry::Vacation(period) => period.start_date,
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        match self {
            CalendarEntry::Holiday(holiday) => holiday.date,
            CalendarEntry::Vacation(period) => period.end_date,
        }
    }

    /// Decode one record, accepting the untagged shape older data used:
    /// `date` marks a holiday, `startDate` plus `endDate` a vacation period.
    pub fn from_value(index: usize, value: Value) -> Result<Self, EntryShapeError> {
        let malformed = |source: serde_json::Error| EntryShapeError::Malformed { index, source };
        let Some(object) = value.as_object() else {
            return Err(EntryShapeError::Unrecognized { index });
        };
        if object.contains_key("kind") {
            serde_json::from_value(value).map_err(malformed)
        } else if object.contains_key("date") {
            serde_json::from_value(value)
                .map(CalendarEntry::Holiday)
                .map_err(malformed)
        } else if object.contains_key("startDate") && object.contains_key("endDate") {
            serde_json::from_value(value)
                .map(CalendarEntry::Vacation)
                .map_err(malformed)
        } else {
            Err(EntryShapeError::Unrecognized { index })
        }
    }
}

impl Identified for CalendarEntry {
    fn id(&self) -> &str {
        match self {
            CalendarEntry::Holiday(holiday) => &holiday.id,
            CalendarEntry::Vacation(period) => &period.id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EntryShapeError {
    #[error("calendar entry #{index} is neither a holiday nor a vacation period")]
    Unrecognized { index: usize },
    #[error("calendar entry #{index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a combined collection, tagged or legacy.
pub fn entries_from_values(values: Vec<Value>) -> Result<Vec<CalendarEntry>, EntryShapeError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| CalendarEntry::from_value(index, value))
        .collect()
}

/// Split the combined collection into its two halves, keeping order.
pub fn partition_entries(entries: Vec<CalendarEntry>) -> (Vec<Holiday>, Vec<VacationPeriod>) {
    let mut holidays = Vec::new();
    let mut vacations = Vec::new();
    for entry in entries {
        match entry {
            CalendarEntry::Holiday(holiday) => holidays.push(holiday),
            CalendarEntry::Vacation(period) => vacations.push(period),
        }
    }
    (holidays, vacations)
}

/// Rebuild the combined collection: holidays first, then vacation periods.
pub fn combine_entries(holidays: &[Holiday], vacations: &[VacationPeriod]) -> Vec<CalendarEntry> {
    holidays
        .iter()
        .cloned()
        .map(CalendarEntry::Holiday)
        .chain(vacations.iter().cloned().map(CalendarEntry::Vacation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn duration_counts_both_endpoints() {
        let same_day = VacationPeriod::new("Pont", d(2024, 5, 10), d(2024, 5, 10));
        assert_eq!(same_day.duration_days(), 1);
        let summer = VacationPeriod::new("Été", d(2024, 7, 1), d(2024, 7, 10));
        assert_eq!(summer.duration_days(), 10);
        assert!(summer.contains(d(2024, 7, 10)));
        assert!(!summer.contains(d(2024, 7, 11)));
    }

    #[test]
    fn reversed_range_is_reported() {
        let reversed = VacationPeriod::new("Oops", d(2024, 7, 10), d(2024, 7, 1));
        assert!(!reversed.has_valid_range());
        assert!(VacationPeriod::new("Ok", d(2024, 7, 1), d(2024, 7, 1)).has_valid_range());
    }

    #[test]
    fn tagged_entries_serialize_with_kind() {
        let entry = CalendarEntry::Holiday(Holiday::new("Pâques", d(2024, 4, 1)).with_id("h1"));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["kind"], "holiday");
        assert_eq!(value["type"], "bankHoliday");
        assert_eq!(value["date"], "2024-04-01");
    }

    #[test]
    fn legacy_records_partition_by_shape() {
        let values = vec![
            json!({"id": "h1", "name": "Pâques", "date": "2024-04-01", "type": "bankHoliday"}),
            json!({"id": "v1", "name": "Été", "startDate": "2024-07-01", "endDate": "2024-08-31"}),
            json!({"kind": "holiday", "id": "h2", "name": "Noël", "date": "2024-12-25"}),
        ];
        let (holidays, vacations) = partition_entries(entries_from_values(values).unwrap());
        assert_eq!(holidays.len(), 2);
        assert_eq!(vacations.len(), 1);
        assert_eq!(vacations[0].vacation_type, VacationType::Vacation);
    }

    #[test]
    fn records_without_a_shape_are_rejected() {
        let values = vec![json!({"id": "x", "name": "??", "startDate": "2024-01-01"})];
        assert!(matches!(
            entries_from_values(values),
            Err(EntryShapeError::Unrecognized { index: 0 })
        ));
    }

    #[test]
    fn type_names_parse_case_insensitively() {
        assert_eq!(
            "schoolholiday".parse::<HolidayType>().unwrap(),
            HolidayType::SchoolHoliday
        );
        assert_eq!("Closure".parse::<VacationType>().unwrap(), VacationType::Closure);
        assert!("party".parse::<VacationType>().is_err());
    }
}
