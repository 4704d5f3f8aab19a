use super::{
    CalendarStore, GroupDirectory, PersistenceError, PersistenceResult, StudentGroup,
};
use crate::calendar::{format_date, parse_date};
use crate::class_session::DaySchedule;
use crate::holiday::{
    CalendarEntry, Holiday, HolidayType, VacationPeriod, VacationType, entries_from_values,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const SCHEDULE_FILE: &str = "schedule.json";
const HOLIDAYS_FILE: &str = "holidays.json";
const GROUPS_FILE: &str = "groups.json";

/// A directory of JSON documents, one per collection. Missing files read as
/// empty collections.
#[derive(Debug, Clone)]
pub struct JsonCalendarStore {
    root: PathBuf,
}

impl JsonCalendarStore {
    pub fn new<P: AsRef<Path>>(root: P) -> PersistenceResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn read_list<T: DeserializeOwned>(&self, name: &str) -> PersistenceResult<Vec<T>> {
        let path = self.path(name);
        if !path.exists() {
            debug!(path = %path.display(), "collection file missing, treating as empty");
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Replace a document by writing a sibling file and renaming it over.
    fn write_list<T: Serialize>(&self, name: &str, items: &[T]) -> PersistenceResult<()> {
        let path = self.path(name);
        let staging = path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&staging)?);
            serde_json::to_writer_pretty(&mut writer, items)?;
            writer.flush()?;
        }
        fs::rename(&staging, &path)?;
        debug!(path = %path.display(), count = items.len(), "collection written");
        Ok(())
    }

    pub fn save_student_groups(&self, groups: &[StudentGroup]) -> PersistenceResult<()> {
        self.write_list(GROUPS_FILE, groups)
    }
}

impl CalendarStore for JsonCalendarStore {
    fn get_regular_schedule(&self) -> PersistenceResult<Vec<DaySchedule>> {
        self.read_list(SCHEDULE_FILE)
    }

    fn save_regular_schedule(&self, schedule: &[DaySchedule]) -> PersistenceResult<()> {
        self.write_list(SCHEDULE_FILE, schedule)
    }

    fn get_holidays(&self) -> PersistenceResult<Vec<CalendarEntry>> {
        let values: Vec<Value> = self.read_list(HOLIDAYS_FILE)?;
        Ok(entries_from_values(values)?)
    }

    fn save_holidays(&self, entries: &[CalendarEntry]) -> PersistenceResult<()> {
        self.write_list(HOLIDAYS_FILE, entries)
    }
}

impl GroupDirectory for JsonCalendarStore {
    fn get_all_student_groups(&self) -> PersistenceResult<Vec<StudentGroup>> {
        self.read_list(GROUPS_FILE)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntryCsvRecord {
    kind: String,
    id: String,
    name: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
    #[serde(rename = "type", default)]
    entry_type: String,
    #[serde(default)]
    description: String,
}

impl From<&CalendarEntry> for EntryCsvRecord {
    fn from(entry: &CalendarEntry) -> Self {
        match entry {
            CalendarEntry::Holiday(holiday) => EntryCsvRecord {
                kind: "holiday".into(),
                id: holiday.id.clone(),
                name: holiday.name.clone(),
                date: format_date(holiday.date),
                entry_type: holiday.holiday_type.as_str().into(),
                description: holiday.description.clone().unwrap_or_default(),
                ..Default::default()
            },
            CalendarEntry::Vacation(period) => EntryCsvRecord {
                kind: "vacation".into(),
                id: period.id.clone(),
                name: period.name.clone(),
                start_date: format_date(period.start_date),
                end_date: format_date(period.end_date),
                entry_type: period.vacation_type.as_str().into(),
                description: period.description.clone().unwrap_or_default(),
                ..Default::default()
            },
        }
    }
}

impl EntryCsvRecord {
    fn into_entry(self, line: usize) -> PersistenceResult<CalendarEntry> {
        let description = parse_string_option(self.description);
        let id = if self.id.trim().is_empty() {
            crate::entity::new_entity_id()
        } else {
            self.id
        };
        match self.kind.trim() {
            "holiday" => Ok(CalendarEntry::Holiday(Holiday {
                id,
                name: self.name,
                date: required_date(&self.date, "date", line)?,
                holiday_type: parse_kind::<HolidayType>(&self.entry_type, line)?,
                description,
            })),
            "vacation" => {
                let start_date = required_date(&self.start_date, "start_date", line)?;
                let end_date = required_date(&self.end_date, "end_date", line)?;
                if start_date > end_date {
                    return Err(PersistenceError::InvalidData(format!(
                        "line {line}: vacation ends {end_date} before it starts {start_date}"
                    )));
                }
                Ok(CalendarEntry::Vacation(VacationPeriod {
                    id,
                    name: self.name,
                    start_date,
                    end_date,
                    vacation_type: parse_kind::<VacationType>(&self.entry_type, line)?,
                    description,
                }))
            }
            other => Err(PersistenceError::InvalidData(format!(
                "line {line}: unknown entry kind '{other}'"
            ))),
        }
    }
}

/// Write the combined holiday/vacation collection as CSV.
pub fn export_entries_to_csv<P: AsRef<Path>>(
    entries: &[CalendarEntry],
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in entries {
        writer.serialize(EntryCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a combined collection written by [`export_entries_to_csv`].
pub fn import_entries_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<CalendarEntry>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entries = Vec::new();
    for (idx, record) in reader.deserialize::<EntryCsvRecord>().enumerate() {
        // header is line 1
        entries.push(record?.into_entry(idx + 2)?);
    }
    Ok(entries)
}

fn required_date(input: &str, column: &str, line: usize) -> PersistenceResult<chrono::NaiveDate> {
    parse_date(input).ok_or_else(|| {
        PersistenceError::InvalidData(format!("line {line}: invalid {column} '{input}'"))
    })
}

fn parse_kind<T>(input: &str, line: usize) -> PersistenceResult<T>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    if input.trim().is_empty() {
        return Ok(T::default());
    }
    input
        .parse::<T>()
        .map_err(|err| PersistenceError::InvalidData(format!("line {line}: {err}")))
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
