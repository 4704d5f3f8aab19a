use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A school day. Serialized with the French lowercase names the school uses;
/// English names are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[serde(rename = "lundi", alias = "monday")]
    Monday,
    #[serde(rename = "mardi", alias = "tuesday")]
    Tuesday,
    #[serde(rename = "mercredi", alias = "wednesday")]
    Wednesday,
    #[serde(rename = "jeudi", alias = "thursday")]
    Thursday,
    #[serde(rename = "vendredi", alias = "friday")]
    Friday,
    #[serde(rename = "samedi", alias = "saturday")]
    Saturday,
    #[serde(rename = "dimanche", alias = "sunday")]
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "lundi",
            DayOfWeek::Tuesday => "mardi",
            DayOfWeek::Wednesday => "mercredi",
            DayOfWeek::Thursday => "jeudi",
            DayOfWeek::Friday => "vendredi",
            DayOfWeek::Saturday => "samedi",
            DayOfWeek::Sunday => "dimanche",
        }
    }

    /// Position in the canonical Monday..Sunday order.
    pub fn index(&self) -> usize {
        self.to_weekday().num_days_from_monday() as usize
    }

    pub fn to_weekday(&self) -> Weekday {
        match self {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(value: Weekday) -> Self {
        Self::ALL[value.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownValue {}

impl FromStr for DayOfWeek {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_lowercase().as_str() {
            "lundi" | "monday" => DayOfWeek::Monday,
            "mardi" | "tuesday" => DayOfWeek::Tuesday,
            "mercredi" | "wednesday" => DayOfWeek::Wednesday,
            "jeudi" | "thursday" => DayOfWeek::Thursday,
            "vendredi" | "friday" => DayOfWeek::Friday,
            "samedi" | "saturday" => DayOfWeek::Saturday,
            "dimanche" | "sunday" => DayOfWeek::Sunday,
            _ => {
                return Err(UnknownValue {
                    kind: "day",
                    value: s.to_string(),
                });
            }
        };
        Ok(day)
    }
}

/// Parity of the ISO week an alternating class runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekType {
    #[default]
    Odd,
    Even,
}

impl WeekType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekType::Odd => "odd",
            WeekType::Even => "even",
        }
    }

    pub fn for_iso_week(week: u32) -> Self {
        if week % 2 == 1 {
            WeekType::Odd
        } else {
            WeekType::Even
        }
    }
}

impl fmt::Display for WeekType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "odd" => Ok(WeekType::Odd),
            "even" => Ok(WeekType::Even),
            _ => Err(UnknownValue {
                kind: "week type",
                value: s.to_string(),
            }),
        }
    }
}

/// Parse an `HH:MM` clock time.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT).ok()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Minutes since midnight of an `HH:MM` string.
pub fn time_to_minutes(input: &str) -> Option<u32> {
    parse_time(input).map(minutes_since_midnight)
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Signed number of days from `start` to `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Serde adapter storing a `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }
}
