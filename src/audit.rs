//! # Daily Audit Model
//!
//! One row of the habit log: what was studied, trained and eaten on a given
//! calendar day. The date is the natural key of the log.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Column order of the daily audit file
pub const AUDIT_COLUMNS: [&str; 12] = [
    "Date",
    "CPA_Hours",
    "Tech_AI_Hours",
    "Gym",
    "Cardio",
    "Dog_Walks",
    "Dog_Grooming",
    "Diet_Adherence",
    "Supp_Omega3",
    "Supp_Magnesium",
    "Supp_VitD",
    "Supp_Creatine",
];

/// Anything that belongs to exactly one calendar day
pub trait DatedRecord {
    fn date(&self) -> NaiveDate;
}

/// A day's habit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "Date", deserialize_with = "deserialize_day")]
    pub date: NaiveDate,
    #[serde(rename = "CPA_Hours", default, deserialize_with = "deserialize_number")]
    pub cpa_hours: f64,
    #[serde(rename = "Tech_AI_Hours", default, deserialize_with = "deserialize_number")]
    pub tech_ai_hours: f64,
    #[serde(rename = "Gym", default, deserialize_with = "deserialize_flag")]
    pub gym: bool,
    #[serde(rename = "Cardio", default, deserialize_with = "deserialize_flag")]
    pub cardio: bool,
    #[serde(rename = "Dog_Walks", default, deserialize_with = "deserialize_count")]
    pub dog_walks: u32,
    #[serde(rename = "Dog_Grooming", default, deserialize_with = "deserialize_flag")]
    pub dog_grooming: bool,
    #[serde(rename = "Diet_Adherence", default, deserialize_with = "deserialize_flag")]
    pub diet_adherence: bool,
    #[serde(rename = "Supp_Omega3", default, deserialize_with = "deserialize_flag")]
    pub supp_omega3: bool,
    #[serde(rename = "Supp_Magnesium", default, deserialize_with = "deserialize_flag")]
    pub supp_magnesium: bool,
    #[serde(rename = "Supp_VitD", default, deserialize_with = "deserialize_flag")]
    pub supp_vitd: bool,
    #[serde(rename = "Supp_Creatine", default, deserialize_with = "deserialize_flag")]
    pub supp_creatine: bool,
}

impl AuditEntry {
    /// An entry for `date` with nothing done yet
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            cpa_hours: 0.0,
            tech_ai_hours: 0.0,
            gym: false,
            cardio: false,
            dog_walks: 0,
            dog_grooming: false,
            diet_adherence: false,
            supp_omega3: false,
            supp_magnesium: false,
            supp_vitd: false,
            supp_creatine: false,
        }
    }

    /// Set a field by its column name from a textual value
    ///
    /// Used by the command line to build an entry from `key=value` pairs.
    pub fn set_field(&mut self, column: &str, value: &str) -> Result<(), String> {
        let flag = || parse_flag(value).ok_or_else(|| format!("'{value}' is not a yes/no value"));
        match column {
            "CPA_Hours" => self.cpa_hours = parse_hours(value)?,
            "Tech_AI_Hours" => self.tech_ai_hours = parse_hours(value)?,
            "Dog_Walks" => {
                self.dog_walks = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("'{value}' is not a walk count"))?
            }
            "Gym" => self.gym = flag()?,
            "Cardio" => self.cardio = flag()?,
            "Dog_Grooming" => self.dog_grooming = flag()?,
            "Diet_Adherence" => self.diet_adherence = flag()?,
            "Supp_Omega3" => self.supp_omega3 = flag()?,
            "Supp_Magnesium" => self.supp_magnesium = flag()?,
            "Supp_VitD" => self.supp_vitd = flag()?,
            "Supp_Creatine" => self.supp_creatine = flag()?,
            other => return Err(format!("Unknown audit column: {other}")),
        }
        Ok(())
    }

    /// Text written to the file for a column, `None` for columns not in the log
    pub fn column_value(&self, column: &str) -> Option<String> {
        let flag = |value: bool| if value { "True" } else { "False" }.to_string();
        let value = match column {
            "Date" => self.date.to_string(),
            "CPA_Hours" => self.cpa_hours.to_string(),
            "Tech_AI_Hours" => self.tech_ai_hours.to_string(),
            "Dog_Walks" => self.dog_walks.to_string(),
            "Gym" => flag(self.gym),
            "Cardio" => flag(self.cardio),
            "Dog_Grooming" => flag(self.dog_grooming),
            "Diet_Adherence" => flag(self.diet_adherence),
            "Supp_Omega3" => flag(self.supp_omega3),
            "Supp_Magnesium" => flag(self.supp_magnesium),
            "Supp_VitD" => flag(self.supp_vitd),
            "Supp_Creatine" => flag(self.supp_creatine),
            _ => return None,
        };
        Some(value)
    }
}

impl DatedRecord for AuditEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Study hours are entered in half-hour steps between 0 and 24
fn parse_hours(value: &str) -> Result<f64, String> {
    let hours: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number of hours"))?;
    if !(0.0..=24.0).contains(&hours) {
        return Err(format!("{hours} hours is outside 0-24"));
    }
    Ok(hours)
}

/// Normalize a stored date to day granularity
///
/// Accepts `2024-03-01`, `2024-03-01 18:30:00`, `2024-03-01T18:30:00` and
/// RFC 3339 timestamps; the time of day is discarded.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Read a boolean cell the way spreadsheet exports write them
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" | "y" => Some(true),
        "false" | "0" | "0.0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid flag '{raw}'")))
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid number '{raw}'")))
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    // Counts may have been written as floats ("2.0") by earlier exports
    let value = deserialize_number(deserializer)?;
    if value < 0.0 {
        return Err(serde::de::Error::custom(format!("negative count {value}")));
    }
    Ok(value.round() as u32)
}
