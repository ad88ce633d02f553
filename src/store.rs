//! # Record Store
//!
//! Flat-file persistence for the habit log, the recipe vault and the workout
//! log. Every table is a CSV file with a header row inside the data
//! directory. Tables are small, so every write rewrites or appends to the
//! whole file; there is no locking and a single writer is assumed.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::audit::{parse_day, AuditEntry, AUDIT_COLUMNS};
use crate::recipe::Recipe;
use crate::workout::WorkoutRecord;

pub const AUDIT_FILE: &str = "daily_audit.csv";
pub const RECIPE_FILE: &str = "recipes.csv";
pub const WORKOUT_FILE: &str = "workouts.csv";

/// Handle on the data directory holding the CSV tables
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create data directory {}", data_dir.display())
        })?;
        info!("Record store opened at: {}", data_dir.display());
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn table_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Load the habit log
    ///
    /// A missing file yields an empty log. When the file lacks some columns,
    /// they are filled with defaults and the file is rewritten straight away.
    /// Columns the log does not know about are carried through untouched.
    pub fn load_audit_log(&self) -> Result<Vec<AuditEntry>> {
        let path = self.table_path(AUDIT_FILE);
        if !path.is_file() {
            debug!("No audit file at {}, starting empty", path.display());
            return Ok(Vec::new());
        }

        let mut table = RawTable::read(&path)?;
        let added = table.add_missing_columns(&AUDIT_COLUMNS);
        if !added.is_empty() {
            warn!(
                "Audit file {} was missing columns {:?}, rewriting with defaults",
                path.display(),
                added
            );
            table.write(&path)?;
        }

        let entries = table.deserialize_rows::<AuditEntry>(&path)?;
        info!("Loaded {} audit entries", entries.len());
        Ok(entries)
    }

    /// Save a day's entry, replacing any existing row for the same date
    ///
    /// Extra columns in the file are kept; the new row leaves them empty.
    pub fn save_audit_entry(&self, entry: &AuditEntry) -> Result<()> {
        let path = self.table_path(AUDIT_FILE);
        let mut table = if path.is_file() {
            RawTable::read(&path)?
        } else {
            RawTable::default()
        };
        table.add_missing_columns(&AUDIT_COLUMNS);

        let date_index = table.column_index("Date");
        let before = table.rows.len();
        table.rows.retain(|row| {
            date_index
                .and_then(|index| row.get(index))
                .and_then(parse_day)
                != Some(entry.date)
        });
        if table.rows.len() != before {
            info!("Overwriting audit entry for {}", entry.date);
        }

        let row: StringRecord = table
            .headers
            .iter()
            .map(|column| entry.column_value(column).unwrap_or_default())
            .collect();
        table.rows.push(row);

        table.write(&path)?;
        info!("Audit entry saved for {}", entry.date);
        Ok(())
    }

    /// Load every recipe in the vault
    pub fn load_recipes(&self) -> Result<Vec<Recipe>> {
        let path = self.table_path(RECIPE_FILE);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let recipes: Vec<Recipe> = read_table(&path)?;
        info!("Loaded {} recipes", recipes.len());
        Ok(recipes)
    }

    /// Append a recipe to the vault
    pub fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        append_row(&self.table_path(RECIPE_FILE), recipe)?;
        info!("Recipe '{}' saved", recipe.name);
        Ok(())
    }

    /// Load the workout log
    pub fn load_workouts(&self) -> Result<Vec<WorkoutRecord>> {
        let path = self.table_path(WORKOUT_FILE);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        read_table(&path)
    }

    /// Append a workout to the log
    pub fn save_workout(&self, workout: &WorkoutRecord) -> Result<()> {
        append_row(&self.table_path(WORKOUT_FILE), workout)?;
        info!("Workout '{}' saved", workout.exercise);
        Ok(())
    }
}

/// A CSV file held as plain text cells, so columns unknown to the record
/// types survive a rewrite
#[derive(Debug, Default)]
struct RawTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl RawTable {
    fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .clone();

        let mut rows = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.with_context(|| {
                format!("Failed to read row {} of {}", index + 1, path.display())
            })?;
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == column)
    }

    /// Append every column of `required` the table lacks, filling existing rows
    /// with the column's default. Returns the columns added.
    fn add_missing_columns<'a>(&mut self, required: &[&'a str]) -> Vec<&'a str> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|column| self.column_index(column).is_none())
            .collect();

        for column in &missing {
            self.headers.push_field(column);
            let default = default_cell(column);
            for row in &mut self.rows {
                row.push_field(default);
            }
        }
        missing
    }

    fn deserialize_rows<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                row.deserialize(Some(&self.headers)).with_context(|| {
                    format!("Failed to parse row {} of {}", index + 1, path.display())
                })
            })
            .collect()
    }

    /// Rewrite the whole file; the header is written even without rows
    fn write(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for record in std::iter::once(&self.headers).chain(&self.rows) {
            writer
                .write_record(record)
                .with_context(|| format!("Failed to write row to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }
}

/// Value for a column added to an existing file: 0 for hours and walks, False for flags
fn default_cell(column: &str) -> &'static str {
    if column.contains("Hours") || column.contains("Walks") {
        "0"
    } else {
        "False"
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        // Row numbers are 1-based and skip the header
        let row: T = row.with_context(|| {
            format!("Failed to parse row {} of {}", index + 1, path.display())
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn append_row<T: Serialize>(path: &Path, row: &T) -> Result<()> {
    let needs_header = !path.is_file() || fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for appending", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(row)
        .with_context(|| format!("Failed to append row to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}
