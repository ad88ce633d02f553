//! Chart-ready series derived from the habit log.

use chrono::NaiveDate;
use serde::Serialize;

use crate::audit::AuditEntry;

/// Habits shown on the consistency heatmap, in display order
pub const HEATMAP_HABITS: [&str; 6] = [
    "Gym",
    "Cardio",
    "Diet_Adherence",
    "Dog_Walks",
    "Dog_Grooming",
    "Supp_Omega3",
];

/// One bar segment of the daily study chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyPoint {
    pub date: NaiveDate,
    /// `CPA_Hours` or `Tech_AI_Hours`
    pub kind: &'static str,
    pub hours: f64,
}

/// One cell of the habit heatmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitCell {
    pub date: NaiveDate,
    pub habit: &'static str,
    /// 1 when done that day, else 0
    pub done: u8,
}

fn chronological(log: &[AuditEntry]) -> Vec<&AuditEntry> {
    let mut entries: Vec<&AuditEntry> = log.iter().collect();
    entries.sort_by_key(|entry| entry.date);
    entries
}

/// Study hours per day and type, oldest day first
pub fn study_hours_series(log: &[AuditEntry]) -> Vec<StudyPoint> {
    chronological(log)
        .into_iter()
        .flat_map(|entry| {
            [
                StudyPoint {
                    date: entry.date,
                    kind: "CPA_Hours",
                    hours: entry.cpa_hours,
                },
                StudyPoint {
                    date: entry.date,
                    kind: "Tech_AI_Hours",
                    hours: entry.tech_ai_hours,
                },
            ]
        })
        .collect()
}

fn habit_done(entry: &AuditEntry, habit: &str) -> bool {
    match habit {
        "Gym" => entry.gym,
        "Cardio" => entry.cardio,
        "Diet_Adherence" => entry.diet_adherence,
        "Dog_Walks" => entry.dog_walks > 0,
        "Dog_Grooming" => entry.dog_grooming,
        "Supp_Omega3" => entry.supp_omega3,
        _ => false,
    }
}

/// Date × habit completion matrix, oldest day first
pub fn habit_matrix(log: &[AuditEntry]) -> Vec<HabitCell> {
    chronological(log)
        .into_iter()
        .flat_map(|entry| {
            HEATMAP_HABITS.into_iter().map(move |habit| HabitCell {
                date: entry.date,
                habit,
                done: u8::from(habit_done(entry, habit)),
            })
        })
        .collect()
}
