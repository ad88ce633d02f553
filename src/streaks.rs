//! # Streak Calculator
//!
//! Computes, per habit, how many consecutive calendar days ending today or
//! yesterday the habit's success predicate held. Streaks are never stored;
//! they are recomputed from the log snapshot on every call.
//!
//! ## Rules
//!
//! - Entries dated after `today` are ignored
//! - If the most recent entry is older than yesterday, the streak is 0
//! - A missing day between two entries ends the streak
//! - The first failing day (walking backwards) ends the streak
//! - A successful entry for yesterday counts even when today is not logged yet
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use growth_engine::audit::AuditEntry;
//! use growth_engine::streaks::{calculate_streaks, default_criteria};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//! let mut entry = AuditEntry::new(today);
//! entry.gym = true;
//!
//! let streaks = calculate_streaks(&[entry], &default_criteria(), today);
//! assert_eq!(streaks["Gym"], 1);
//! assert_eq!(streaks["CPA"], 0);
//! ```

use chrono::{Local, NaiveDate};
use log::{debug, trace};
use std::collections::BTreeMap;

use crate::audit::{AuditEntry, DatedRecord};

/// Largest gap in days that still keeps a streak alive
const MAX_GAP_DAYS: i64 = 1;

/// Success predicate for one habit
pub type HabitPredicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// A named habit and the test a day must pass to count towards its streak
pub struct HabitCriterion<R> {
    pub name: String,
    pub predicate: HabitPredicate<R>,
}

impl<R> HabitCriterion<R> {
    pub fn new<F>(name: &str, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            predicate: Box::new(predicate),
        }
    }

    fn holds_for(&self, record: &R) -> bool {
        (self.predicate)(record)
    }
}

impl<R> std::fmt::Debug for HabitCriterion<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HabitCriterion")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The four dashboard habits over the daily audit log
pub fn default_criteria() -> Vec<HabitCriterion<AuditEntry>> {
    vec![
        HabitCriterion::new("CPA", |r: &AuditEntry| r.cpa_hours > 0.0),
        HabitCriterion::new("Gym", |r: &AuditEntry| r.gym),
        HabitCriterion::new("Dog", |r: &AuditEntry| r.dog_walks > 0),
        HabitCriterion::new("Tech", |r: &AuditEntry| r.tech_ai_hours > 0.0),
    ]
}

/// Compute the current streak of every habit in `criteria`
///
/// Every habit named in `criteria` appears in the result, with 0 when the
/// log is empty or has no recent activity.
pub fn calculate_streaks<R: DatedRecord>(
    log: &[R],
    criteria: &[HabitCriterion<R>],
    today: NaiveDate,
) -> BTreeMap<String, u32> {
    let mut streaks: BTreeMap<String, u32> = criteria
        .iter()
        .map(|criterion| (criterion.name.clone(), 0))
        .collect();

    if log.is_empty() {
        debug!("Empty habit log, all streaks are 0");
        return streaks;
    }

    // Most recent first; future entries are dropped up front
    let mut recent: Vec<&R> = log.iter().filter(|r| r.date() <= today).collect();
    recent.sort_by(|a, b| b.date().cmp(&a.date()));

    for criterion in criteria {
        let streak = streak_for(&recent, criterion, today);
        trace!("Streak for {}: {}", criterion.name, streak);
        streaks.insert(criterion.name.clone(), streak);
    }

    debug!("Calculated streaks as of {}: {:?}", today, streaks);
    streaks
}

/// Same as [`calculate_streaks`] with today's local calendar date
pub fn calculate_streaks_as_of_now<R: DatedRecord>(
    log: &[R],
    criteria: &[HabitCriterion<R>],
) -> BTreeMap<String, u32> {
    calculate_streaks(log, criteria, Local::now().date_naive())
}

/// Walk `recent` (sorted newest first) until a gap or a failing day
fn streak_for<R: DatedRecord>(
    recent: &[&R],
    criterion: &HabitCriterion<R>,
    today: NaiveDate,
) -> u32 {
    let mut streak = 0;
    let mut last_date: Option<NaiveDate> = None;

    for record in recent {
        let date = record.date();
        let anchor = last_date.unwrap_or(today);
        if (anchor - date).num_days() > MAX_GAP_DAYS {
            break;
        }
        last_date = Some(date);

        if criterion.holds_for(record) {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    fn gym_day(date: NaiveDate, gym: bool) -> AuditEntry {
        let mut entry = AuditEntry::new(date);
        entry.gym = gym;
        entry
    }

    fn gym_streak(log: &[AuditEntry]) -> u32 {
        calculate_streaks(log, &default_criteria(), today())["Gym"]
    }

    #[test]
    fn test_empty_log_is_all_zero() {
        let streaks = calculate_streaks(&[], &default_criteria(), today());
        assert_eq!(streaks.len(), 4);
        for name in ["CPA", "Gym", "Dog", "Tech"] {
            assert_eq!(streaks[name], 0, "habit {name}");
        }
    }

    #[test]
    fn test_today_success_yesterday_failure() {
        let log = vec![gym_day(today(), true), gym_day(days_ago(1), false)];
        assert_eq!(gym_streak(&log), 1);
    }

    #[test]
    fn test_consecutive_days() {
        let log: Vec<AuditEntry> = (0..5).map(|n| gym_day(days_ago(n), true)).collect();
        assert_eq!(gym_streak(&log), 5);
    }

    #[test]
    fn test_yesterday_counts_when_today_not_logged() {
        let log = vec![gym_day(days_ago(1), true), gym_day(days_ago(2), true)];
        assert_eq!(gym_streak(&log), 2);
    }

    #[test]
    fn test_latest_entry_two_days_old_breaks_streak() {
        let log = vec![gym_day(days_ago(2), true), gym_day(days_ago(3), true)];
        assert_eq!(gym_streak(&log), 0);
    }

    #[test]
    fn test_gap_in_history_stops_count() {
        let log = vec![
            gym_day(today(), true),
            gym_day(days_ago(1), true),
            // days_ago(2) missing
            gym_day(days_ago(3), true),
            gym_day(days_ago(4), true),
        ];
        assert_eq!(gym_streak(&log), 2);
    }

    #[test]
    fn test_today_failure_ends_streak_immediately() {
        let log = vec![gym_day(today(), false), gym_day(days_ago(1), true)];
        assert_eq!(gym_streak(&log), 0);
    }

    #[test]
    fn test_future_entries_are_ignored() {
        let log = vec![
            gym_day(today() + Duration::days(1), false),
            gym_day(today(), true),
            gym_day(days_ago(1), true),
        ];
        assert_eq!(gym_streak(&log), 2);
    }

    #[test]
    fn test_unsorted_log() {
        let log = vec![
            gym_day(days_ago(2), true),
            gym_day(today(), true),
            gym_day(days_ago(1), true),
        ];
        assert_eq!(gym_streak(&log), 3);
    }

    #[test]
    fn test_habits_are_independent() {
        let mut today_entry = AuditEntry::new(today());
        today_entry.cpa_hours = 2.0;
        today_entry.dog_walks = 2;
        let mut yesterday = AuditEntry::new(days_ago(1));
        yesterday.cpa_hours = 1.5;
        yesterday.tech_ai_hours = 1.0;

        let streaks = calculate_streaks(&[today_entry, yesterday], &default_criteria(), today());
        assert_eq!(streaks["CPA"], 2);
        assert_eq!(streaks["Dog"], 1);
        assert_eq!(streaks["Gym"], 0);
        assert_eq!(streaks["Tech"], 0);
    }

    #[test]
    fn test_custom_criteria() {
        let criteria = vec![HabitCriterion::new("Diet", |r: &AuditEntry| r.diet_adherence)];
        let mut entry = AuditEntry::new(today());
        entry.diet_adherence = true;

        let streaks = calculate_streaks(&[entry], &criteria, today());
        assert_eq!(streaks.len(), 1);
        assert_eq!(streaks["Diet"], 1);
    }
}
