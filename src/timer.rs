//! Study timer state.
//!
//! A timer is a plain value owned by the caller (one per study track). Every
//! operation takes the current instant explicitly, so no process-wide clock
//! state is involved and the arithmetic is testable.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct StudyTimer {
    /// Set while a session is running
    started_at: Option<DateTime<Utc>>,
    /// Time banked by completed sessions
    elapsed: Duration,
}

impl Default for StudyTimer {
    fn default() -> Self {
        Self {
            started_at: None,
            elapsed: Duration::zero(),
        }
    }
}

impl StudyTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start a session; no-op if one is already running
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Bank the running session; no-op when stopped
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if let Some(started_at) = self.started_at.take() {
            self.elapsed = self.elapsed + clamp_non_negative(now - started_at);
        }
    }

    /// Stop and forget all banked time
    pub fn reset(&mut self) {
        self.started_at = None;
        self.elapsed = Duration::zero();
    }

    /// Banked time plus the running session, if any
    pub fn total(&self, now: DateTime<Utc>) -> Duration {
        let running = self
            .started_at
            .map(|started_at| clamp_non_negative(now - started_at))
            .unwrap_or_else(Duration::zero);
        self.elapsed + running
    }

    /// Total in hours, rounded to two decimals (audit form pre-fill)
    pub fn hours(&self, now: DateTime<Utc>) -> f64 {
        let hours = self.total(now).num_seconds() as f64 / 3600.0;
        (hours * 100.0).round() / 100.0
    }
}

fn clamp_non_negative(duration: Duration) -> Duration {
    duration.max(Duration::zero())
}

/// Render a duration as `HH:MM:SS` (hours are not wrapped at 24)
pub fn format_hms(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
