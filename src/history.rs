//! The user's recorded mood history.
//!
//! Stored as a JSON object keyed by ISO date:
//! `{"2025-10-14": {"mood": 4, "note": "...", "timestamp": "..."}}`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::mood::MoodLevel;

/// Errors raised while reading a mood history
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("invalid mood history JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mood {mood} recorded on {date} is outside 1-5")]
    InvalidMood { date: NaiveDate, mood: u8 },
}

/// One recorded day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// 1 (very sad) to 5 (very happy)
    pub mood: u8,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl MoodEntry {
    pub fn new(mood: u8, note: impl Into<String>) -> Self {
        Self {
            mood,
            note: note.into(),
            timestamp: None,
        }
    }

    pub fn level(&self) -> MoodLevel {
        MoodLevel::from_value(self.mood as f64)
    }
}

/// Mood entries in chronological order, at most one per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodHistory {
    entries: BTreeMap<NaiveDate, MoodEntry>,
}

impl MoodHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON history.
    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        let history: MoodHistory = serde_json::from_str(json)?;
        if let Some((date, entry)) = history
            .entries
            .iter()
            .find(|(_, e)| !(1..=5).contains(&e.mood))
        {
            return Err(HistoryError::InvalidMood {
                date: *date,
                mood: entry.mood,
            });
        }
        Ok(history)
    }

    /// Load a history file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mood history {}", path.display()))?;
        let history = Self::from_json(&json)
            .with_context(|| format!("Failed to parse mood history {}", path.display()))?;
        debug!(path = %path.display(), entries = history.len(), "Loaded mood history");
        Ok(history)
    }

    /// Record or replace the entry for `date`.
    pub fn insert(&mut self, date: NaiveDate, entry: MoodEntry) -> Option<MoodEntry> {
        self.entries.insert(date, entry)
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<MoodEntry> {
        self.entries.remove(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&MoodEntry> {
        self.entries.get(&date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &MoodEntry)> {
        self.entries.iter().map(|(date, entry)| (*date, entry))
    }

    /// Entries from `days - 1` days before `today` up to and including `today`.
    pub fn trailing_window(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> impl Iterator<Item = (NaiveDate, &MoodEntry)> {
        let start = today - Duration::days(days.saturating_sub(1) as i64);
        self.entries
            .range(start..=today)
            .map(|(date, entry)| (*date, entry))
    }

    /// Mean mood over all entries.
    pub fn average(&self) -> Option<f64> {
        average(self.entries.values().map(|e| e.mood as f64))
    }

    /// Mean mood per weekday, Monday first.
    pub fn weekday_averages(&self) -> [Option<f64>; 7] {
        let mut sums = [0.0; 7];
        let mut counts = [0usize; 7];
        for (date, entry) in &self.entries {
            let weekday = date.weekday().num_days_from_monday() as usize;
            sums[weekday] += entry.mood as f64;
            counts[weekday] += 1;
        }
        std::array::from_fn(|i| (counts[i] > 0).then(|| sums[i] / counts[i] as f64))
    }
}

pub(crate) fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
