//! The 1-5 mood scale.

use serde::{Deserialize, Serialize};

/// Lowest value on the mood scale.
pub const MOOD_MIN: f64 = 1.0;
/// Highest value on the mood scale.
pub const MOOD_MAX: f64 = 5.0;

/// Clamp a raw score onto the mood scale.
pub fn clamp_mood(value: f64) -> f64 {
    value.clamp(MOOD_MIN, MOOD_MAX)
}

/// Round to two decimals, the precision moods are reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Discrete mood level as recorded by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodLevel {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl MoodLevel {
    /// Nearest level for a continuous mood value. Out-of-range values saturate.
    pub fn from_value(value: f64) -> Self {
        match clamp_mood(value).round() as u8 {
            1 => MoodLevel::VerySad,
            2 => MoodLevel::Sad,
            3 => MoodLevel::Neutral,
            4 => MoodLevel::Happy,
            _ => MoodLevel::VeryHappy,
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            MoodLevel::VerySad => 1,
            MoodLevel::Sad => 2,
            MoodLevel::Neutral => 3,
            MoodLevel::Happy => 4,
            MoodLevel::VeryHappy => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MoodLevel::VerySad => "Very sad",
            MoodLevel::Sad => "Sad",
            MoodLevel::Neutral => "Neutral",
            MoodLevel::Happy => "Happy",
            MoodLevel::VeryHappy => "Very happy",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoodLevel::VerySad => "😞",
            MoodLevel::Sad => "😔",
            MoodLevel::Neutral => "😐",
            MoodLevel::Happy => "😊",
            MoodLevel::VeryHappy => "😄",
        }
    }
}

/// Coarse category of an average mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Low,
    Neutral,
    High,
}

impl MoodCategory {
    /// Low at or below 2.5, high from 4 upwards.
    pub fn from_average(average: f64) -> Self {
        if average <= 2.5 {
            MoodCategory::Low
        } else if average >= 4.0 {
            MoodCategory::High
        } else {
            MoodCategory::Neutral
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MoodCategory::Low => "a difficult week",
            MoodCategory::Neutral => "a balanced week",
            MoodCategory::High => "a bright week",
        }
    }
}
