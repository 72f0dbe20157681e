//! Synthetic training corpus
//!
//! Real mood history carries no weather covariates, so the models are trained
//! on a simulated daily series instead. Each day gets a season-dependent
//! weather draw, a temperature and a mood built from fixed calendar and
//! weather effects plus noise.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::features::DayConditions;
use crate::mood::{clamp_mood, round2};

/// Base mood level before any effect is applied
const BASE_MOOD: f64 = 3.5;
/// Scale applied to the weather modifier
const WEATHER_WEIGHT: f64 = 1.5;
/// Amplitude of the uniform mood noise
const MOOD_NOISE: f64 = 0.3;
/// Mood lost per degree away from the comfort temperature
const TEMPERATURE_PENALTY: f64 = 0.02;
/// Comfort temperature in °C
const COMFORT_TEMPERATURE: f64 = 20.0;

/// Mood offset per weekday, Monday first.
const WEEKDAY_EFFECT: [f64; 7] = [-0.3, -0.1, 0.0, 0.1, 0.3, 0.5, 0.4];

/// Mood offset per month, January first.
const MONTH_EFFECT: [f64; 12] = [
    -0.3, -0.25, -0.1, 0.05, 0.15, 0.25, 0.3, 0.25, 0.1, -0.05, -0.2, -0.1,
];

/// One labeled day of the training corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    #[serde(flatten)]
    pub conditions: DayConditions,
    /// Target in [1, 5], two decimals
    pub mood: f64,
}

/// Meteorological season used to bias weather draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season of a 0-based month.
    pub fn from_month(month: u32) -> Self {
        match month {
            11 | 0 | 1 => Season::Winter,
            2..=4 => Season::Spring,
            5..=7 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// Cumulative probability bands mapped to representative weather codes.
    fn weather_bands(&self) -> &'static [(f64, i32)] {
        match self {
            Season::Summer => &[(0.45, 0), (0.75, 2), (0.85, 3), (0.95, 63), (1.0, 95)],
            Season::Winter => &[
                (0.10, 0),
                (0.25, 2),
                (0.50, 3),
                (0.75, 63),
                (0.90, 73),
                (1.0, 45),
            ],
            Season::Spring | Season::Autumn => {
                &[(0.25, 0), (0.50, 2), (0.70, 3), (0.90, 63), (1.0, 53)]
            }
        }
    }

    /// Pick a weather code for a uniform draw in [0, 1).
    pub fn weather_code_for(&self, draw: f64) -> i32 {
        let bands = self.weather_bands();
        bands
            .iter()
            .find(|(upper, _)| draw < *upper)
            .or_else(|| bands.last())
            .map(|(_, code)| *code)
            .unwrap_or(0)
    }
}

/// Temperature swing of a 0-based month: -1 in January, +1 in July.
pub fn seasonal_amplitude(month: u32) -> f64 {
    -(2.0 * PI * month as f64 / 12.0).cos()
}

/// Generate `days + 1` observations ending at `today`, oldest first.
pub fn generate_corpus<R: Rng + ?Sized>(
    today: NaiveDate,
    days: u32,
    rng: &mut R,
) -> Vec<DailyObservation> {
    (0..=days as i64)
        .rev()
        .map(|offset| simulate_day(today - Duration::days(offset), rng))
        .collect()
}

/// Simulate weather and mood for a single date.
pub fn simulate_day<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> DailyObservation {
    let season = Season::from_month(date.month0());
    let weather_code = season.weather_code_for(rng.gen_range(0.0..1.0));

    let temp_max = 15.0 + seasonal_amplitude(date.month0()) * 10.0 + rng.gen_range(-3.0..=3.0);
    let temp_min = temp_max - 5.0 - rng.gen_range(0.0..=3.0);

    let conditions = DayConditions::new(date, weather_code, temp_max, temp_min);
    let noise = rng.gen_range(-MOOD_NOISE..=MOOD_NOISE);
    let mood = mood_for(&conditions, date.day(), noise);

    DailyObservation { conditions, mood }
}

/// Mood formula applied to a simulated day.
fn mood_for(conditions: &DayConditions, day_of_month: u32, noise: f64) -> f64 {
    let weekday_effect = WEEKDAY_EFFECT[conditions.weekday as usize % 7];
    let month_effect = MONTH_EFFECT[conditions.month as usize % 12];
    let weather_effect = conditions.weather_modifier * WEATHER_WEIGHT;
    let monthly_cycle = 0.1 * (2.0 * PI * day_of_month as f64 / 30.0).sin();
    let temperature_penalty =
        TEMPERATURE_PENALTY * (conditions.temp_max - COMFORT_TEMPERATURE).abs();

    let raw = BASE_MOOD + weekday_effect + month_effect + weather_effect + noise + monthly_cycle
        - temperature_penalty;
    round2(clamp_mood(raw))
}

/// Mean mood over a corpus.
pub fn mean_mood(corpus: &[DailyObservation]) -> Option<f64> {
    if corpus.is_empty() {
        return None;
    }
    Some(corpus.iter().map(|o| o.mood).sum::<f64>() / corpus.len() as f64)
}
