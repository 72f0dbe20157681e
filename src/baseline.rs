//! Heuristic mood forecast from the user's own history.
//!
//! No training involved: the recent average mood is shifted by the weekday's
//! historical deviation and the day's weather modifier.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::history::{MoodHistory, average};
use crate::ml::PredictionPoint;
use crate::mood::{MoodCategory, MoodLevel, clamp_mood, round2};
use crate::weather::WeatherForecastDay;

/// Baseline used when there is no history at all.
pub const NEUTRAL_BASELINE: f64 = 3.0;

/// How much history the baseline looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineOptions {
    /// Trailing window, in days including today
    pub window_days: u32,
    /// Fewer entries than this in the window falls back to the full history
    pub min_window_entries: usize,
}

impl Default for BaselineOptions {
    fn default() -> Self {
        Self {
            window_days: 30,
            min_window_entries: 5,
        }
    }
}

/// Heuristic forecast for the coming days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicForecast {
    pub baseline: f64,
    pub category: MoodCategory,
    pub points: Vec<PredictionPoint>,
    pub reasons: Vec<String>,
}

/// Where the baseline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaselineSource {
    Window(usize),
    FullHistory(usize),
    Neutral,
}

fn compute_baseline(
    history: &MoodHistory,
    today: NaiveDate,
    options: &BaselineOptions,
) -> (f64, BaselineSource) {
    let window: Vec<f64> = history
        .trailing_window(today, options.window_days)
        .map(|(_, e)| e.mood as f64)
        .collect();

    if window.len() >= options.min_window_entries {
        if let Some(mean) = average(window.iter().copied()) {
            return (mean, BaselineSource::Window(window.len()));
        }
    }

    match history.average() {
        Some(mean) => (mean, BaselineSource::FullHistory(history.len())),
        None => (NEUTRAL_BASELINE, BaselineSource::Neutral),
    }
}

/// Average recent mood, falling back to the full history and then to neutral.
pub fn baseline_mood(history: &MoodHistory, today: NaiveDate, options: &BaselineOptions) -> f64 {
    compute_baseline(history, today, options).0
}

/// Forecast each day as baseline + weekday offset + weather modifier.
///
/// Days are dated `today`, `today + 1`, ... like the model forecast.
pub fn heuristic_forecast(
    history: &MoodHistory,
    forecast: &[WeatherForecastDay],
    today: NaiveDate,
    options: &BaselineOptions,
) -> HeuristicForecast {
    let (baseline, source) = compute_baseline(history, today, options);
    let weekday_averages = history.weekday_averages();

    let points: Vec<PredictionPoint> = forecast
        .iter()
        .enumerate()
        .map(|(offset, day)| {
            let date = today + Duration::days(offset as i64);
            let weekday = date.weekday().num_days_from_monday() as usize;
            let weekday_offset = weekday_averages[weekday].map_or(0.0, |avg| avg - baseline);
            let weather = day.condition();
            let mood = round2(clamp_mood(baseline + weekday_offset + weather.modifier));

            PredictionPoint {
                label: date.format("%a %d/%m").to_string(),
                date,
                mood,
                mood_level: MoodLevel::from_value(mood),
                weather,
                temp: (day.temp_max * 10.0).round() / 10.0,
            }
        })
        .collect();

    let projected = average(points.iter().map(|p| p.mood)).unwrap_or(baseline);
    let category = MoodCategory::from_average(projected);

    let mut reasons = vec![match source {
        BaselineSource::Window(n) => format!(
            "Baseline {:.2}/5 from {} entries in the last {} days",
            baseline, n, options.window_days
        ),
        BaselineSource::FullHistory(n) => format!(
            "Baseline {:.2}/5 from all {} recorded entries (too few recent ones)",
            baseline, n
        ),
        BaselineSource::Neutral => {
            format!("No mood history yet, starting from a neutral {:.1}", baseline)
        }
    }];
    reasons.push(format!(
        "Projected weekly average {:.2}/5: {}",
        projected,
        category.description()
    ));

    HeuristicForecast {
        baseline,
        category,
        points,
        reasons,
    }
}
