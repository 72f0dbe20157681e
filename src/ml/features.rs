//! Feature encoding for the mood models
//!
//! Converts a day's calendar position and weather into the fixed feature
//! vector shared by every estimator.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::weather::interpret_weather_code;

/// Calendar and weather description of a single day.
///
/// Training rows and forecast rows are both built through [`DayConditions::new`]
/// so the derived fields are computed the same way on both paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayConditions {
    pub date: NaiveDate,
    /// 0 = Monday, 6 = Sunday
    pub weekday: u32,
    /// 0 = January
    pub month: u32,
    /// 0-based ordinal day, 0..=365
    pub day_of_year: u32,
    pub weather_code: i32,
    pub weather_modifier: f64,
    /// Sinusoid over the year in [-1, 1], peaking in late June
    pub season_factor: f64,
    pub temp_max: f64,
    pub temp_min: f64,
}

impl DayConditions {
    pub fn new(date: NaiveDate, weather_code: i32, temp_max: f64, temp_min: f64) -> Self {
        let day_of_year = date.ordinal0();
        Self {
            date,
            weekday: date.weekday().num_days_from_monday(),
            month: date.month0(),
            day_of_year,
            weather_code,
            weather_modifier: interpret_weather_code(weather_code).modifier,
            season_factor: season_factor(day_of_year),
            temp_max,
            temp_min,
        }
    }
}

/// Seasonal position of a day: +1 around the summer solstice, -1 in winter.
pub fn season_factor(day_of_year: u32) -> f64 {
    (2.0 * PI * (day_of_year as f64 - 80.0) / 365.0).sin()
}

/// Normalized model input. Field order is the column order of every
/// feature matrix; reordering invalidates fitted coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub weekday: f64,
    pub month: f64,
    pub weather_modifier: f64,
    pub season_factor: f64,
    pub temperature: f64,
    pub day_of_year: f64,
}

impl FeatureVector {
    /// Number of features
    pub const NUM_FEATURES: usize = 6;

    pub fn to_array(&self) -> [f64; Self::NUM_FEATURES] {
        [
            self.weekday,
            self.month,
            self.weather_modifier,
            self.season_factor,
            self.temperature,
            self.day_of_year,
        ]
    }

    /// Feature names for logging, in column order
    pub fn feature_names() -> [&'static str; Self::NUM_FEATURES] {
        [
            "weekday",
            "month",
            "weather_modifier",
            "season_factor",
            "temperature",
            "day_of_year",
        ]
    }
}

/// Encode a day into its feature vector.
pub fn encode(conditions: &DayConditions) -> FeatureVector {
    FeatureVector {
        weekday: conditions.weekday as f64 / 6.0,
        month: conditions.month as f64 / 11.0,
        weather_modifier: conditions.weather_modifier,
        season_factor: conditions.season_factor,
        temperature: (conditions.temp_max - 10.0) / 20.0,
        day_of_year: conditions.day_of_year as f64 / 365.0,
    }
}

/// Stack feature vectors into an `n x NUM_FEATURES` matrix.
pub fn feature_matrix(features: &[FeatureVector]) -> Array2<f64> {
    let mut matrix = Array2::zeros((features.len(), FeatureVector::NUM_FEATURES));
    for (mut row, feature) in matrix.rows_mut().into_iter().zip(features) {
        for (cell, value) in row.iter_mut().zip(feature.to_array()) {
            *cell = value;
        }
    }
    matrix
}
