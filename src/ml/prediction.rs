//! Forecast result types and best-model selection

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::evaluation::EvaluationResult;
use super::model::{ModelKind, TrainingError};
use crate::mood::{MoodCategory, MoodLevel};
use crate::weather::WeatherCondition;

/// Predicted mood for one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPoint {
    /// Short display label, e.g. "Mon 15/07"
    pub label: String,
    pub date: NaiveDate,
    /// Clamped to [1, 5], two decimals
    pub mood: f64,
    pub mood_level: MoodLevel,
    pub weather: WeatherCondition,
    /// Daily maximum in °C
    pub temp: f64,
}

/// Evaluation numbers of one model plus training bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelMetrics {
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
    pub training_time_ms: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

impl ModelMetrics {
    pub fn test_r2(&self) -> f64 {
        self.evaluation.test_r2
    }

    /// R² used for ranking; NaN ranks last.
    fn ranking_score(&self) -> f64 {
        if self.evaluation.test_r2.is_nan() {
            f64::NEG_INFINITY
        } else {
            self.evaluation.test_r2
        }
    }
}

/// One model's forecast and metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPrediction {
    pub kind: ModelKind,
    pub name: &'static str,
    pub points: Vec<PredictionPoint>,
    pub metrics: ModelMetrics,
}

impl ModelPrediction {
    pub fn new(kind: ModelKind, points: Vec<PredictionPoint>, metrics: ModelMetrics) -> Self {
        Self {
            kind,
            name: kind.display_name(),
            points,
            metrics,
        }
    }

    pub fn average_mood(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.mood).sum::<f64>() / self.points.len() as f64)
    }
}

/// A model that could not be fitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFailure {
    pub kind: ModelKind,
    pub error: String,
}

impl ModelFailure {
    pub fn new(kind: ModelKind, error: &TrainingError) -> Self {
        Self {
            kind,
            error: error.to_string(),
        }
    }
}

/// Which model's forecast to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSelection {
    #[default]
    Best,
    Model(ModelKind),
}

impl FromStr for ModelSelection {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("best") {
            return Ok(ModelSelection::Best);
        }
        s.parse().map(ModelSelection::Model)
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelection::Best => f.write_str("best"),
            ModelSelection::Model(kind) => f.write_str(kind.key()),
        }
    }
}

/// Everything a forecast request produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionBundle {
    /// Forecast of the best model
    pub points: Vec<PredictionPoint>,
    pub reasons: Vec<String>,
    /// Category of the best model's weekly average
    pub baseline: MoodCategory,
    pub weekly_average: f64,
    pub best_model: ModelKind,
    pub best_model_name: &'static str,
    pub model_metrics: ModelMetrics,
    pub all_models: Vec<ModelPrediction>,
    pub failed_models: Vec<ModelFailure>,
}

/// Model with the highest test R². Ties keep the earliest model.
pub fn select_best(models: &[ModelPrediction]) -> Option<&ModelPrediction> {
    let mut iter = models.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, candidate| {
        if candidate.metrics.ranking_score() > best.metrics.ranking_score() {
            candidate
        } else {
            best
        }
    }))
}

impl PredictionBundle {
    /// Pick the best model and explain the choice. `None` when no model was
    /// fitted.
    pub fn from_models(models: Vec<ModelPrediction>, failed_models: Vec<ModelFailure>) -> Option<Self> {
        let best = select_best(&models)?.clone();
        let weekly_average = best.average_mood().unwrap_or(f64::NAN);
        let baseline = MoodCategory::from_average(weekly_average);
        let reasons = build_reasons(&best, &models, &failed_models, weekly_average, baseline);

        Some(Self {
            points: best.points,
            reasons,
            baseline,
            weekly_average,
            best_model: best.kind,
            best_model_name: best.name,
            model_metrics: best.metrics,
            all_models: models,
            failed_models,
        })
    }

    /// Forecast to display for `selection`, without retraining.
    pub fn points_for(&self, selection: ModelSelection) -> Option<&[PredictionPoint]> {
        match selection {
            ModelSelection::Best => Some(&self.points),
            ModelSelection::Model(kind) => self
                .all_models
                .iter()
                .find(|m| m.kind == kind)
                .map(|m| m.points.as_slice()),
        }
    }

    pub fn model(&self, kind: ModelKind) -> Option<&ModelPrediction> {
        self.all_models.iter().find(|m| m.kind == kind)
    }
}

fn build_reasons(
    best: &ModelPrediction,
    models: &[ModelPrediction],
    failed_models: &[ModelFailure],
    weekly_average: f64,
    baseline: MoodCategory,
) -> Vec<String> {
    let mut reasons = vec![format!(
        "{} selected with a test R² of {:.3} (RMSE {:.2} mood points)",
        best.name, best.metrics.evaluation.test_r2, best.metrics.evaluation.test_rmse
    )];

    if models.len() > 1 {
        let comparison = models
            .iter()
            .map(|m| format!("{} R² {:.3}", m.name, m.metrics.test_r2()))
            .collect::<Vec<_>>()
            .join(", ");
        reasons.push(format!("Model comparison: {}", comparison));
    }

    reasons.push(format!(
        "Trained on {} synthetic days, validated on the {} most recent",
        best.metrics.train_samples, best.metrics.test_samples
    ));

    reasons.push(format!(
        "Projected weekly average {:.2}/5: {}",
        weekly_average,
        baseline.description()
    ));

    let brightest = best.points.iter().max_by(|a, b| a.mood.total_cmp(&b.mood));
    let hardest = best.points.iter().min_by(|a, b| a.mood.total_cmp(&b.mood));
    if let (Some(high), Some(low)) = (brightest, hardest) {
        if high.date != low.date {
            reasons.push(format!(
                "Brightest day {} ({:.2}, {}), hardest day {} ({:.2}, {})",
                high.label,
                high.mood,
                high.weather.label.to_lowercase(),
                low.label,
                low.mood,
                low.weather.label.to_lowercase()
            ));
        }
    }

    for failure in failed_models {
        reasons.push(format!(
            "{} skipped: {}",
            failure.kind.display_name(),
            failure.error
        ));
    }

    reasons
}
