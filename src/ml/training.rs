//! Training and forecasting pipeline
//!
//! Every request generates a fresh corpus, fits all estimators on its older
//! part, scores them on the most recent part and lets the best one forecast
//! the coming days. Nothing is cached between requests.

use std::time::Instant;

use chrono::{Duration, NaiveDate};
use ndarray::{Array1, Array2};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::mood::{MoodLevel, clamp_mood, round2};
use crate::traits::Clock;
use crate::weather::{WeatherForecastDay, interpret_weather_code};

use super::MlConfig;
use super::corpus::{DailyObservation, generate_corpus, mean_mood};
use super::evaluation::{chronological_split, evaluate};
use super::features::{DayConditions, encode, feature_matrix};
use super::model::{ModelKind, Regressor, TrainedModel, fit_model};
use super::prediction::{ModelFailure, ModelMetrics, ModelPrediction, PredictionBundle, PredictionPoint};

/// Errors that end a forecast request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// No forecast days were supplied
    #[error("weather forecast contains no days")]
    EmptyForecast,
    /// The corpus is too small to leave rows on both sides of the split
    #[error("corpus too small to split: {train} training and {test} test rows")]
    InsufficientCorpus { train: usize, test: usize },
    /// Every estimator failed to fit
    #[error("no model could be trained: {0}")]
    NoModelTrained(String),
}

/// A fitted model with its hold-out metrics.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub model: TrainedModel,
    pub metrics: ModelMetrics,
}

/// Outcome of fitting every estimator on one corpus.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub models: Vec<FittedModel>,
    pub failures: Vec<ModelFailure>,
    /// Mean mood over the whole corpus
    pub corpus_mean: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Encode observations into a feature matrix and target vector.
pub fn to_training_data(observations: &[DailyObservation]) -> (Array2<f64>, Array1<f64>) {
    let features: Vec<_> = observations.iter().map(|o| encode(&o.conditions)).collect();
    let targets: Array1<f64> = observations.iter().map(|o| o.mood).collect();
    (feature_matrix(&features), targets)
}

/// Generate a corpus ending at `today` and fit every estimator on it.
pub fn train_models<R: Rng + ?Sized>(
    today: NaiveDate,
    config: &MlConfig,
    rng: &mut R,
) -> Result<TrainingRun, ForecastError> {
    let corpus = generate_corpus(today, config.corpus_days, rng);
    let corpus_mean = mean_mood(&corpus).unwrap_or(f64::NAN);
    debug!(rows = corpus.len(), mean = corpus_mean, "Generated synthetic corpus");

    let (train, test) = chronological_split(&corpus, config.train_fraction);
    if train.is_empty() || test.is_empty() {
        return Err(ForecastError::InsufficientCorpus {
            train: train.len(),
            test: test.len(),
        });
    }

    let (x_train, y_train) = to_training_data(train);
    let (x_test, y_test) = to_training_data(test);

    let mut models = Vec::with_capacity(ModelKind::ALL.len());
    let mut failures = Vec::new();

    for kind in ModelKind::ALL {
        let started = Instant::now();
        match fit_model(kind, x_train.view(), y_train.view(), config) {
            Ok(model) => {
                let training_time_ms = started.elapsed().as_secs_f64() * 1000.0;
                let evaluation = evaluate(&model, x_test.view(), y_test.view());
                info!(
                    model = kind.key(),
                    test_r2 = evaluation.test_r2,
                    test_rmse = evaluation.test_rmse,
                    train_r2 = evaluation.train_r2,
                    training_time_ms,
                    "Model trained"
                );
                models.push(FittedModel {
                    model,
                    metrics: ModelMetrics {
                        evaluation,
                        training_time_ms,
                        train_samples: train.len(),
                        test_samples: test.len(),
                    },
                });
            }
            Err(e) => {
                warn!(model = kind.key(), error = %e, "Model training failed, skipping");
                failures.push(ModelFailure::new(kind, &e));
            }
        }
    }

    Ok(TrainingRun {
        models,
        failures,
        corpus_mean,
        train_samples: train.len(),
        test_samples: test.len(),
    })
}

/// Conditions for the forecast days, dated `today`, `today + 1`, ...
///
/// Calendar features follow the request date rather than the dates reported
/// by the weather service.
pub fn forecast_conditions(
    today: NaiveDate,
    forecast: &[WeatherForecastDay],
    horizon_days: usize,
) -> Vec<DayConditions> {
    forecast
        .iter()
        .take(horizon_days)
        .enumerate()
        .map(|(offset, day)| {
            DayConditions::new(
                today + Duration::days(offset as i64),
                day.weather_code,
                day.temp_max,
                day.temp_min,
            )
        })
        .collect()
}

/// Predict a clamped mood for each forecast day.
pub fn predict_points<M: Regressor + ?Sized>(
    model: &M,
    conditions: &[DayConditions],
) -> Vec<PredictionPoint> {
    let features: Vec<_> = conditions.iter().map(encode).collect();
    let predictions = model.predict(feature_matrix(&features).view());

    conditions
        .iter()
        .zip(predictions.iter())
        .map(|(day, &raw)| {
            let mood = round2(clamp_mood(raw));
            PredictionPoint {
                label: day.date.format("%a %d/%m").to_string(),
                date: day.date,
                mood,
                mood_level: MoodLevel::from_value(mood),
                weather: interpret_weather_code(day.weather_code),
                temp: (day.temp_max * 10.0).round() / 10.0,
            }
        })
        .collect()
}

/// Train all estimators and forecast mood for the given weather.
pub fn forecast_mood<R: Rng + ?Sized>(
    forecast: &[WeatherForecastDay],
    clock: &dyn Clock,
    rng: &mut R,
    config: &MlConfig,
) -> Result<PredictionBundle, ForecastError> {
    if forecast.is_empty() || config.horizon_days == 0 {
        return Err(ForecastError::EmptyForecast);
    }

    let today = clock.today();
    info!(%today, days = forecast.len().min(config.horizon_days), "Starting mood forecast");

    let run = train_models(today, config, rng)?;
    let conditions = forecast_conditions(today, forecast, config.horizon_days);

    let predictions: Vec<ModelPrediction> = run
        .models
        .iter()
        .map(|fitted| {
            ModelPrediction::new(
                fitted.model.kind(),
                predict_points(&fitted.model, &conditions),
                fitted.metrics,
            )
        })
        .collect();

    let failures = run.failures;
    let summary = failures
        .iter()
        .map(|f| format!("{}: {}", f.kind.key(), f.error))
        .collect::<Vec<_>>()
        .join("; ");

    let bundle = PredictionBundle::from_models(predictions, failures)
        .ok_or(ForecastError::NoModelTrained(summary))?;

    info!(
        best_model = bundle.best_model.key(),
        test_r2 = bundle.model_metrics.test_r2(),
        weekly_average = bundle.weekly_average,
        "Mood forecast ready"
    );

    Ok(bundle)
}
