//! State of the prediction panel across overlapping requests.
//!
//! Each `begin` issues a new [`RequestToken`]; only the completion carrying
//! the latest token is applied, so a slow, superseded request can never
//! overwrite a newer result.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::WeatherError;
use crate::ml::{ModelMetrics, ModelSelection, PredictionBundle, PredictionPoint};
use crate::mood::MoodCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Identifies one prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// A successful prediction for a resolved city.
#[derive(Debug, Clone)]
pub struct CityPrediction {
    pub city_label: String,
    pub bundle: PredictionBundle,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PredictionState {
    pub status: PredictionStatus,
    pub city: String,
    pub city_label: Option<String>,
    /// Points of the selected model
    pub chart: Option<Vec<PredictionPoint>>,
    pub selected_model: ModelSelection,
    pub reasons: Vec<String>,
    pub baseline: Option<MoodCategory>,
    pub model_metrics: Option<ModelMetrics>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    #[serde(skip)]
    bundle: Option<PredictionBundle>,
    #[serde(skip)]
    issued: u64,
    #[serde(skip)]
    in_flight: Option<RequestToken>,
}

impl PredictionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `city`. Empty names are rejected and leave the
    /// state untouched.
    pub fn begin(&mut self, city: &str) -> Result<RequestToken, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        self.issued += 1;
        let token = RequestToken(self.issued);
        self.in_flight = Some(token);
        self.city = city.to_string();
        self.status = PredictionStatus::Loading;
        self.error = None;
        debug!(city, token = token.0, "Prediction request started");
        Ok(token)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Apply the outcome of request `token`. Returns `false` when the token
    /// was superseded and the outcome discarded.
    pub fn complete<E: fmt::Display>(
        &mut self,
        token: RequestToken,
        result: Result<CityPrediction, E>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.in_flight != Some(token) {
            debug!(token = token.0, "Ignoring stale prediction result");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(prediction) => {
                self.status = PredictionStatus::Success;
                self.city_label = Some(prediction.city_label);
                self.reasons = prediction.bundle.reasons.clone();
                self.baseline = Some(prediction.bundle.baseline);
                self.last_updated = Some(now);
                self.error = None;
                self.bundle = Some(prediction.bundle);
                if !self.apply_selection(self.selected_model) {
                    self.selected_model = ModelSelection::Best;
                    self.apply_selection(ModelSelection::Best);
                }
            }
            Err(e) => {
                warn!(error = %e, "Prediction failed");
                self.status = PredictionStatus::Error;
                self.error = Some(e.to_string());
                self.chart = None;
                self.reasons.clear();
                self.baseline = None;
                self.model_metrics = None;
                self.last_updated = None;
                self.bundle = None;
            }
        }
        true
    }

    /// Show another model's forecast without retraining. Returns `false` when
    /// there is no result yet or that model was not trained.
    pub fn select_model(&mut self, selection: ModelSelection) -> bool {
        if self.apply_selection(selection) {
            self.selected_model = selection;
            true
        } else {
            false
        }
    }

    pub fn bundle(&self) -> Option<&PredictionBundle> {
        self.bundle.as_ref()
    }

    fn apply_selection(&mut self, selection: ModelSelection) -> bool {
        let Some(bundle) = &self.bundle else {
            return false;
        };
        let metrics = match selection {
            ModelSelection::Best => Some(bundle.model_metrics),
            ModelSelection::Model(kind) => bundle.model(kind).map(|m| m.metrics),
        };
        match (bundle.points_for(selection), metrics) {
            (Some(points), Some(metrics)) => {
                self.chart = Some(points.to_vec());
                self.model_metrics = Some(metrics);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::evaluation::EvaluationResult;
    use crate::ml::prediction::{ModelFailure, ModelPrediction};
    use crate::ml::{ModelKind, TrainingError};
    use crate::mood::MoodLevel;
    use crate::weather::interpret_weather_code;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 9, 0, 0).unwrap()
    }

    fn prediction(kind: ModelKind, test_r2: f64, mood: f64) -> ModelPrediction {
        let date = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        ModelPrediction::new(
            kind,
            vec![PredictionPoint {
                label: "Mon 20/10".to_string(),
                date,
                mood,
                mood_level: MoodLevel::from_value(mood),
                weather: interpret_weather_code(1),
                temp: 15.0,
            }],
            ModelMetrics {
                evaluation: EvaluationResult {
                    test_r2,
                    test_mse: 0.2,
                    test_rmse: 0.2f64.sqrt(),
                    train_r2: 0.7,
                    train_mse: 0.1,
                },
                training_time_ms: 2.0,
                train_samples: 400,
                test_samples: 101,
            },
        )
    }

    fn success(label: &str) -> Result<CityPrediction, WeatherError> {
        let bundle = PredictionBundle::from_models(
            vec![
                prediction(ModelKind::Linear, 0.4, 3.1),
                prediction(ModelKind::Tree, 0.6, 3.6),
            ],
            vec![ModelFailure::new(
                ModelKind::Knn,
                &TrainingError::InvalidParameter("k must be at least 1".to_string()),
            )],
        )
        .unwrap();
        Ok(CityPrediction {
            city_label: label.to_string(),
            bundle,
        })
    }

    #[test]
    fn test_empty_city_rejected() {
        let mut state = PredictionState::new();

        assert!(matches!(state.begin("  "), Err(WeatherError::EmptyCity)));
        assert_eq!(state.status, PredictionStatus::Idle);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_success_populates_state() {
        let mut state = PredictionState::new();
        let token = state.begin(" Paris ").unwrap();
        assert_eq!(state.status, PredictionStatus::Loading);
        assert_eq!(state.city, "Paris");

        assert!(state.complete(token, success("Paris, France"), now()));

        assert_eq!(state.status, PredictionStatus::Success);
        assert_eq!(state.city_label.as_deref(), Some("Paris, France"));
        assert_eq!(state.chart.as_ref().unwrap()[0].mood, 3.6);
        assert_eq!(state.model_metrics.unwrap().test_r2(), 0.6);
        assert_eq!(state.baseline, Some(MoodCategory::Neutral));
        assert_eq!(state.last_updated, Some(now()));
        assert!(!state.reasons.is_empty());
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut state = PredictionState::new();
        let first = state.begin("Paris").unwrap();
        let second = state.begin("Lyon").unwrap();

        assert!(!state.complete(first, success("Paris, France"), now()));
        assert_eq!(state.status, PredictionStatus::Loading);
        assert!(state.city_label.is_none());

        assert!(state.complete(second, success("Lyon, France"), now()));
        assert_eq!(state.city_label.as_deref(), Some("Lyon, France"));

        // A completed token cannot be applied twice
        assert!(!state.complete(second, success("Lyon, France"), now()));
    }

    #[test]
    fn test_error_clears_previous_result() {
        let mut state = PredictionState::new();
        let token = state.begin("Paris").unwrap();
        state.complete(token, success("Paris, France"), now());

        let token = state.begin("Atlantis").unwrap();
        let failed: Result<CityPrediction, WeatherError> =
            Err(WeatherError::CityNotFound("Atlantis".to_string()));
        assert!(state.complete(token, failed, now()));

        assert_eq!(state.status, PredictionStatus::Error);
        assert!(state.error.as_ref().unwrap().contains("Atlantis"));
        assert!(state.chart.is_none());
        assert!(state.reasons.is_empty());
        assert!(state.baseline.is_none());
        assert!(state.model_metrics.is_none());
        assert!(state.last_updated.is_none());
        assert!(state.bundle().is_none());
    }

    #[test]
    fn test_select_model_rederives_chart() {
        let mut state = PredictionState::new();
        let token = state.begin("Paris").unwrap();
        state.complete(token, success("Paris, France"), now());

        assert!(state.select_model(ModelSelection::Model(ModelKind::Linear)));
        assert_eq!(state.chart.as_ref().unwrap()[0].mood, 3.1);
        assert_eq!(state.model_metrics.unwrap().test_r2(), 0.4);

        // KNN failed to train
        assert!(!state.select_model(ModelSelection::Model(ModelKind::Knn)));
        assert_eq!(state.selected_model, ModelSelection::Model(ModelKind::Linear));

        assert!(state.select_model(ModelSelection::Best));
        assert_eq!(state.chart.as_ref().unwrap()[0].mood, 3.6);
    }

    #[test]
    fn test_selection_survives_refresh() {
        let mut state = PredictionState::new();
        let token = state.begin("Paris").unwrap();
        state.complete(token, success("Paris, France"), now());
        state.select_model(ModelSelection::Model(ModelKind::Linear));

        let token = state.begin("Paris").unwrap();
        state.complete(token, success("Paris, France"), now());

        assert_eq!(state.chart.as_ref().unwrap()[0].mood, 3.1);
    }

    #[test]
    fn test_select_model_without_result() {
        let mut state = PredictionState::new();
        assert!(!state.select_model(ModelSelection::Best));
        assert_eq!(state.selected_model, ModelSelection::Best);
    }
}
