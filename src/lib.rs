//! Moodflow Library
//!
//! Weekly mood forecasting from weather: a model-driven path that compares
//! three regressors trained on synthetic history, and a heuristic path built
//! on the user's own mood records.

pub mod api;
pub mod baseline;
pub mod config;
pub mod history;
pub mod ml;
pub mod mood;
pub mod session;
pub mod traits;
pub mod weather;

// Re-export commonly used types
pub use api::{CityForecast, Location, WeatherApiClient, WeatherError};
pub use baseline::{BaselineOptions, HeuristicForecast, baseline_mood, heuristic_forecast};
pub use config::AppConfig;
pub use history::{HistoryError, MoodEntry, MoodHistory};
pub use ml::{
    ForecastError, MlConfig, ModelKind, ModelSelection, PredictionBundle, PredictionPoint,
    TrainingError, forecast_mood,
};
pub use mood::{MoodCategory, MoodLevel};
pub use session::{CityPrediction, PredictionState, PredictionStatus, RequestToken};
pub use traits::{Clock, MockClock, SystemClock};
pub use weather::{WeatherCondition, WeatherForecastDay, interpret_weather_code};
