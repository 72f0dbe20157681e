use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::baseline::BaselineOptions;
use crate::ml::MlConfig;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub weather: WeatherConfig,
    pub network: NetworkConfig,
    pub training: MlConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Language of geocoded place names
    pub language: String,
    pub forecast_days: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            language: "en".to_string(),
            forecast_days: 7,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// JSON mood history used by the baseline forecast
    pub path: Option<PathBuf>,
    pub window_days: u32,
    pub min_window_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            window_days: 30,
            min_window_entries: 5,
        }
    }
}

impl HistoryConfig {
    pub fn baseline_options(&self) -> BaselineOptions {
        BaselineOptions {
            window_days: self.window_days,
            min_window_entries: self.min_window_entries,
        }
    }
}

impl AppConfig {
    /// Load defaults, config files and `MOODFLOW__*` environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("moodflow");

        let builder = defaults()?
            // Local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))
            // User config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))
            // Environment variables (MOODFLOW__TRAINING__SEED=42)
            .add_source(Environment::with_prefix("MOODFLOW").separator("__"));

        let settings = builder.build().context("Failed to build configuration")?;
        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load defaults overridden by a single file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = defaults()?
            .add_source(File::from(path))
            .build()
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    let weather = WeatherConfig::default();
    let network = NetworkConfig::default();
    let training = MlConfig::default();
    let history = HistoryConfig::default();

    let builder = Config::builder()
        // Weather
        .set_default("weather.geocoding_url", weather.geocoding_url)?
        .set_default("weather.forecast_url", weather.forecast_url)?
        .set_default("weather.language", weather.language)?
        .set_default("weather.forecast_days", weather.forecast_days as u64)?
        // Network
        .set_default("network.request_timeout_secs", network.request_timeout_secs)?
        .set_default("network.connect_timeout_secs", network.connect_timeout_secs)?
        // Training
        .set_default("training.corpus_days", training.corpus_days)?
        .set_default("training.train_fraction", training.train_fraction)?
        .set_default("training.knn_k", training.knn_k as u64)?
        .set_default("training.tree_max_depth", training.tree_max_depth as u64)?
        .set_default(
            "training.tree_min_samples_split",
            training.tree_min_samples_split as u64,
        )?
        .set_default("training.tree_min_gain", training.tree_min_gain)?
        .set_default("training.horizon_days", training.horizon_days as u64)?
        .set_default("training.seed", None::<u64>)?
        // History
        .set_default("history.path", None::<String>)?
        .set_default("history.window_days", history.window_days)?
        .set_default("history.min_window_entries", history.min_window_entries as u64)?;

    Ok(builder)
}
