use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodflow::{
    AppConfig, CityPrediction, Clock, ModelSelection, MoodHistory, PredictionPoint,
    PredictionState, PredictionStatus, SystemClock, WeatherApiClient, baseline::HeuristicForecast,
    forecast_mood, heuristic_forecast, traits::rng_from_seed,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "moodflow")]
#[command(about = "Weekly mood forecast from the weather")]
struct Args {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the models and forecast the coming week
    Forecast {
        #[arg(long)]
        city: String,
        /// best, linear, knn or tree
        #[arg(long, default_value = "best")]
        model: ModelSelection,
        /// Seed the synthetic corpus for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Forecast from the recorded mood history, without models
    Baseline {
        #[arg(long)]
        city: String,
        /// JSON mood history, overrides history.path from the configuration
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("moodflow=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let client = WeatherApiClient::new(&config.weather, &config.network)?;
    let clock = SystemClock;

    match args.command {
        Command::Forecast {
            city,
            model,
            seed,
            json,
        } => run_forecast(&rt, &client, &clock, &config, &city, model, seed, json),
        Command::Baseline {
            city,
            history,
            json,
        } => run_baseline(&rt, &client, &clock, &config, &city, history, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_forecast(
    rt: &tokio::runtime::Runtime,
    client: &WeatherApiClient,
    clock: &dyn Clock,
    config: &AppConfig,
    city: &str,
    model: ModelSelection,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut training = config.training.clone();
    if seed.is_some() {
        training.seed = seed;
    }

    let mut state = PredictionState::new();
    let token = state.begin(city)?;

    let result = rt
        .block_on(client.fetch_city_forecast(city))
        .map_err(anyhow::Error::from)
        .and_then(|forecast| {
            tracing::info!("Forecast received for {}", forecast.city_label);
            let mut rng = rng_from_seed(training.seed);
            let bundle = forecast_mood(&forecast.days, clock, &mut rng, &training)?;
            Ok(CityPrediction {
                city_label: forecast.city_label,
                bundle,
            })
        });

    state.complete(token, result, clock.now_utc());
    if state.status == PredictionStatus::Error {
        anyhow::bail!(
            "Prediction failed: {}",
            state.error.as_deref().unwrap_or("unknown error")
        );
    }

    if !state.select_model(model) {
        tracing::warn!("Model '{}' is unavailable, showing the best model", model);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let title = match (state.bundle(), state.selected_model) {
        (Some(bundle), ModelSelection::Best) => bundle.best_model_name,
        (Some(_), ModelSelection::Model(kind)) => kind.display_name(),
        (None, _) => "",
    };
    let test_r2 = state.model_metrics.map_or(f64::NAN, |m| m.test_r2());
    println!(
        "Mood forecast for {} ({}, test R² {:.3})",
        state.city_label.as_deref().unwrap_or(city),
        title,
        test_r2
    );
    print_points(state.chart.as_deref().unwrap_or_default());
    print_reasons(&state.reasons);

    Ok(())
}

fn run_baseline(
    rt: &tokio::runtime::Runtime,
    client: &WeatherApiClient,
    clock: &dyn Clock,
    config: &AppConfig,
    city: &str,
    history: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let history = match history.or_else(|| config.history.path.clone()) {
        Some(path) => MoodHistory::load(&path)?,
        None => {
            tracing::info!("No mood history configured, using a neutral baseline");
            MoodHistory::new()
        }
    };

    let forecast = rt.block_on(client.fetch_city_forecast(city))?;
    let result: HeuristicForecast = heuristic_forecast(
        &history,
        &forecast.days,
        clock.today(),
        &config.history.baseline_options(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "Baseline forecast for {} (baseline {:.2}/5)",
        forecast.city_label, result.baseline
    );
    print_points(&result.points);
    print_reasons(&result.reasons);

    Ok(())
}

fn print_points(points: &[PredictionPoint]) {
    for point in points {
        println!(
            "  {:<10} {} {:<16} {:>5.1}°C  {:.2} {} {}",
            point.label,
            point.weather.icon,
            point.weather.label,
            point.temp,
            point.mood,
            point.mood_level.emoji(),
            point.mood_level.label()
        );
    }
}

fn print_reasons(reasons: &[String]) {
    if reasons.is_empty() {
        return;
    }
    println!("Why:");
    for reason in reasons {
        println!("  - {}", reason);
    }
}
