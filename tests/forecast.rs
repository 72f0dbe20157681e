//! End-to-end tests of the forecasting pipeline.
//!
//! A mocked clock and a seeded corpus make every run deterministic.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use moodflow::{
    CityPrediction, Clock, MlConfig, MockClock, ModelKind, ModelSelection, MoodCategory,
    PredictionState, PredictionStatus, WeatherForecastDay, forecast_mood,
    ml::corpus::{generate_corpus, mean_mood},
    traits::seeded_rng,
};

const SEED: u64 = 20240715;

fn july_clock() -> MockClock {
    MockClock::new(Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap())
}

fn week(start: NaiveDate, code: i32, temp_max: f64) -> Vec<WeatherForecastDay> {
    (0..7)
        .map(|i| WeatherForecastDay {
            date: start + Duration::days(i),
            weather_code: code,
            temp_max,
            temp_min: temp_max - 8.0,
        })
        .collect()
}

/// A sunny, mild week scores above the average synthetic day.
#[test]
fn test_clear_week_beats_corpus_mean() {
    let clock = july_clock();
    let config = MlConfig::default();
    let forecast = week(clock.today(), 0, 20.0);

    let bundle = forecast_mood(&forecast, &clock, &mut seeded_rng(SEED), &config).unwrap();

    // Same seed, same corpus
    let corpus = generate_corpus(clock.today(), config.corpus_days, &mut seeded_rng(SEED));
    let corpus_mean = mean_mood(&corpus).unwrap();

    assert_eq!(bundle.points.len(), 7);
    for point in &bundle.points {
        assert!(
            point.mood > corpus_mean,
            "{} predicted {} below corpus mean {}",
            point.label,
            point.mood,
            corpus_mean
        );
    }
}

/// Stormy cold weather scores below sunny mild weather.
#[test]
fn test_storm_week_scores_below_clear_week() {
    let clock = july_clock();
    let config = MlConfig::default();

    let clear = forecast_mood(
        &week(clock.today(), 0, 20.0),
        &clock,
        &mut seeded_rng(SEED),
        &config,
    )
    .unwrap();
    let storm = forecast_mood(
        &week(clock.today(), 95, 20.0),
        &clock,
        &mut seeded_rng(SEED),
        &config,
    )
    .unwrap();

    assert!(storm.weekly_average < clear.weekly_average);
}

/// Every point of every model stays on the mood scale.
#[test]
fn test_all_points_within_scale() {
    let clock = july_clock();
    let forecast: Vec<_> = [0, 3, 45, 61, 66, 71, 99]
        .iter()
        .enumerate()
        .map(|(i, &code)| WeatherForecastDay {
            date: clock.today() + Duration::days(i as i64),
            weather_code: code,
            temp_max: -10.0 + 8.0 * i as f64,
            temp_min: -15.0 + 8.0 * i as f64,
        })
        .collect();

    let bundle =
        forecast_mood(&forecast, &clock, &mut seeded_rng(1), &MlConfig::default()).unwrap();

    assert_eq!(bundle.all_models.len(), ModelKind::ALL.len());
    for model in &bundle.all_models {
        assert_eq!(model.points.len(), 7);
        for point in &model.points {
            assert!((1.0..=5.0).contains(&point.mood));
        }
    }
    assert!(matches!(
        bundle.baseline,
        MoodCategory::Low | MoodCategory::Neutral | MoodCategory::High
    ));
}

/// The session applies a forecast and switches models without retraining.
#[test]
fn test_session_flow() {
    let clock = july_clock();
    let bundle = forecast_mood(
        &week(clock.today(), 1, 22.0),
        &clock,
        &mut seeded_rng(SEED),
        &MlConfig::default(),
    )
    .unwrap();
    let best = bundle.best_model;

    let mut state = PredictionState::new();
    let token = state.begin("Paris").unwrap();
    let result: Result<CityPrediction, String> = Ok(CityPrediction {
        city_label: "Paris, France".to_string(),
        bundle,
    });
    assert!(state.complete(token, result, clock.now_utc()));
    assert_eq!(state.status, PredictionStatus::Success);

    let other = ModelKind::ALL
        .into_iter()
        .find(|kind| *kind != best)
        .unwrap();
    assert!(state.select_model(ModelSelection::Model(other)));

    let expected = state.bundle().unwrap().model(other).unwrap().points.clone();
    assert_eq!(state.chart.as_ref().unwrap(), &expected);

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["chart"].as_array().unwrap().len(), 7);
}
