//! Abstractions for time and randomness to enable testing.
//!
//! This module provides:
//! - `Clock`: abstracting time access for deterministic forecasts
//! - `seeded_rng`/`entropy_rng`: the random source used for corpus synthesis

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
///
/// Forecast offsets and the training window are both anchored on
/// [`Clock::today`], so injecting a mock clock pins them in tests.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Get the current time in the local timezone.
    fn now_local(&self) -> DateTime<Local>;

    /// The calendar date forecasts and corpora are anchored on.
    fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    utc_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock set to the given UTC time.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            utc_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.utc_time.lock().unwrap() = time;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.utc_time.lock().unwrap();
        *time = *time + duration;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.utc_time.lock().unwrap()
    }

    fn now_local(&self) -> DateTime<Local> {
        self.now_utc().with_timezone(&Local)
    }

    // UTC date, so tests do not depend on the host timezone.
    fn today(&self) -> NaiveDate {
        self.now_utc().date_naive()
    }
}

// ==================== Random Source ====================

/// Random generator used for corpus synthesis.
pub type CorpusRng = Xoshiro256Plus;

/// Deterministic generator for reproducible corpora.
pub fn seeded_rng(seed: u64) -> CorpusRng {
    Xoshiro256Plus::seed_from_u64(seed)
}

/// Generator seeded from system entropy, used when no seed is configured.
pub fn entropy_rng() -> CorpusRng {
    Xoshiro256Plus::from_entropy()
}

/// Seeded generator when `seed` is set, entropy otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> CorpusRng {
    match seed {
        Some(seed) => seeded_rng(seed),
        None => entropy_rng(),
    }
}
