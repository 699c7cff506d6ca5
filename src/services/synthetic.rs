use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::warn;

/// Drift and daily volatility of the stand-in composite walk (~13% annual
/// return, ~24% annualized vol - an equity-like shape).
const COMPOSITE_DRIFT: f64 = 0.0005;
const COMPOSITE_VOL: f64 = 0.015;

/// The stand-in benchmark walks more conservatively than the composite.
const BENCHMARK_DRIFT: f64 = 0.0003;
const BENCHMARK_VOL: f64 = 0.012;

/// Generate a stand-in composite series when market data is unusable.
///
/// Business days (Mon-Fri) from `months * 30` days back up to `end`, walked
/// geometrically from 100 with normally distributed daily returns, rounded
/// to cents. Uses the thread-local RNG; see [`composite_walk_with`] for the
/// seedable variant.
pub fn composite_walk(months: u32, end: NaiveDate) -> (Vec<NaiveDate>, Vec<f64>) {
    warn!("Generating synthetic composite series for {} months", months);
    composite_walk_with(&mut rand::rng(), months, end)
}

pub fn composite_walk_with<R: Rng>(
    rng: &mut R,
    months: u32,
    end: NaiveDate,
) -> (Vec<NaiveDate>, Vec<f64>) {
    let normal =
        Normal::new(COMPOSITE_DRIFT, COMPOSITE_VOL).expect("valid distribution parameters");
    let start = end - Duration::days(months as i64 * 30);

    let mut dates = Vec::new();
    let mut values = Vec::new();
    let mut current_value = 100.0;

    let mut current_date = start;
    while current_date <= end {
        if current_date.weekday().num_days_from_monday() < 5 {
            dates.push(current_date);
            let daily_return: f64 = normal.sample(rng);
            current_value *= 1.0 + daily_return;
            values.push(round2(current_value));
        }
        current_date += Duration::days(1);
    }

    (dates, values)
}

/// Generate a stand-in benchmark series of exactly `num_points` values,
/// for pairing with an already-built composite axis.
pub fn benchmark_walk(num_points: usize) -> Vec<f64> {
    warn!("Generating synthetic benchmark series ({} points)", num_points);
    benchmark_walk_with(&mut rand::rng(), num_points)
}

pub fn benchmark_walk_with<R: Rng>(rng: &mut R, num_points: usize) -> Vec<f64> {
    let normal =
        Normal::new(BENCHMARK_DRIFT, BENCHMARK_VOL).expect("valid distribution parameters");

    let mut values = Vec::with_capacity(num_points);
    let mut current_value = 100.0;

    for _ in 0..num_points {
        let daily_return: f64 = normal.sample(rng);
        current_value *= 1.0 + daily_return;
        values.push(round2(current_value));
    }

    values
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
