use chrono::{Duration, NaiveDate};

use crate::models::{FetchInterval, PricePoint};

/// How to fetch and thin a history for a given horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    pub interval: FetchInterval,
    /// Keep every `stride`-th point after fetching (1 = keep all).
    pub stride: usize,
}

/// Pick fetch granularity and post-fetch thinning for a horizon in months.
///
/// Long horizons fetch weekly bars outright; mid horizons fetch daily and
/// keep every 2nd point; short horizons keep everything. Chart payloads stay
/// in the low hundreds of points across the whole 1..=120 range.
pub fn plan_for_horizon(months: u32) -> SamplingPlan {
    if months >= 60 {
        // 5+ years - weekly bars are already sparse enough
        SamplingPlan { interval: FetchInterval::Weekly, stride: 1 }
    } else if months >= 36 {
        // 3+ years - weekly bars
        SamplingPlan { interval: FetchInterval::Weekly, stride: 1 }
    } else if months >= 12 {
        // 1+ year - daily bars, every 2nd point
        SamplingPlan { interval: FetchInterval::Daily, stride: 2 }
    } else if months >= 6 {
        // 6+ months - daily bars, every 2nd point
        SamplingPlan { interval: FetchInterval::Daily, stride: 2 }
    } else {
        // under 6 months - full daily resolution
        SamplingPlan { interval: FetchInterval::Daily, stride: 1 }
    }
}

/// Keep every `stride`-th point, starting from the first.
///
/// Deterministic: same input and stride always select the same dates, so
/// cached and fresh fetches thin identically.
pub fn decimate(points: &[PricePoint], stride: usize) -> Vec<PricePoint> {
    if stride <= 1 {
        return points.to_vec();
    }
    points.iter().copied().step_by(stride).collect()
}

/// Fetch window for a horizon: `months` of 30-day months back from `end`,
/// plus a 30-day buffer for weekends and market holidays.
pub fn history_window(months: u32, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = end - Duration::days(months as i64 * 30 + 30);
    (start, end)
}
