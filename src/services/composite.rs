use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::warn;

use crate::models::PricePoint;

/// Minimum number of shared dates across holdings for a composite to be
/// meaningful; anything thinner and the pipeline switches to synthetic data.
pub const MIN_OVERLAP_DATES: usize = 10;

/// Trading days per month used when clipping a series to its horizon.
const TRADING_DAYS_PER_MONTH: usize = 21;

/// Result of composite aggregation: a normalized series, or an explicit
/// account of why the inputs could not support one.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeOutcome {
    Series {
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    },
    /// Fewer than `MIN_OVERLAP_DATES` dates were common to all holdings
    /// with data (`common_dates` says how many there were).
    Insufficient { common_dates: usize },
}

/// Build the weighted composite series for a set of holdings.
///
/// `weights` carries `(ticker, weight_percent)` pairs; tickers missing from
/// `histories` contribute nothing and their weight is renormalized away.
/// The composite is computed over the intersection of all date axes,
/// clipped to the most recent `months * 21` points, and normalized so the
/// first value is 100.00.
pub fn build_composite(
    histories: &HashMap<String, Vec<PricePoint>>,
    weights: &[(String, f64)],
    months: u32,
) -> CompositeOutcome {
    // Index each ticker's series by date and intersect the axes
    let mut by_ticker: HashMap<&str, BTreeMap<NaiveDate, f64>> = HashMap::new();
    let mut common: Option<BTreeSet<NaiveDate>> = None;

    for (ticker, _) in weights {
        let Some(points) = histories.get(ticker) else {
            warn!("No data available for ticker {}, skipping", ticker);
            continue;
        };
        if points.is_empty() {
            continue;
        }

        let series: BTreeMap<NaiveDate, f64> =
            points.iter().map(|p| (p.date, p.close)).collect();
        let dates: BTreeSet<NaiveDate> = series.keys().copied().collect();

        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
        by_ticker.insert(ticker.as_str(), series);
    }

    let common_dates = common.as_ref().map(|d| d.len()).unwrap_or(0);
    if by_ticker.is_empty() || common_dates < MIN_OVERLAP_DATES {
        warn!(
            "Insufficient common date range for composite ({} common dates)",
            common_dates
        );
        return CompositeOutcome::Insufficient { common_dates };
    }

    // Clip to the requested horizon, keeping the most recent points
    let all_dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();
    let target_days = (months as usize * TRADING_DAYS_PER_MONTH).min(all_dates.len());
    let dates: Vec<NaiveDate> = all_dates[all_dates.len() - target_days..].to_vec();

    // Weighted value per date, renormalized by the weight actually present
    let mut portfolio_values = Vec::with_capacity(dates.len());
    for date in &dates {
        let mut portfolio_value = 0.0;
        let mut total_weight = 0.0;

        for (ticker, weight) in weights {
            if let Some(price) = by_ticker.get(ticker.as_str()).and_then(|s| s.get(date)) {
                portfolio_value += price * weight;
                total_weight += weight;
            }
        }

        if total_weight > 0.0 {
            portfolio_value /= total_weight;
        }
        portfolio_values.push(portfolio_value);
    }

    // Normalize to start at 100
    let start_value = portfolio_values[0];
    if start_value <= f64::EPSILON {
        warn!("Composite start value is zero, cannot normalize");
        return CompositeOutcome::Insufficient { common_dates };
    }

    let values: Vec<f64> = portfolio_values
        .iter()
        .map(|val| round2(val / start_value * 100.0))
        .collect();

    CompositeOutcome::Series { dates, values }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Linear series from `first` to `last` over `n` consecutive days.
    fn linear_series(first: f64, last: f64, n: usize) -> Vec<PricePoint> {
        (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64;
                PricePoint::new(
                    d("2024-03-01") + Duration::days(i as i64),
                    first + (last - first) * t,
                )
            })
            .collect()
    }

    fn weights(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn test_sixty_forty_composite_lands_at_102() {
        let mut histories = HashMap::new();
        histories.insert("UP".to_string(), linear_series(100.0, 110.0, 10));
        histories.insert("DOWN".to_string(), linear_series(100.0, 90.0, 10));

        let outcome = build_composite(&histories, &weights(&[("UP", 60.0), ("DOWN", 40.0)]), 12);

        let CompositeOutcome::Series { dates, values } = outcome else {
            panic!("expected a series");
        };
        assert_eq!(dates.len(), 10);
        assert_eq!(values[0], 100.0);
        // 0.6 * 110 + 0.4 * 90 = 102
        assert_eq!(values[9], 102.0);
    }

    #[test]
    fn test_thin_overlap_is_reported_not_computed() {
        let mut histories = HashMap::new();
        histories.insert("A".to_string(), linear_series(100.0, 105.0, 9));
        histories.insert("B".to_string(), linear_series(100.0, 95.0, 9));

        let outcome = build_composite(&histories, &weights(&[("A", 50.0), ("B", 50.0)]), 12);

        assert_eq!(outcome, CompositeOutcome::Insufficient { common_dates: 9 });
    }

    #[test]
    fn test_disjoint_axes_have_no_overlap() {
        let mut histories = HashMap::new();
        histories.insert("A".to_string(), linear_series(100.0, 105.0, 12));
        let mut shifted = linear_series(100.0, 95.0, 12);
        for p in &mut shifted {
            p.date += Duration::days(365);
        }
        histories.insert("B".to_string(), shifted);

        let outcome = build_composite(&histories, &weights(&[("A", 50.0), ("B", 50.0)]), 12);

        assert_eq!(outcome, CompositeOutcome::Insufficient { common_dates: 0 });
    }

    #[test]
    fn test_missing_ticker_weight_is_renormalized_away() {
        let mut histories = HashMap::new();
        histories.insert("UP".to_string(), linear_series(100.0, 110.0, 10));
        histories.insert("DOWN".to_string(), linear_series(100.0, 90.0, 10));
        // GONE never fetched; UP/DOWN keep their 60/40 proportion

        let outcome = build_composite(
            &histories,
            &weights(&[("UP", 30.0), ("DOWN", 20.0), ("GONE", 50.0)]),
            12,
        );

        let CompositeOutcome::Series { values, .. } = outcome else {
            panic!("expected a series");
        };
        assert_eq!(values[9], 102.0);
    }

    #[test]
    fn test_series_clipped_to_recent_trading_days() {
        let mut histories = HashMap::new();
        histories.insert("A".to_string(), linear_series(100.0, 130.0, 60));

        let outcome = build_composite(&histories, &weights(&[("A", 100.0)]), 1);

        let CompositeOutcome::Series { dates, values } = outcome else {
            panic!("expected a series");
        };
        // 1 month keeps the 21 most recent of 60 points
        assert_eq!(dates.len(), 21);
        assert_eq!(values[0], 100.0);
        assert_eq!(*dates.last().unwrap(), d("2024-03-01") + Duration::days(59));
    }

    #[test]
    fn test_no_histories_at_all() {
        let histories = HashMap::new();
        let outcome = build_composite(&histories, &weights(&[("A", 100.0)]), 12);
        assert_eq!(outcome, CompositeOutcome::Insufficient { common_dates: 0 });
    }
}
