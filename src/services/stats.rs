use crate::models::PerformanceStats;

/// Approximate trading days per year, used for annualization.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Compute return and risk statistics for a normalized value series.
///
/// `values` is the composite (or benchmark) series, normalized to start at
/// 100. `benchmark` enables beta, alpha and correlation when it has the same
/// length. `risk_free_rate` is annual and fractional (0.02 for 2%).
///
/// Returns `None` when the series is too short to say anything (fewer than
/// two points). Undefined benchmark-relative metrics come back as `None`
/// fields rather than NaN.
pub fn performance_stats(
    values: &[f64],
    benchmark: Option<&[f64]>,
    risk_free_rate: f64,
) -> Option<PerformanceStats> {
    if values.len() < 2 {
        return None;
    }
    // Guard the whole computation at the boundary: a NaN or a non-positive
    // start would otherwise poison every figure downstream
    if values.iter().any(|v| !v.is_finite()) || values[0] <= 0.0 {
        return None;
    }

    let returns = daily_returns(values);

    let first = values[0];
    let last = values[values.len() - 1];
    let total_return = (last / first - 1.0) * 100.0;

    // Geometric annualization over the observed span
    let years = values.len() as f64 / TRADING_DAYS_PER_YEAR;
    let annualized_return = ((last / first).powf(1.0 / years) - 1.0) * 100.0;

    let volatility = population_std(&returns) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

    let max_drawdown = compute_max_drawdown(values);

    let rf_pct = risk_free_rate * 100.0;
    let sharpe_ratio = if volatility > 0.0 {
        (annualized_return - rf_pct) / volatility
    } else {
        0.0
    };

    let sortino_ratio = compute_sortino(&returns, annualized_return, rf_pct, sharpe_ratio);

    let (beta, alpha, correlation) = match benchmark {
        Some(bench) if bench.len() == values.len() => {
            benchmark_relative(&returns, bench, annualized_return, rf_pct, years)
        }
        _ => (None, None, None),
    };

    Some(PerformanceStats {
        total_return: round2(total_return),
        annualized_return: round2(annualized_return),
        volatility: round2(volatility),
        max_drawdown: round2(max_drawdown),
        sharpe_ratio: round3(sharpe_ratio),
        sortino_ratio: round3(sortino_ratio),
        beta: beta.map(round3),
        alpha: alpha.map(round2),
        correlation: correlation.map(round3),
    })
}

/// Simple daily returns: r_i = p_i / p_{i-1} - 1.
fn daily_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Population standard deviation (ddof = 0).
///
/// The population form also makes a single downside observation yield a
/// zero deviation instead of dividing by n - 1 = 0.
fn population_std(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    variance.sqrt()
}

/// Maximum peak-to-trough decline as a negative percentage (0 if the series
/// never falls below a previous peak).
fn compute_max_drawdown(values: &[f64]) -> f64 {
    let mut peak = values[0];
    let mut max_dd = 0.0;
    for &value in values {
        if value > peak {
            peak = value;
        }
        let dd = (value - peak) / peak * 100.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Sortino ratio from downside deviation; equals the Sharpe ratio when the
/// series has no negative returns at all.
fn compute_sortino(returns: &[f64], annualized_return: f64, rf_pct: f64, sharpe: f64) -> f64 {
    let negative: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if negative.is_empty() {
        return sharpe;
    }

    let downside_deviation = population_std(&negative) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
    if downside_deviation > 0.0 {
        (annualized_return - rf_pct) / downside_deviation
    } else {
        0.0
    }
}

/// Beta, Jensen's alpha and Pearson correlation against a benchmark series
/// of equal length. All three come back `None` when the benchmark carries
/// no variance (or the window is a single return pair).
fn benchmark_relative(
    returns: &[f64],
    benchmark_values: &[f64],
    annualized_return: f64,
    rf_pct: f64,
    years: f64,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    let bench_returns = daily_returns(benchmark_values);
    if bench_returns.len() != returns.len() || bench_returns.len() < 2 {
        return (None, None, None);
    }

    let mean_r = returns.iter().sum::<f64>() / returns.len() as f64;
    let mean_b = bench_returns.iter().sum::<f64>() / bench_returns.len() as f64;

    let mut cov = 0.0;
    let mut var_r = 0.0;
    let mut var_b = 0.0;
    for (r, b) in returns.iter().zip(bench_returns.iter()) {
        cov += (r - mean_r) * (b - mean_b);
        var_r += (r - mean_r).powi(2);
        var_b += (b - mean_b).powi(2);
    }

    if var_b.abs() < f64::EPSILON {
        return (None, None, None);
    }

    let beta = cov / var_b;

    let first = benchmark_values[0];
    let last = benchmark_values[benchmark_values.len() - 1];
    let bench_annualized = ((last / first).powf(1.0 / years) - 1.0) * 100.0;
    let alpha = annualized_return - (rf_pct + beta * (bench_annualized - rf_pct));

    let correlation = if var_r.abs() < f64::EPSILON {
        None
    } else {
        Some(cov / (var_r.sqrt() * var_b.sqrt()))
    };

    (Some(beta), Some(alpha), correlation)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_too_short_series_yields_none() {
        assert!(performance_stats(&[100.0], None, 0.02).is_none());
        assert!(performance_stats(&[], None, 0.02).is_none());
    }

    #[test]
    fn test_degenerate_input_yields_none() {
        assert!(performance_stats(&[100.0, f64::NAN, 102.0], None, 0.02).is_none());
        assert!(performance_stats(&[100.0, f64::INFINITY], None, 0.02).is_none());
        assert!(performance_stats(&[0.0, 101.0, 102.0], None, 0.02).is_none());
        assert!(performance_stats(&[-5.0, 101.0], None, 0.02).is_none());
    }

    #[test]
    fn test_flat_series_has_zero_risk_and_zero_ratios() {
        let values = vec![100.0; 30];
        let stats = performance_stats(&values, None, 0.02).unwrap();

        assert_close(stats.total_return, 0.0);
        assert_close(stats.annualized_return, 0.0);
        assert_close(stats.volatility, 0.0);
        assert_close(stats.max_drawdown, 0.0);
        // Zero volatility pins both ratios at 0 rather than dividing
        assert_close(stats.sharpe_ratio, 0.0);
        assert_close(stats.sortino_ratio, 0.0);
    }

    #[test]
    fn test_total_return_from_endpoints() {
        let values = vec![100.0, 104.0, 103.0, 112.0];
        let stats = performance_stats(&values, None, 0.02).unwrap();
        assert_close(stats.total_return, 12.0);
    }

    #[test]
    fn test_max_drawdown_is_peak_to_trough() {
        let values = vec![100.0, 110.0, 99.0, 105.0];
        let stats = performance_stats(&values, None, 0.02).unwrap();
        // Fell from 110 to 99: exactly -10%
        assert_close(stats.max_drawdown, -10.0);
    }

    #[test]
    fn test_max_drawdown_never_positive() {
        let values = vec![100.0, 101.0, 103.0, 110.0];
        let stats = performance_stats(&values, None, 0.02).unwrap();
        assert_close(stats.max_drawdown, 0.0);
    }

    #[test]
    fn test_sortino_equals_sharpe_without_negative_returns() {
        let values = vec![100.0, 101.0, 102.5, 104.0, 106.0];
        let stats = performance_stats(&values, None, 0.02).unwrap();
        assert_close(stats.sortino_ratio, stats.sharpe_ratio);
    }

    #[test]
    fn test_beta_of_identical_series_is_one() {
        let values = vec![100.0, 102.0, 101.0, 104.0, 103.0, 107.0];
        let stats = performance_stats(&values, Some(&values), 0.02).unwrap();

        assert_eq!(stats.beta, Some(1.0));
        assert_eq!(stats.correlation, Some(1.0));
        // Beta 1 against itself leaves no excess return
        assert_eq!(stats.alpha, Some(0.0));
    }

    #[test]
    fn test_flat_benchmark_yields_no_relative_metrics() {
        let values = vec![100.0, 102.0, 101.0, 104.0];
        let bench = vec![100.0; 4];
        let stats = performance_stats(&values, Some(&bench), 0.02).unwrap();

        assert_eq!(stats.beta, None);
        assert_eq!(stats.alpha, None);
        assert_eq!(stats.correlation, None);
    }

    #[test]
    fn test_benchmark_length_mismatch_skips_relative_metrics() {
        let values = vec![100.0, 102.0, 101.0, 104.0];
        let bench = vec![100.0, 101.0, 102.0];
        let stats = performance_stats(&values, Some(&bench), 0.02).unwrap();

        assert_eq!(stats.beta, None);
        assert_eq!(stats.alpha, None);
        assert_eq!(stats.correlation, None);
    }

    #[test]
    fn test_single_return_pair_is_not_enough_for_beta() {
        let values = vec![100.0, 102.0];
        let bench = vec![100.0, 101.0];
        let stats = performance_stats(&values, Some(&bench), 0.02).unwrap();
        assert_eq!(stats.beta, None);
    }

    #[test]
    fn test_doubled_benchmark_moves_beta_towards_two() {
        // Portfolio returns are exactly twice the benchmark's
        let bench = vec![100.0, 101.0, 100.0, 102.0, 101.0];
        let values: Vec<f64> = {
            let mut v = vec![100.0];
            for w in bench.windows(2) {
                let r = w[1] / w[0] - 1.0;
                let last = *v.last().unwrap();
                v.push(last * (1.0 + 2.0 * r));
            }
            v
        };

        let stats = performance_stats(&values, Some(&bench), 0.02).unwrap();
        assert_eq!(stats.beta, Some(2.0));
    }

    #[test]
    fn test_volatility_uses_population_deviation() {
        // Returns are +1% and -1%: population std is exactly 0.01
        let values = vec![100.0, 101.0, 99.99];
        let stats = performance_stats(&values, None, 0.0).unwrap();

        let expected = 0.01 * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
        assert_close(stats.volatility, round2(expected));
    }

    #[test]
    fn test_annualized_return_compounds_geometrically() {
        // 252 points spanning one year, ending 10% up
        let n = 252;
        let values: Vec<f64> = (0..n)
            .map(|i| 100.0 * (1.1_f64).powf(i as f64 / (n - 1) as f64))
            .collect();

        let stats = performance_stats(&values, None, 0.0).unwrap();
        assert_close(stats.total_return, 10.0);
        assert_close(stats.annualized_return, 10.0);
    }
}
