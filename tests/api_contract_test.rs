/// API Contract Tests
///
/// Tests for the request/response structures and endpoint rules:
/// - Holdings payloads (POST /performance-data, PUT /update-holdings)
/// - Flattened performance response shape
/// - Optional statistics fields dropping out of the JSON when absent
/// - Fund overlap analysis rules (GET /fund-overlap)
/// - Error status mapping
///
/// NOTE: These tests validate the wire contracts with local mirrors of the
/// API types; the route and service modules carry their own unit tests.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Holdings Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Holding {
    ticker: String,
    security_name: String,
    country: String,
    sector: String,
    market_cap: String,
    relevance: String,
    selection_rationale: String,
    weight: f64,
}

#[cfg(test)]
mod holdings_payload {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[{
            "ticker": "AAPL",
            "security_name": "Apple Inc.",
            "country": "US",
            "sector": "Technology",
            "market_cap": "Large Cap",
            "relevance": "High",
            "selection_rationale": "Core smartphone exposure",
            "weight": 60.0
        }, {
            "ticker": "MSFT",
            "security_name": "Microsoft Corporation",
            "country": "US",
            "sector": "Technology",
            "market_cap": "Large Cap",
            "relevance": "High",
            "selection_rationale": "Cloud and enterprise software",
            "weight": 40.0
        }]"#
    }

    #[test]
    fn test_holdings_arrive_as_a_bare_array() {
        let holdings: Vec<Holding> = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].ticker, "AAPL");
        assert_eq!(holdings[1].weight, 40.0);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"[{"ticker": "AAPL", "weight": 100.0}]"#;
        assert!(serde_json::from_str::<Vec<Holding>>(json).is_err());
    }

    #[test]
    fn test_integer_weights_parse_as_floats() {
        let json = sample_json().replace("60.0", "60");
        let holdings: Vec<Holding> = serde_json::from_str(&json).unwrap();
        assert_eq!(holdings[0].weight, 60.0);
    }

    #[test]
    fn test_holdings_round_trip() {
        let holdings: Vec<Holding> = serde_json::from_str(sample_json()).unwrap();
        let value = serde_json::to_value(&holdings).unwrap();
        assert_eq!(value[0]["security_name"], "Apple Inc.");
        assert_eq!(value[1]["ticker"], "MSFT");
    }
}

// ---------------------------------------------------------------------------
// Flattened Performance Response
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PerformanceData {
    dates: Vec<String>,
    index_values: Vec<f64>,
    benchmark_values: Vec<f64>,
    benchmark_name: String,
    benchmark_ticker: String,
}

#[derive(Debug, Serialize)]
struct PerformanceStats {
    total_return: f64,
    annualized_return: f64,
    volatility: f64,
    max_drawdown: f64,
    sharpe_ratio: f64,
    sortino_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PerformanceResponse {
    #[serde(flatten)]
    performance_data: PerformanceData,
    stats: PerformanceStats,
}

#[cfg(test)]
mod response_shape {
    use super::*;

    fn sample_response(beta: Option<f64>) -> PerformanceResponse {
        PerformanceResponse {
            performance_data: PerformanceData {
                dates: vec!["2024-01-02".into(), "2024-01-03".into()],
                index_values: vec![100.0, 101.2],
                benchmark_values: vec![100.0, 100.8],
                benchmark_name: "S&P 500".into(),
                benchmark_ticker: "^GSPC".into(),
            },
            stats: PerformanceStats {
                total_return: 1.2,
                annualized_return: 16.4,
                volatility: 14.1,
                max_drawdown: -2.3,
                sharpe_ratio: 1.02,
                sortino_ratio: 1.31,
                beta,
                alpha: beta.map(|_| 0.4),
                correlation: beta.map(|_| 0.92),
            },
        }
    }

    #[test]
    fn test_series_fields_sit_at_the_top_level() {
        let value = serde_json::to_value(sample_response(Some(1.05))).unwrap();

        // Flattened: no "performance_data" wrapper object
        assert!(value.get("performance_data").is_none());
        assert!(value.get("dates").is_some());
        assert!(value.get("index_values").is_some());
        assert!(value.get("benchmark_values").is_some());
        assert_eq!(value["benchmark_ticker"], "^GSPC");
    }

    #[test]
    fn test_stats_stay_in_their_own_block() {
        let value = serde_json::to_value(sample_response(Some(1.05))).unwrap();
        assert_eq!(value["stats"]["total_return"], 1.2);
        assert_eq!(value["stats"]["beta"], 1.05);
    }

    #[test]
    fn test_absent_relative_metrics_drop_out_of_the_json() {
        let value = serde_json::to_value(sample_response(None)).unwrap();
        let stats = value["stats"].as_object().unwrap();

        assert!(!stats.contains_key("beta"));
        assert!(!stats.contains_key("alpha"));
        assert!(!stats.contains_key("correlation"));
        // Core figures always present
        assert!(stats.contains_key("sharpe_ratio"));
    }

    #[test]
    fn test_series_lengths_agree() {
        let response = sample_response(None);
        assert_eq!(
            response.performance_data.index_values.len(),
            response.performance_data.benchmark_values.len()
        );
        assert_eq!(
            response.performance_data.dates.len(),
            response.performance_data.index_values.len()
        );
    }
}

// ---------------------------------------------------------------------------
// Score Card Shape
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Score {
    score: u8,
    max_score: u8,
    description: String,
}

#[cfg(test)]
mod score_card {
    use super::*;

    #[test]
    fn test_scores_serialize_with_max_and_description() {
        let score = Score {
            score: 8,
            max_score: 10,
            description: "Quality and fundamentals of underlying assets".into(),
        };
        let value = serde_json::to_value(&score).unwrap();

        assert_eq!(value["score"], 8);
        assert_eq!(value["max_score"], 10);
        assert!(value["description"].as_str().unwrap().len() > 10);
    }

    #[test]
    fn test_score_bands_per_dimension() {
        // Placeholder bands until scores derive from the computed stats
        let bands = [
            ("asset", 7u8, 9u8),
            ("returns", 6, 8),
            ("stability", 7, 9),
            ("diversification", 5, 7),
        ];
        for (name, low, high) in bands {
            assert!(low < high, "{} band is inverted", name);
            assert!(high <= 10, "{} band exceeds the max score", name);
        }
    }
}

// ---------------------------------------------------------------------------
// Fund Overlap Rules
// ---------------------------------------------------------------------------

#[cfg(test)]
mod fund_overlap_rules {
    use std::collections::HashMap;

    struct FundHolding {
        company: &'static str,
        percentage_to_nav: f64,
        holding_type: &'static str,
        is_derivative: bool,
    }

    /// Total exposure of one fund to the mapped companies: equity rows only,
    /// derivatives never, each row matches at most once.
    fn fund_exposure(holdings: &[FundHolding], companies: &[&str]) -> f64 {
        let mut total = 0.0;
        for holding in holdings {
            if holding.holding_type.trim().to_lowercase() != "equity" || holding.is_derivative {
                continue;
            }
            if companies.iter().any(|c| *c == holding.company.trim()) {
                total += holding.percentage_to_nav;
            }
        }
        (total * 100.0).round() / 100.0
    }

    fn equity(company: &'static str, pct: f64) -> FundHolding {
        FundHolding {
            company,
            percentage_to_nav: pct,
            holding_type: "Equity",
            is_derivative: false,
        }
    }

    #[test]
    fn test_exposure_sums_matching_equity_rows() {
        let holdings = vec![
            equity("HDFC Bank Limited", 9.5),
            equity("Reliance Industries Limited", 6.2),
            equity("Some Other Company", 4.0),
        ];
        let exposure = fund_exposure(
            &holdings,
            &["HDFC Bank Limited", "Reliance Industries Limited"],
        );
        assert_eq!(exposure, 15.7);
    }

    #[test]
    fn test_non_equity_rows_never_count() {
        let holdings = vec![FundHolding {
            company: "Government of India",
            percentage_to_nav: 80.0,
            holding_type: "Sovereign",
            is_derivative: false,
        }];
        assert_eq!(fund_exposure(&holdings, &["Government of India"]), 0.0);
    }

    #[test]
    fn test_derivative_rows_never_count() {
        let holdings = vec![FundHolding {
            company: "HDFC Bank Limited",
            percentage_to_nav: -4.2,
            holding_type: "Equity",
            is_derivative: true,
        }];
        assert_eq!(fund_exposure(&holdings, &["HDFC Bank Limited"]), 0.0);
    }

    #[test]
    fn test_holding_type_match_is_case_insensitive() {
        let holdings = vec![FundHolding {
            company: "Infosys Limited",
            percentage_to_nav: 5.5,
            holding_type: " equity ",
            is_derivative: false,
        }];
        assert_eq!(fund_exposure(&holdings, &["Infosys Limited"]), 5.5);
    }

    #[test]
    fn test_funds_below_the_exposure_floor_are_dropped() {
        let exposures = [15.7_f64, 8.2, 0.05, 0.0];
        let min_exposure = 0.1;

        let kept: Vec<f64> = exposures
            .iter()
            .copied()
            .filter(|e| *e >= min_exposure)
            .collect();

        assert_eq!(kept, vec![15.7, 8.2]);
    }

    #[test]
    fn test_report_sorts_by_exposure_descending() {
        let mut exposures = vec![("Fund B", 8.2), ("Fund A", 15.7), ("Fund C", 12.0)];
        exposures.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        assert_eq!(exposures[0].0, "Fund A");
        assert_eq!(exposures[0].1, 15.7);
        let max_exposure = exposures.first().map(|(_, e)| *e).unwrap_or(0.0);
        assert_eq!(max_exposure, 15.7);
    }

    #[test]
    fn test_ticker_query_parameter_splits_on_commas() {
        // ?tickers=HDFCBANK.NS, RELIANCE.NS,,INFY.NS
        let raw = "HDFCBANK.NS, RELIANCE.NS,,INFY.NS";
        let tickers: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        assert_eq!(tickers, vec!["HDFCBANK.NS", "RELIANCE.NS", "INFY.NS"]);
    }

    #[test]
    fn test_mapping_keeps_both_symbol_forms() {
        // The ticker CSV maps both the exchange symbol and the quote symbol
        // to the same company name
        let mut mapping = HashMap::new();
        mapping.insert("HDFCBANK", "HDFC Bank Limited");
        mapping.insert("HDFCBANK.NS", "HDFC Bank Limited");

        assert_eq!(mapping.get("HDFCBANK"), mapping.get("HDFCBANK.NS"));
    }

    #[test]
    fn test_low_confidence_mappings_are_ignored() {
        let rows = [
            ("HDFC Bank Limited", 100.0),
            ("Shaky Match Ltd", 60.0),
            ("Adani Ports", 82.0),
        ];
        let min_confidence = 85.0;

        let kept: Vec<&str> = rows
            .iter()
            .filter(|(_, confidence)| *confidence >= min_confidence)
            .map(|(name, _)| *name)
            .collect();

        assert_eq!(kept, vec!["HDFC Bank Limited"]);
    }
}

// ---------------------------------------------------------------------------
// Error Status Mapping
// ---------------------------------------------------------------------------

#[cfg(test)]
mod error_status_mapping {
    #[derive(Debug, PartialEq)]
    enum ApiError {
        Validation,
        NotFound,
        RateLimited,
        External,
    }

    fn status_for(error: &ApiError) -> u16 {
        match error {
            ApiError::Validation => 400,
            ApiError::NotFound => 404,
            ApiError::RateLimited => 429,
            ApiError::External => 502,
        }
    }

    #[test]
    fn test_client_errors_are_4xx() {
        assert_eq!(status_for(&ApiError::Validation), 400);
        assert_eq!(status_for(&ApiError::NotFound), 404);
        assert_eq!(status_for(&ApiError::RateLimited), 429);
    }

    #[test]
    fn test_upstream_failures_are_502() {
        assert_eq!(status_for(&ApiError::External), 502);
    }

    #[test]
    fn test_rate_limited_advises_a_retry_delay() {
        // 429 responses carry Retry-After with this many seconds
        const RETRY_AFTER_SECONDS: &str = "60";
        assert_eq!(RETRY_AFTER_SECONDS.parse::<u32>().unwrap(), 60);
    }
}
