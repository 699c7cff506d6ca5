use chrono::NaiveDate;

use crate::models::{Holding, PricePoint};

/// Maximum distance, in calendar days, between a portfolio date and the
/// benchmark bar matched to it. Beyond this the previous value is carried
/// forward instead.
pub const ALIGN_TOLERANCE_DAYS: i64 = 3;

/// A market index used as the comparison series for a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkIndex {
    pub name: &'static str,
    pub ticker: &'static str,
}

const SP500: BenchmarkIndex = BenchmarkIndex {
    name: "S&P 500",
    ticker: "^GSPC",
};

/// Flagship index per two-letter country code.
pub fn index_for_country(code: &str) -> Option<BenchmarkIndex> {
    let (name, ticker) = match code {
        // Americas
        "AR" => ("S&P MERVAL", "^MERV"),
        "BR" => ("IBOVESPA", "^BVSP"),
        "CA" => ("S&P/TSX Composite", "^GSPTSE"),
        "CL" => ("S&P/CLX IPSA", "^IPSA"),
        "MX" => ("IPC MEXICO", "^MXX"),
        "US" => ("S&P 500", "^GSPC"),

        // Europe
        "AT" => ("ATX", "^ATX"),
        "BE" => ("BEL 20", "^BFX"),
        "CZ" => ("PX Index", "PX.PR"),
        "DK" => ("OMX Copenhagen 25", "^OMXC25"),
        "FI" => ("OMX Helsinki 25", "^OMXH25"),
        "FR" => ("CAC 40", "^FCHI"),
        "DE" => ("DAX", "^GDAXI"),
        "GR" => ("Athex Composite", "^ATG"),
        "HU" => ("BUX", "^BUX"),
        "IE" => ("ISEQ 20", "^ISEQ"),
        "IT" => ("FTSE MIB", "FTSEMIB.MI"),
        "NL" => ("AEX", "^AEX"),
        "NO" => ("OBX Index", "^OBX"),
        "PL" => ("WIG20", "^WIG20"),
        "PT" => ("PSI 20", "PSI20.LS"),
        "RU" => ("MOEX Russia Index", "IMOEX.ME"),
        "ES" => ("IBEX 35", "^IBEX"),
        "SE" => ("OMX Stockholm 30", "^OMX"),
        "CH" => ("Swiss Market Index", "^SSMI"),
        "TR" => ("BIST 100", "XU100.IS"),
        "GB" => ("FTSE 100", "^FTSE"),

        // Asia-Pacific
        "AU" => ("S&P/ASX 200", "^AXJO"),
        "CN" => ("Shanghai Composite", "000001.SS"),
        "HK" => ("Hang Seng Index", "^HSI"),
        "IN" => ("NIFTY 50", "^NSEI"),
        "ID" => ("Jakarta Composite", "^JKSE"),
        "JP" => ("Nikkei 225", "^N225"),
        "MY" => ("FTSE Bursa Malaysia KLCI", "^KLSE"),
        "NZ" => ("S&P/NZX 50", "^NZ50"),
        "PK" => ("KSE 100", "^KSE"),
        "PH" => ("PSEi Composite", "PSEI.PS"),
        "SG" => ("Straits Times Index", "^STI"),
        "KR" => ("KOSPI Composite", "^KS11"),
        "LK" => ("CSE All-Share", "^CSE"),
        "TW" => ("TSEC Weighted Index", "^TWII"),
        "TH" => ("SET Index", "^SET.BK"),
        "VN" => ("VN-Index", "^VNINDEX"),

        // Middle East & Africa
        "EG" => ("EGX 30", "^CASE30"),
        "IL" => ("TA-35", "^TA35"),
        "QA" => ("QE Index", "QSI.QA"),
        "SA" => ("Tadawul All Share", "^TASI.SR"),
        "ZA" => ("FTSE/JSE Top 40", "^J200.JO"),
        "AE" => ("DFM General", "DFMGI.AE"),

        _ => return None,
    };
    Some(BenchmarkIndex { name, ticker })
}

/// Pick the benchmark for a portfolio from its holdings' countries.
///
/// A portfolio confined to one country gets that country's flagship index;
/// mixed or unknown-country portfolios fall back to the S&P 500. Anything
/// longer than a two-letter code is treated as US.
pub fn benchmark_for_portfolio(holdings: &[Holding]) -> BenchmarkIndex {
    if holdings.is_empty() {
        return SP500;
    }

    let mut countries: Vec<String> = holdings
        .iter()
        .map(|h| {
            if h.country.len() > 2 {
                "US".to_string()
            } else {
                h.country.to_uppercase()
            }
        })
        .collect();
    countries.sort();
    countries.dedup();

    if countries.len() == 1 {
        if let Some(benchmark) = index_for_country(&countries[0]) {
            return benchmark;
        }
    }

    SP500
}

/// Project a benchmark history onto the portfolio's date axis.
///
/// Each portfolio date takes the close of the nearest benchmark bar within
/// `ALIGN_TOLERANCE_DAYS`; gaps carry the previous aligned value forward
/// (the very first gap takes the first available bar). The result is
/// normalized to start at 100 and rounded to cents.
pub fn align_series(dates: &[NaiveDate], benchmark: &[PricePoint]) -> Vec<f64> {
    if dates.is_empty() || benchmark.is_empty() {
        return Vec::new();
    }

    let mut raw: Vec<f64> = Vec::with_capacity(dates.len());

    for date in dates {
        let matched = nearest_point(benchmark, *date)
            .filter(|(_, dist)| *dist <= ALIGN_TOLERANCE_DAYS)
            .map(|(p, _)| p.close);

        match matched {
            Some(price) => raw.push(price),
            None => {
                let carried = raw.last().copied().unwrap_or(benchmark[0].close);
                raw.push(carried);
            }
        }
    }

    let start = raw[0];
    if start <= f64::EPSILON {
        return Vec::new();
    }

    raw.iter().map(|v| round2(v / start * 100.0)).collect()
}

/// Nearest bar to `date` in an ascending series, with its distance in days.
fn nearest_point(points: &[PricePoint], date: NaiveDate) -> Option<(&PricePoint, i64)> {
    let idx = points.partition_point(|p| p.date < date);

    let mut best: Option<(&PricePoint, i64)> = None;
    for candidate in [idx.checked_sub(1), Some(idx)].into_iter().flatten() {
        if let Some(p) = points.get(candidate) {
            let dist = (p.date - date).num_days().abs();
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((p, dist));
            }
        }
    }
    best
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

    fn holding(country: &str) -> Holding {
        Holding {
            ticker: "TEST".to_string(),
            security_name: "Test Co".to_string(),
            country: country.to_string(),
            sector: "Technology".to_string(),
            market_cap: "Large Cap".to_string(),
            relevance: "High".to_string(),
            selection_rationale: "test".to_string(),
            weight: 50.0,
        }
    }

    #[test]
    fn test_single_country_portfolio_gets_local_index() {
        let holdings = vec![holding("IN"), holding("in")];
        let benchmark = benchmark_for_portfolio(&holdings);

        assert_eq!(benchmark.ticker, "^NSEI");
        assert_eq!(benchmark.name, "NIFTY 50");
    }

    #[test]
    fn test_mixed_countries_default_to_sp500() {
        let holdings = vec![holding("IN"), holding("US")];
        assert_eq!(benchmark_for_portfolio(&holdings).ticker, "^GSPC");
    }

    #[test]
    fn test_unknown_country_defaults_to_sp500() {
        let holdings = vec![holding("ZZ")];
        assert_eq!(benchmark_for_portfolio(&holdings).ticker, "^GSPC");
    }

    #[test]
    fn test_full_country_name_treated_as_us() {
        let holdings = vec![holding("India")];
        assert_eq!(benchmark_for_portfolio(&holdings).ticker, "^GSPC");
    }

    #[test]
    fn test_empty_portfolio_defaults_to_sp500() {
        assert_eq!(benchmark_for_portfolio(&[]).ticker, "^GSPC");
    }

    #[test]
    fn test_align_on_matching_dates() {
        let dates = vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-04")];
        let benchmark = vec![
            PricePoint::new(d("2024-01-02"), 400.0),
            PricePoint::new(d("2024-01-03"), 404.0),
            PricePoint::new(d("2024-01-04"), 410.0),
        ];

        let aligned = align_series(&dates, &benchmark);

        assert_eq!(aligned, vec![100.0, 101.0, 102.5]);
    }

    #[test]
    fn test_align_uses_nearest_within_tolerance() {
        // Portfolio observes a Monday; benchmark last traded the Friday before
        let dates = vec![d("2024-01-05"), d("2024-01-08")];
        let benchmark = vec![
            PricePoint::new(d("2024-01-05"), 200.0),
            PricePoint::new(d("2024-01-10"), 220.0),
        ];

        let aligned = align_series(&dates, &benchmark);

        // 2024-01-08 is 2 days from 01-10 and 3 from 01-05: takes 220
        assert_eq!(aligned, vec![100.0, 110.0]);
    }

    #[test]
    fn test_align_carries_forward_beyond_tolerance() {
        let dates = vec![d("2024-01-02"), d("2024-01-15"), d("2024-01-16")];
        let benchmark = vec![
            PricePoint::new(d("2024-01-02"), 100.0),
            PricePoint::new(d("2024-01-03"), 105.0),
        ];

        let aligned = align_series(&dates, &benchmark);

        // No bar within 3 days of the 15th or 16th: previous value repeats
        assert_eq!(aligned, vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn test_align_first_gap_takes_first_bar() {
        let dates = vec![d("2024-01-02"), d("2024-02-01")];
        let benchmark = vec![
            PricePoint::new(d("2024-01-30"), 500.0),
            PricePoint::new(d("2024-02-01"), 510.0),
        ];

        let aligned = align_series(&dates, &benchmark);

        // First date has no bar within tolerance: first available bar stands in
        assert_eq!(aligned, vec![100.0, 102.0]);
    }

    #[test]
    fn test_align_empty_inputs() {
        assert!(align_series(&[], &[PricePoint::new(d("2024-01-02"), 1.0)]).is_empty());
        assert!(align_series(&[d("2024-01-02")], &[]).is_empty());
    }

    #[test]
    fn test_exact_tolerance_boundary_matches() {
        let dates = vec![d("2024-01-10"), d("2024-01-13")];
        let benchmark = vec![PricePoint::new(d("2024-01-10"), 100.0)];

        let aligned = align_series(&dates, &benchmark);

        // 3 days away is still within tolerance
        assert_eq!(aligned, vec![100.0, 100.0]);
    }

    #[test]
    fn test_nearest_point_prefers_closer_side() {
        let benchmark: Vec<PricePoint> = (0..5)
            .map(|i| PricePoint::new(d("2024-01-01") + Duration::days(i * 7), 100.0 + i as f64))
            .collect();

        let (p, dist) = nearest_point(&benchmark, d("2024-01-09")).unwrap();
        assert_eq!(p.date, d("2024-01-08"));
        assert_eq!(dist, 1);
    }
}
