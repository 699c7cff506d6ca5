use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::models::{FundOverlap, FundOverlapReport, FundOverlapSummary, OverlappingHolding};

/// Funds whose total overlap with the portfolio is below this many percent
/// of NAV are dropped from the report.
pub const MIN_EXPOSURE_DEFAULT: f64 = 0.1;

/// Ticker-to-company rows below this confidence are ignored.
const MIN_MAPPING_CONFIDENCE: f64 = 85.0;

#[derive(Debug, Deserialize)]
struct TickerMappingRow {
    input_name: String,
    symbol: String,
    yfinance_ticker: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct AmcFile {
    #[serde(default)]
    amc: Option<String>,
    #[serde(default)]
    funds: Vec<FundRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct FundRecord {
    #[serde(default = "unknown_fund_name")]
    fund_name: String,
    #[serde(default)]
    fund_metadata: serde_json::Value,
    #[serde(default)]
    holdings: Vec<FundHoldingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct FundHoldingRecord {
    #[serde(default)]
    company: String,
    #[serde(default)]
    percentage_to_nav: f64,
    #[serde(default, rename = "type")]
    holding_type: String,
    #[serde(default)]
    sector_or_rating: Option<String>,
    #[serde(default)]
    is_derivative: bool,
}

fn unknown_fund_name() -> String {
    "Unknown Fund".to_string()
}

struct AmcData {
    name: String,
    funds: Vec<FundRecord>,
}

/// Mutual fund disclosure data loaded once at startup.
///
/// Holds the ticker-to-company mapping plus every AMC's published fund
/// portfolios. Missing or unreadable files degrade to an empty catalog so
/// the rest of the API keeps working without overlap analysis.
pub struct FundCatalog {
    ticker_to_company: HashMap<String, String>,
    amcs: Vec<AmcData>,
}

impl FundCatalog {
    /// Load the catalog from a data directory containing
    /// `company_ticker_mapping.csv` and `funds/*.json`.
    pub fn load(data_dir: &Path) -> Self {
        let ticker_to_company = match load_ticker_mapping(&data_dir.join("company_ticker_mapping.csv")) {
            Ok(mapping) => {
                info!("Loaded {} ticker mappings", mapping.len());
                mapping
            }
            Err(err) => {
                warn!("Ticker mapping unavailable: {:#}", err);
                HashMap::new()
            }
        };

        let amcs = match load_amc_data(&data_dir.join("funds")) {
            Ok(amcs) => {
                for amc in &amcs {
                    info!("Loaded {} funds for {}", amc.funds.len(), amc.name);
                }
                amcs
            }
            Err(err) => {
                warn!("AMC fund data unavailable: {:#}", err);
                Vec::new()
            }
        };

        Self {
            ticker_to_company,
            amcs,
        }
    }

    pub fn empty() -> Self {
        Self {
            ticker_to_company: HashMap::new(),
            amcs: Vec::new(),
        }
    }

    pub fn fund_count(&self) -> usize {
        self.amcs.iter().map(|amc| amc.funds.len()).sum()
    }

    /// Map portfolio tickers to fund holdings and compute per-fund exposure.
    ///
    /// Tickers absent from the mapping are counted but otherwise ignored.
    /// Only funds whose total overlapping exposure reaches `min_exposure`
    /// appear, sorted by exposure descending.
    pub fn map_tickers_to_funds(&self, tickers: &[String], min_exposure: f64) -> FundOverlapReport {
        info!("Mapping {} tickers to fund holdings", tickers.len());

        let mut valid_tickers = Vec::new();
        let mut ticker_to_company = HashMap::new();

        for ticker in tickers {
            match self.ticker_to_company.get(ticker) {
                Some(company) => {
                    valid_tickers.push(ticker.clone());
                    ticker_to_company.insert(ticker.clone(), company.clone());
                }
                None => warn!("No mapping found for ticker: {}", ticker),
            }
        }

        info!(
            "Found {} valid tickers out of {}",
            valid_tickers.len(),
            tickers.len()
        );

        let mut fund_mappings = Vec::new();
        if !valid_tickers.is_empty() {
            for amc in &self.amcs {
                for fund in &amc.funds {
                    let overlap =
                        analyze_fund_holdings(fund, &valid_tickers, &ticker_to_company, &amc.name);
                    if overlap.total_exposure >= min_exposure {
                        fund_mappings.push(overlap);
                    }
                }
            }
        }

        fund_mappings.sort_by(|a, b| {
            b.total_exposure
                .partial_cmp(&a.total_exposure)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let max_exposure = fund_mappings
            .first()
            .map(|fund| fund.total_exposure)
            .unwrap_or(0.0);

        for (rank, fund) in fund_mappings.iter().take(3).enumerate() {
            debug!(
                "Top fund {}: {} with {}% exposure across {} holdings",
                rank + 1,
                fund.fund_name,
                fund.total_exposure,
                fund.num_overlapping_holdings
            );
        }

        FundOverlapReport {
            total_tickers: tickers.len(),
            valid_tickers: valid_tickers.len(),
            valid_ticker_list: valid_tickers,
            summary: FundOverlapSummary {
                total_funds_analyzed: self.fund_count(),
                funds_with_overlap: fund_mappings.len(),
                max_exposure: round2(max_exposure),
                amcs_analyzed: self.amcs.iter().map(|amc| amc.name.clone()).collect(),
            },
            fund_mappings,
        }
    }
}

/// Overlap between one fund's equity holdings and the valid tickers.
///
/// Derivative positions and non-equity rows never count. Each fund holding
/// matches at most one ticker. Individual holdings are not filtered by
/// exposure, only whole funds are.
fn analyze_fund_holdings(
    fund: &FundRecord,
    valid_tickers: &[String],
    ticker_to_company: &HashMap<String, String>,
    amc_name: &str,
) -> FundOverlap {
    let mut overlapping_holdings = Vec::new();
    let mut total_exposure = 0.0;

    for holding in &fund.holdings {
        if holding.holding_type.trim().to_lowercase() != "equity" || holding.is_derivative {
            continue;
        }
        let company = holding.company.trim();

        for ticker in valid_tickers {
            if ticker_to_company.get(ticker).map(String::as_str) == Some(company) {
                overlapping_holdings.push(OverlappingHolding {
                    ticker: ticker.clone(),
                    company_name: company.to_string(),
                    exposure_percentage: holding.percentage_to_nav,
                    sector: holding
                        .sector_or_rating
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    holding_type: holding.holding_type.clone(),
                });
                total_exposure += holding.percentage_to_nav;
                break;
            }
        }
    }

    let overlapping_tickers = overlapping_holdings
        .iter()
        .map(|h| h.ticker.clone())
        .collect();

    FundOverlap {
        fund_name: fund.fund_name.clone(),
        amc_name: amc_name.to_string(),
        fund_metadata: fund.fund_metadata.clone(),
        num_overlapping_holdings: overlapping_holdings.len(),
        overlapping_tickers,
        total_exposure: round2(total_exposure),
        overlapping_holdings,
    }
}

fn load_ticker_mapping(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ticker mapping: {:?}", path))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let mut mapping = HashMap::new();
    for (line_num, result) in reader.deserialize::<TickerMappingRow>().enumerate() {
        match result {
            Ok(row) => {
                if row.confidence >= MIN_MAPPING_CONFIDENCE {
                    let input_name = row.input_name.trim().to_string();
                    mapping.insert(row.symbol.trim().to_string(), input_name.clone());
                    mapping.insert(row.yfinance_ticker.trim().to_string(), input_name);
                }
            }
            Err(err) => warn!("Skipping ticker mapping line {}: {}", line_num + 2, err),
        }
    }

    Ok(mapping)
}

fn load_amc_data(dir: &Path) -> Result<Vec<AmcData>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read fund data directory: {:?}", dir))?;

    let mut amcs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read fund file: {:?}", path))?;
        let file: AmcFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fund file: {:?}", path))?;

        let name = file.amc.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("UNKNOWN")
                .to_uppercase()
        });

        amcs.push(AmcData {
            name,
            funds: file.funds,
        });
    }

    amcs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(amcs)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
