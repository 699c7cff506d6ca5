use serde::{Deserialize, Serialize};

/// One mutual fund holding that matches a portfolio ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlappingHolding {
    pub ticker: String,
    pub company_name: String,
    /// Percentage of the fund's NAV held in this company
    pub exposure_percentage: f64,
    pub sector: String,
    #[serde(rename = "type")]
    pub holding_type: String,
}

/// A fund whose portfolio overlaps the generated index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundOverlap {
    pub fund_name: String,
    pub amc_name: String,
    /// Metadata block passed through from the AMC disclosure file
    pub fund_metadata: serde_json::Value,
    pub overlapping_holdings: Vec<OverlappingHolding>,
    /// Sum of exposure percentages across overlapping holdings
    pub total_exposure: f64,
    pub overlapping_tickers: Vec<String>,
    pub num_overlapping_holdings: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundOverlapSummary {
    pub total_funds_analyzed: usize,
    pub funds_with_overlap: usize,
    pub max_exposure: f64,
    pub amcs_analyzed: Vec<String>,
}

/// Full overlap analysis for a set of tickers, sorted by exposure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundOverlapReport {
    pub total_tickers: usize,
    pub valid_tickers: usize,
    pub valid_ticker_list: Vec<String>,
    pub fund_mappings: Vec<FundOverlap>,
    pub summary: FundOverlapSummary,
}

/// Query parameters for the overlap endpoint. `tickers` is comma separated
/// (`?tickers=HDFCBANK.NS,RELIANCE.NS`).
#[derive(Debug, Clone, Deserialize)]
pub struct FundOverlapParams {
    pub tickers: String,
    pub min_exposure: Option<f64>,
}

impl FundOverlapParams {
    /// The individual tickers, trimmed, with empty entries dropped.
    pub fn ticker_list(&self) -> Vec<String> {
        self.tickers
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
