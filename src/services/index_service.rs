use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::external::holdings_generator::{GeneratorError, HoldingsGenerator, ProposedHolding};
use crate::models::Holding;

/// Upper bound on cached prompt responses. Identical prompts are common
/// (users retry, demos repeat) and each miss costs a model call, but the
/// cache must not grow without bound on a long-lived process.
const PROMPT_CACHE_CAPACITY: usize = 100;

/// A generated index: model-supplied title plus normalized holdings.
#[derive(Debug, Clone)]
pub struct GeneratedPortfolio {
    pub index_name: String,
    pub holdings: Vec<Holding>,
}

/// Turns prompts into normalized portfolios, caching by exact prompt text.
pub struct IndexService {
    generator: Arc<dyn HoldingsGenerator>,
    cache: DashMap<String, GeneratedPortfolio>,
}

impl IndexService {
    pub fn new(generator: Arc<dyn HoldingsGenerator>) -> Self {
        Self {
            generator,
            cache: DashMap::new(),
        }
    }

    /// Generate an index for a prompt, serving repeats from cache.
    pub async fn generate(&self, prompt: &str) -> Result<GeneratedPortfolio, GeneratorError> {
        if let Some(hit) = self.cache.get(prompt) {
            debug!("Serving cached index for prompt: {}", prompt);
            return Ok(hit.clone());
        }

        let generated = self.generator.generate_index(prompt).await?;
        info!(
            "Model proposed {} holdings for \"{}\"",
            generated.portfolio.len(),
            generated.title
        );

        let mut holdings: Vec<Holding> = generated.portfolio.into_iter().map(to_holding).collect();
        normalize_weights(&mut holdings);

        let portfolio = GeneratedPortfolio {
            index_name: generated.title,
            holdings,
        };

        if self.cache.len() >= PROMPT_CACHE_CAPACITY {
            debug!("Prompt cache full, not caching this response");
        } else {
            self.cache
                .insert(prompt.to_string(), portfolio.clone());
        }

        Ok(portfolio)
    }
}

fn to_holding(proposed: ProposedHolding) -> Holding {
    Holding {
        ticker: proposed.ticker,
        security_name: proposed.name,
        country: proposed.country,
        sector: proposed.sector,
        market_cap: proposed.market_cap,
        relevance: proposed.relevance,
        selection_rationale: proposed.rationale,
        weight: proposed.weight,
    }
}

/// Rescale weights so they sum to exactly 100.00.
///
/// A total of (near) zero is replaced with an equal split. A total already
/// at 100.00 is left untouched. Otherwise every weight is scaled and
/// rounded to two decimals; if rounding leaves the sum a cent or more off,
/// the residue lands on the largest holding.
pub fn normalize_weights(holdings: &mut [Holding]) {
    if holdings.is_empty() {
        return;
    }

    let total: f64 = holdings.iter().map(|h| h.weight).sum();

    if total < 0.01 {
        warn!("Total weight is {:.2}, distributing equally", total);
        let equal = 100.0 / holdings.len() as f64;
        for holding in holdings.iter_mut() {
            holding.weight = equal;
        }
        return;
    }

    if (total - 100.0).abs() < 0.001 {
        debug!("Weights already sum to {:.2}%", total);
        return;
    }

    info!("Normalizing weights from {:.2}% to 100.00%", total);
    let scale = 100.0 / total;
    for holding in holdings.iter_mut() {
        holding.weight = round2(holding.weight * scale);
    }

    let new_total: f64 = holdings.iter().map(|h| h.weight).sum();
    if (new_total - 100.0).abs() >= 0.01 {
        warn!(
            "Rounded weights sum to {:.2}%, adjusting the largest holding",
            new_total
        );
        force_exact_total(holdings, new_total);
    }
}

fn force_exact_total(holdings: &mut [Holding], current_total: f64) {
    let adjustment = 100.0 - current_total;
    if let Some(largest) = holdings
        .iter_mut()
        .max_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(std::cmp::Ordering::Equal))
    {
        largest.weight = round2(largest.weight + adjustment);
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
