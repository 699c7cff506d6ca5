use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// One proposed constituent as the model emits it: `name` and `rationale`
/// instead of the API schema's `security_name` / `selection_rationale`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposedHolding {
    pub ticker: String,
    pub name: String,
    pub weight: f64,
    pub country: String,
    pub sector: String,
    pub market_cap: String,
    pub relevance: String,
    pub rationale: String,
}

/// A model-proposed index: catchy title plus weighted constituents.
#[derive(Debug, Clone)]
pub struct GeneratedIndex {
    pub title: String,
    pub portfolio: Vec<ProposedHolding>,
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("no JSON object in model output")]
    NoJson,

    #[error("invalid index payload: {0}")]
    InvalidPayload(String),

    #[error("rate limited")]
    RateLimited,

    #[error("request timed out")]
    Timeout,
}

/// Turns a free-text investment theme into a named, weighted index.
///
/// Implementations own prompting, retries and payload extraction; callers
/// get either a parsed `GeneratedIndex` or an error they can surface as-is.
#[async_trait]
pub trait HoldingsGenerator: Send + Sync {
    async fn generate_index(&self, prompt: &str) -> Result<GeneratedIndex, GeneratorError>;
}
