use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::external::holdings_generator::{
    GeneratedIndex, GeneratorError, HoldingsGenerator, ProposedHolding,
};

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(20);

/// Instruction that pins the model to a bare JSON object with a `portfolio`
/// array and a `title`. Weights must sum to exactly 100.00 - the normalizer
/// downstream still enforces it, but asking keeps corrections small.
const SYSTEM_PROMPT: &str = r#"You are an AI financial analyst and investment index builder. Your sole function is to take a user's natural language prompt and transform it into a structured, executable financial index.

Respond with a single JSON object and nothing else - no conversational text, no explanations, no markdown fences. The object must contain two keys:
* "portfolio": an array of objects, one per stock or ETF, each with the keys:
    * "ticker": the official ticker symbol (e.g., AAPL, RELIANCE.NS).
    * "name": the full company or fund name.
    * "weight": percentage allocation; all weights must sum to EXACTLY 100.00 (no tolerance for 99.99 or similar), each in the range 5 to 25.
    * "country": a two-letter country code (e.g., US, IN).
    * "rationale": one concise sentence linking the asset to the prompt.
    * "sector": the company's sector (e.g., Technology, Energy, Healthcare).
    * "market_cap": Large Cap, Mid Cap, or Small Cap.
    * "relevance": how relevant the asset is to the prompt.
* "title": a cool, catchy title for the index, directly related to the idea.

Screening rules: select the 9 to 20 most relevant listed equities, weighted by relevance and market presence. If the prompt names a country use that country only, otherwise default to the US; never include multi-country instruments. Prefer companies whose revenue is genuinely driven by the idea, include at least two indirect beneficiaries, and cover at least one small cap, one mid cap and one large cap with high growth potential."#;

/// Gemini-backed index generation via the REST generateContent endpoint.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
}

impl GeminiGenerator {
    pub fn from_env() -> Result<Self, GeneratorError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeneratorError::Api("GEMINI_API_KEY not set".into()))?;

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
        })
    }

    async fn call_gemini_with_retry(&self, prompt: &str) -> Result<String, GeneratorError> {
        let mut retry_count = 0;
        let mut delay = INITIAL_RETRY_DELAY;

        loop {
            match self.call_gemini(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= MAX_RETRIES {
                        error!("Gemini API call failed after {} retries: {}", MAX_RETRIES, e);
                        return Err(e);
                    }

                    warn!(
                        "Gemini API call failed (attempt {}/{}): {}. Retrying in {:?}...",
                        retry_count, MAX_RETRIES, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2; // Exponential backoff: 20s, 40s
                }
            }
        }
    }

    async fn call_gemini(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            GEMINI_MODEL
        );

        let request = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout
                } else {
                    GeneratorError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(GeneratorError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeneratorError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Api(e.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| GeneratorError::Api("No candidates in response".into()))?;

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawIndexPayload {
    portfolio: Vec<ProposedHolding>,
    title: Option<String>,
}

/// Extract the outermost JSON object from model output that may carry
/// markdown fences or stray prose around it.
fn extract_json_block(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").ok()?;
    re.find(text).map(|m| m.as_str())
}

/// "<prompt> Index", clipped to 50 characters for display.
pub fn fallback_title(prompt: &str) -> String {
    let title = format!("{} Index", prompt.trim());
    if title.len() > 50 {
        let clipped: String = title.chars().take(47).collect();
        format!("{}...", clipped)
    } else {
        title
    }
}

fn parse_index_payload(prompt: &str, raw: &str) -> Result<GeneratedIndex, GeneratorError> {
    let json_str = extract_json_block(raw).ok_or(GeneratorError::NoJson)?;

    let payload: RawIndexPayload = serde_json::from_str(json_str)
        .map_err(|e| GeneratorError::InvalidPayload(e.to_string()))?;

    if payload.portfolio.is_empty() {
        return Err(GeneratorError::InvalidPayload(
            "portfolio array is empty".into(),
        ));
    }

    let title = match payload.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            warn!("No title in model output, falling back to prompt-derived title");
            fallback_title(prompt)
        }
    };

    Ok(GeneratedIndex {
        title,
        portfolio: payload.portfolio,
    })
}

#[async_trait]
impl HoldingsGenerator for GeminiGenerator {
    async fn generate_index(&self, prompt: &str) -> Result<GeneratedIndex, GeneratorError> {
        info!("Generating index via Gemini (model: {})", GEMINI_MODEL);

        let raw = self.call_gemini_with_retry(prompt).await?;
        let index = parse_index_payload(prompt, &raw)?;

        info!(
            "Gemini proposed {} holdings for index '{}'",
            index.portfolio.len(),
            index.title
        );

        Ok(index)
    }
}
