pub mod gemini;
pub mod holdings_generator;
pub mod market_data;
pub mod yahoo;
