use crate::errors::AppError;
use crate::models::Holding;

/// Tolerance for floating point drift when checking the 100% weight sum.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Check that holdings weights sum to 100%.
pub fn validate_holdings_weights(holdings: &[Holding]) -> Result<(), AppError> {
    let total: f64 = holdings.iter().map(|h| h.weight).sum();
    if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(AppError::Validation(format!(
            "Holdings weights must sum to 100%. Current sum: {total}%"
        )));
    }
    Ok(())
}

/// Check a single holding's fields.
pub fn validate_holding(holding: &Holding) -> Result<(), AppError> {
    if holding.weight < 0.0 || holding.weight > 100.0 {
        return Err(AppError::Validation(format!(
            "Holding weight must be between 0 and 100%. Got: {}%",
            holding.weight
        )));
    }

    if holding.ticker.trim().is_empty() {
        return Err(AppError::Validation(
            "Ticker symbol is required".to_string(),
        ));
    }

    if holding.security_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Security name is required".to_string(),
        ));
    }

    Ok(())
}
