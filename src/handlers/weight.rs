use thiserror::Error;

/// Lowest weight accepted, in kilograms
pub const MIN_WEIGHT_KG: f64 = 20.0;
/// Highest weight accepted, in kilograms
pub const MAX_WEIGHT_KG: f64 = 500.0;

#[derive(Debug, Error, PartialEq)]
pub enum WeightParseError {
    #[error("no weight given")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} is outside the plausible range")]
    OutOfRange(f64),
}

/// Parse a weight such as `72.5`, `72,5` or `72.5 kg`.
pub fn parse_weight(input: &str) -> Result<f64, WeightParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WeightParseError::Empty);
    }

    let lower = trimmed.to_lowercase();
    let number = ["kg", "кг"]
        .iter()
        .find_map(|unit| lower.strip_suffix(unit))
        .unwrap_or(&lower)
        .trim()
        .replace(',', ".");

    let value: f64 = number
        .parse()
        .map_err(|_| WeightParseError::NotANumber(trimmed.to_string()))?;

    // Rejects NaN as well, every comparison with it is false
    if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&value) {
        return Err(WeightParseError::OutOfRange(value));
    }

    Ok(value)
}
