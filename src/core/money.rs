// Fixed-point money arithmetic for the engine.
//
// Every amount is a rust_decimal::Decimal with 2 fractional digits (MAD),
// every rate a percentage with up to 2 fractional digits. Rounding is
// banker's (midpoint-nearest-even) and is applied only at the final step
// of a derived computation, never on intermediates, so totals reproduce
// bit-for-bit across implementations.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Result};

/// Fractional digits carried by monetary amounts
pub const MONEY_SCALE: u32 = 2;

/// Fractional digits allowed on percentage rates
pub const RATE_SCALE: u32 = 2;

/// Round a derived monetary amount to its storage scale
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Validate a non-negative amount, naming the offending field on failure
pub fn require_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::validation(format!(
            "{} must be non-negative, got: {}",
            field, value
        )));
    }
    Ok(())
}

/// Validate a strictly positive amount
pub fn require_positive(field: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::validation(format!(
            "{} must be positive, got: {}",
            field, value
        )));
    }
    Ok(())
}

/// Validate a percentage rate in [0, 100] with at most RATE_SCALE decimals
pub fn require_rate(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(EngineError::validation(format!(
            "{} must be between 0 and 100, got: {}",
            field, value
        )));
    }
    if value.normalize().scale() > RATE_SCALE {
        return Err(EngineError::validation(format!(
            "{} cannot have more than {} decimal places, got: {}",
            field, RATE_SCALE, value
        )));
    }
    Ok(())
}

/// Document language of a tenant; drives the legal amount-in-words string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    #[default]
    Fr,
    En,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ar" => Ok(Language::Ar),
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            _ => Err(format!("Invalid language: {}", s)),
        }
    }
}
