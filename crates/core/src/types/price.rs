//! Type-safe price representation using decimal arithmetic.
//!
//! Cart arithmetic is done on raw [`Decimal`] amounts and never rounded.
//! Rounding to the currency's minor unit is a presentation concern and only
//! happens in [`Price::display`] and [`Price::minor_units`].

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the default currency (USD).
    #[must_use]
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Format for display (e.g., "$19.99"), rounding half away from zero.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        format!("{}{:.2}", self.currency_code.symbol(), rounded)
    }

    /// Amount in the currency's minor unit (e.g., cents), as payment
    /// providers expect it.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Lowercase ISO code, as used by payment provider APIs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usd" => Ok(Self::USD),
            "eur" => Ok(Self::EUR),
            "gbp" => Ok(Self::GBP),
            "cad" => Ok(Self::CAD),
            "aud" => Ok(Self::AUD),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display_rounds_to_cents() {
        let price = Price::usd(Decimal::from_str("55.9976").unwrap());
        assert_eq!(price.display(), "$56.00");

        let price = Price::usd(Decimal::from_str("699.97").unwrap());
        assert_eq!(price.to_string(), "$699.97");
    }

    #[test]
    fn test_display_pads_whole_amounts() {
        assert_eq!(Price::usd(Decimal::ZERO).display(), "$0.00");
        assert_eq!(
            Price::new(Decimal::from(5), CurrencyCode::GBP).display(),
            "£5.00"
        );
    }

    #[test]
    fn test_minor_units() {
        let price = Price::usd(Decimal::from_str("99.99").unwrap());
        assert_eq!(price.minor_units(), Some(9999));

        let price = Price::usd(Decimal::from_str("0.005").unwrap());
        assert_eq!(price.minor_units(), Some(1));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(CurrencyCode::from_str("USD").unwrap(), CurrencyCode::USD);
        assert_eq!(CurrencyCode::from_str("eur").unwrap(), CurrencyCode::EUR);
        assert!(CurrencyCode::from_str("btc").is_err());
    }
}
