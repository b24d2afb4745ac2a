//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
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

    /// A zero amount in the store's default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, CurrencyCode::USD)
    }

    /// Price of `quantity` units at this unit price, or `None` if the
    /// amount overflows.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Sum of two prices, or `None` if the amount overflows.
    ///
    /// The left operand's currency wins; the storefront only ever prices in
    /// a single currency.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.amount
            .checked_add(rhs.amount)
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_display() {
        let unit = Price::new(Decimal::new(1000, 2), CurrencyCode::USD);
        assert_eq!(unit.checked_times(2).unwrap().display(), "$20.00");
    }

    #[test]
    fn test_add_sums_amounts() {
        let a = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
        let b = Price::new(Decimal::new(1, 2), CurrencyCode::USD);
        assert_eq!(a.checked_add(b).unwrap().amount, Decimal::new(2000, 2));
    }

    #[test]
    fn test_overflow_is_none() {
        let max = Price::new(Decimal::MAX, CurrencyCode::USD);
        assert_eq!(max.checked_times(2), None);
        assert_eq!(max.checked_times(1), Some(max));
        assert_eq!(max.checked_add(Price::new(Decimal::ONE, CurrencyCode::USD)), None);
    }

    #[test]
    fn test_zero_default() {
        assert_eq!(Price::default(), Price::zero());
        assert_eq!(Price::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(CurrencyCode::GBP.symbol(), "£");
        assert_eq!(CurrencyCode::CAD.symbol(), "$");
    }
}
