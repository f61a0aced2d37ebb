use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// ISO 4217-style currency code.
///
/// Supports standard fiat currencies (USD, EUR, INR, etc.)
/// as well as arbitrary identifiers for experimental settlement units.
///
/// # Examples
///
/// ```
/// use reconcile_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(usd, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Per-currency precision table.
///
/// All monetary comparisons in the matching pipeline happen at the
/// decimal precision of the relevant currency: two amounts are equal
/// when they round to the same value, and an amount is zero when it
/// rounds to zero. Currencies without an explicit entry default to
/// two decimal places.
///
/// # Examples
///
/// ```
/// use reconcile_engine::core::currency::{CurrencyCode, CurrencyTable};
/// use rust_decimal_macros::dec;
///
/// let mut table = CurrencyTable::new(CurrencyCode::new("USD"));
/// table.set_decimal_places(CurrencyCode::new("JPY"), 0);
///
/// let jpy = CurrencyCode::new("JPY");
/// assert_eq!(table.round(dec!(100.4), &jpy), dec!(100));
/// assert!(table.is_zero(dec!(0.3), &jpy));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTable {
    /// The currency journal entries are ultimately posted in.
    company_currency: CurrencyCode,
    /// Decimal places per currency. Missing entries default to 2.
    #[serde(default)]
    decimal_places: HashMap<CurrencyCode, u32>,
}

impl CurrencyTable {
    pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

    pub fn new(company_currency: CurrencyCode) -> Self {
        Self {
            company_currency,
            decimal_places: HashMap::new(),
        }
    }

    pub fn company_currency(&self) -> &CurrencyCode {
        &self.company_currency
    }

    pub fn set_decimal_places(&mut self, currency: CurrencyCode, places: u32) {
        self.decimal_places.insert(currency, places);
    }

    pub fn decimal_places(&self, currency: &CurrencyCode) -> u32 {
        self.decimal_places
            .get(currency)
            .copied()
            .unwrap_or(Self::DEFAULT_DECIMAL_PLACES)
    }

    /// Round an amount to the currency's decimal precision.
    pub fn round(&self, amount: Decimal, currency: &CurrencyCode) -> Decimal {
        amount.round_dp(self.decimal_places(currency))
    }

    /// Compare two amounts at the currency's decimal precision.
    pub fn compare(&self, a: Decimal, b: Decimal, currency: &CurrencyCode) -> Ordering {
        self.round(a, currency).cmp(&self.round(b, currency))
    }

    /// Whether an amount rounds to zero at the currency's precision.
    pub fn is_zero(&self, amount: Decimal, currency: &CurrencyCode) -> bool {
        self.round(amount, currency).is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_code_equality() {
        let a = CurrencyCode::new("USD");
        let b = CurrencyCode::new("USD");
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_precision() {
        let table = CurrencyTable::new(CurrencyCode::new("USD"));
        assert_eq!(table.decimal_places(&CurrencyCode::new("USD")), 2);
        assert_eq!(table.round(dec!(1.006), &CurrencyCode::new("USD")), dec!(1.01));
    }

    #[test]
    fn test_explicit_precision() {
        let mut table = CurrencyTable::new(CurrencyCode::new("USD"));
        table.set_decimal_places(CurrencyCode::new("KWD"), 3);
        assert_eq!(
            table.round(dec!(1.23456), &CurrencyCode::new("KWD")),
            dec!(1.235)
        );
    }

    #[test]
    fn test_compare_at_precision() {
        let table = CurrencyTable::new(CurrencyCode::new("USD"));
        let usd = CurrencyCode::new("USD");
        assert_eq!(table.compare(dec!(10.001), dec!(10.004), &usd), Ordering::Equal);
        assert_eq!(table.compare(dec!(10.01), dec!(10.02), &usd), Ordering::Less);
    }

    #[test]
    fn test_is_zero_within_rounding() {
        let table = CurrencyTable::new(CurrencyCode::new("USD"));
        let usd = CurrencyCode::new("USD");
        assert!(table.is_zero(dec!(0.004), &usd));
        assert!(!table.is_zero(dec!(0.01), &usd));
    }
}
