use crate::core::account::AccountId;
use crate::core::currency::{CurrencyCode, CurrencyTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a tax definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A percentage tax applicable to write-off lines.
///
/// `price_include` taxes are carved out of the base amount; exclusive
/// taxes are added on top. The optional `account` receives the tax
/// line (falling back to the base line's account when unset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tax {
    pub id: TaxId,
    pub name: String,
    /// Rate in percent (e.g. 21 for 21%).
    pub rate: Decimal,
    #[serde(default)]
    pub price_include: bool,
    #[serde(default)]
    pub account: Option<AccountId>,
}

impl Tax {
    pub fn new(id: TaxId, name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            rate,
            price_include: false,
            account: None,
        }
    }

    pub fn price_included(mut self) -> Self {
        self.price_include = true;
        self
    }

    pub fn with_account(mut self, account: AccountId) -> Self {
        self.account = Some(account);
        self
    }

    /// Split a signed balance into base and tax amount.
    ///
    /// With `included` (the tax's own flag, possibly forced by the rule),
    /// the tax is carved out of the balance: base + tax == balance.
    /// Otherwise the tax is computed on top and the base is the full
    /// balance. Both parts are rounded at the currency's precision.
    ///
    /// # Examples
    ///
    /// ```
    /// use reconcile_engine::core::currency::{CurrencyCode, CurrencyTable};
    /// use reconcile_engine::core::tax::{Tax, TaxId};
    /// use rust_decimal_macros::dec;
    ///
    /// let table = CurrencyTable::new(CurrencyCode::new("USD"));
    /// let vat = Tax::new(TaxId::new("VAT21"), "VAT 21%", dec!(21));
    /// let split = vat.compute(dec!(-100), false, &table, &CurrencyCode::new("USD"));
    /// assert_eq!(split.base, dec!(-100));
    /// assert_eq!(split.tax, dec!(-21));
    /// ```
    pub fn compute(
        &self,
        balance: Decimal,
        force_include: bool,
        currencies: &CurrencyTable,
        currency: &CurrencyCode,
    ) -> TaxSplit {
        let included = self.price_include || force_include;
        let factor = self.rate / dec!(100);
        if included {
            let base = currencies.round(balance / (Decimal::ONE + factor), currency);
            TaxSplit {
                base,
                tax: balance - base,
            }
        } else {
            TaxSplit {
                base: balance,
                tax: currencies.round(balance * factor, currency),
            }
        }
    }
}

/// A signed base/tax decomposition of a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxSplit {
    pub base: Decimal,
    pub tax: Decimal,
}

/// Registry of known taxes, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxTable {
    taxes: HashMap<TaxId, Tax>,
}

impl TaxTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tax: Tax) {
        self.taxes.insert(tax.id.clone(), tax);
    }

    pub fn get(&self, id: &TaxId) -> Option<&Tax> {
        self.taxes.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.taxes.is_empty()
    }
}

impl FromIterator<Tax> for TaxTable {
    fn from_iter<T: IntoIterator<Item = Tax>>(iter: T) -> Self {
        let mut table = Self::new();
        for tax in iter {
            table.insert(tax);
        }
        table
    }
}
