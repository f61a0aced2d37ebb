use crate::core::account::AccountId;
use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::partner::PartnerId;
use crate::core::tax::TaxId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Identifier of a bank journal (e.g. "BNK1").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalId(String);

impl JournalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JournalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A single debit/credit line of a journal entry.
///
/// Exactly one of `debit` / `credit` is non-zero on lines the engine
/// generates; both amounts are non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub label: String,
    pub account: AccountId,
    #[serde(default)]
    pub partner: Option<PartnerId>,
    pub debit: Decimal,
    pub credit: Decimal,
    #[serde(default)]
    pub taxes: Vec<TaxId>,
}

impl JournalLine {
    pub fn new(label: impl Into<String>, account: AccountId, debit: Decimal, credit: Decimal) -> Self {
        Self {
            label: label.into(),
            account,
            partner: None,
            debit,
            credit,
            taxes: Vec::new(),
        }
    }

    /// A pure debit line.
    pub fn debit(label: impl Into<String>, account: AccountId, amount: Decimal) -> Self {
        Self::new(label, account, amount, Decimal::ZERO)
    }

    /// A pure credit line.
    pub fn credit(label: impl Into<String>, account: AccountId, amount: Decimal) -> Self {
        Self::new(label, account, Decimal::ZERO, amount)
    }

    pub fn with_partner(mut self, partner: PartnerId) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn with_taxes(mut self, taxes: Vec<TaxId>) -> Self {
        self.taxes = taxes;
        self
    }

    /// Signed balance of the line: debit minus credit.
    pub fn balance(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// A journal entry: an ordered set of debit/credit lines.
///
/// The executor only ever posts balanced entries — total debit equals
/// total credit.
///
/// # Examples
///
/// ```
/// use reconcile_engine::core::account::AccountId;
/// use reconcile_engine::core::journal::{JournalEntry, JournalLine};
/// use rust_decimal_macros::dec;
///
/// let mut entry = JournalEntry::new();
/// entry.push(JournalLine::new("wire", AccountId::new("101401"), dec!(100), dec!(0)));
/// entry.push(JournalLine::new("INV-1", AccountId::new("121000"), dec!(0), dec!(100)));
/// assert!(entry.is_balanced());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalEntry {
    id: Uuid,
    lines: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            lines: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn push(&mut self, line: JournalLine) {
        self.lines.push(line);
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = JournalLine>) {
        self.lines.extend(lines);
    }

    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Whether total debit exactly equals total credit.
    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Whether the entry balances at the given currency's precision.
    ///
    /// Posted entries may carry a sub-precision residual; this is the
    /// check the executor applies before posting.
    pub fn is_balanced_in(&self, currencies: &CurrencyTable, currency: &CurrencyCode) -> bool {
        currencies.compare(self.total_debit(), self.total_credit(), currency) == Ordering::Equal
    }
}
