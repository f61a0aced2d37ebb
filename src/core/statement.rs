use crate::core::currency::CurrencyCode;
use crate::core::journal::JournalId;
use crate::core::partner::PartnerId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming bank transaction awaiting reconciliation.
///
/// The `amount` is signed from the bank account's point of view:
/// positive for money received, negative for money paid out. The
/// label is whatever communication the bank delivered and is the main
/// hook for rule criteria and invoice-reference matching.
///
/// # Examples
///
/// ```
/// use reconcile_engine::core::journal::JournalId;
/// use reconcile_engine::core::statement::StatementLine;
/// use rust_decimal_macros::dec;
///
/// let line = StatementLine::new("WIRE INV/2026/0042", dec!(1210), JournalId::new("BNK1"));
/// assert_eq!(line.amount(), dec!(1210));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// Unique identifier for this line.
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    /// Bank communication / memo.
    label: String,
    /// Signed amount: positive = received, negative = paid.
    amount: Decimal,
    /// Transaction currency when it differs from the journal's own
    /// (or, for company-currency journals, the company currency).
    #[serde(default)]
    currency: Option<CurrencyCode>,
    /// The bank journal the line was imported into.
    journal: JournalId,
    /// Counterparty, when the importer could identify one.
    #[serde(default)]
    partner: Option<PartnerId>,
    /// Value date.
    #[serde(default = "Utc::now")]
    date: DateTime<Utc>,
}

impl StatementLine {
    pub fn new(label: impl Into<String>, amount: Decimal, journal: JournalId) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            amount,
            currency: None,
            journal,
            partner: None,
            date: Utc::now(),
        }
    }

    /// Fix the line id (useful for testing / determinism).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_partner(mut self, partner: PartnerId) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Option<&CurrencyCode> {
        self.currency.as_ref()
    }

    pub fn journal(&self) -> &JournalId {
        &self.journal
    }

    pub fn partner(&self) -> Option<&PartnerId> {
        self.partner.as_ref()
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_statement_line_creation() {
        let line = StatementLine::new("WIRE 42", dec!(-350.25), JournalId::new("BNK1"));
        assert_eq!(line.label(), "WIRE 42");
        assert_eq!(line.amount(), dec!(-350.25));
        assert_eq!(line.journal().as_str(), "BNK1");
        assert!(line.partner().is_none());
    }

    #[test]
    fn test_explicit_currency() {
        let line = StatementLine::new("x", dec!(10), JournalId::new("BNK1"));
        assert!(line.currency().is_none());

        let line = line.with_currency(CurrencyCode::new("EUR"));
        assert_eq!(line.currency(), Some(&CurrencyCode::new("EUR")));
    }

    #[test]
    fn test_statement_line_json_defaults() {
        let json = r#"{"label": "FEE", "amount": "-12.50", "journal": "BNK1"}"#;
        let line: StatementLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.amount(), dec!(-12.50));
        assert!(line.currency().is_none());
    }
}
