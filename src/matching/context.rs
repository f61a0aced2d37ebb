use crate::core::account::AccountId;
use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::journal::JournalId;
use crate::core::partner::PartnerBook;
use crate::core::statement::StatementLine;
use crate::core::tax::TaxTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared reference data the matcher evaluates against.
///
/// Bundles the currency precision table, the partner registry, tax
/// definitions and per-journal configuration: the liquidity account
/// (the account the statement-line side of a posted entry goes to)
/// and, for foreign-currency journals, the journal's own currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchContext {
    pub currencies: CurrencyTable,
    #[serde(default)]
    pub partners: PartnerBook,
    #[serde(default)]
    pub taxes: TaxTable,
    #[serde(default)]
    pub journal_accounts: HashMap<JournalId, AccountId>,
    /// Currency of foreign-currency journals. Journals without an
    /// entry run in the company currency.
    #[serde(default)]
    pub journal_currencies: HashMap<JournalId, CurrencyCode>,
}

impl MatchContext {
    pub fn new(currencies: CurrencyTable) -> Self {
        Self {
            currencies,
            partners: PartnerBook::new(),
            taxes: TaxTable::new(),
            journal_accounts: HashMap::new(),
            journal_currencies: HashMap::new(),
        }
    }

    pub fn with_partners(mut self, partners: PartnerBook) -> Self {
        self.partners = partners;
        self
    }

    pub fn with_taxes(mut self, taxes: TaxTable) -> Self {
        self.taxes = taxes;
        self
    }

    pub fn set_journal_account(&mut self, journal: JournalId, account: AccountId) {
        self.journal_accounts.insert(journal, account);
    }

    /// The liquidity account of a bank journal, when configured.
    pub fn journal_account(&self, journal: &JournalId) -> Option<&AccountId> {
        self.journal_accounts.get(journal)
    }

    pub fn set_journal_currency(&mut self, journal: JournalId, currency: CurrencyCode) {
        self.journal_currencies.insert(journal, currency);
    }

    /// The explicit currency of a journal, when configured.
    pub fn journal_currency(&self, journal: &JournalId) -> Option<&CurrencyCode> {
        self.journal_currencies.get(journal)
    }

    /// The currency a statement line's amounts are expressed in: the
    /// line's explicit currency, else the journal's, else the company
    /// currency.
    pub fn line_currency(&self, line: &StatementLine) -> CurrencyCode {
        line.currency()
            .or_else(|| self.journal_currency(line.journal()))
            .cloned()
            .unwrap_or_else(|| self.currencies.company_currency().clone())
    }
}
