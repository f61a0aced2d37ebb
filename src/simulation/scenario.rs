//! Random reconciliation scenario generation.
//!
//! Builds a partner book, a pool of open invoices and a batch of bank
//! statement lines. A configurable share of the lines embeds an
//! invoice reference in the label, so matching by communication can be
//! exercised alongside partner-only and no-match paths.

use crate::core::account::AccountId;
use crate::core::candidate::{CandidateLine, DocumentKind};
use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::journal::JournalId;
use crate::core::partner::{Partner, PartnerBook, PartnerId};
use crate::core::statement::StatementLine;
use crate::matching::context::MatchContext;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for generating a random reconciliation scenario.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Number of partners to create.
    pub partner_count: usize,
    /// Number of open invoices in the candidate pool.
    pub invoice_count: usize,
    /// Number of statement lines in the batch.
    pub line_count: usize,
    /// Share of statement lines whose label carries an invoice
    /// reference, in `0.0..=1.0`.
    pub reference_hit_ratio: f64,
    /// Minimum invoice amount.
    pub min_amount: Decimal,
    /// Maximum invoice amount.
    pub max_amount: Decimal,
    /// Company currency.
    pub currency: CurrencyCode,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            partner_count: 10,
            invoice_count: 50,
            line_count: 40,
            reference_hit_ratio: 0.6,
            min_amount: Decimal::from(50),
            max_amount: Decimal::from(25_000),
            currency: CurrencyCode::new("USD"),
        }
    }
}

/// A generated batch: reference data, open invoices, statement lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub context: MatchContext,
    pub candidates: Vec<CandidateLine>,
    pub lines: Vec<StatementLine>,
}

/// Generate a random reconciliation scenario.
pub fn generate_scenario(config: &ScenarioConfig) -> Scenario {
    let mut rng = rand::thread_rng();

    let mut partners = PartnerBook::new();
    let partner_ids: Vec<PartnerId> = (0..config.partner_count)
        .map(|i| {
            let id = PartnerId::new(format!("PARTNER-{:03}", i));
            partners.insert(Partner::new(
                id.clone(),
                format!("Partner {:03}", i),
                AccountId::new("121000"),
                AccountId::new("211000"),
            ));
            id
        })
        .collect();

    let journal = JournalId::new("BNK1");
    let mut context = MatchContext::new(CurrencyTable::new(config.currency.clone()))
        .with_partners(partners);
    context.set_journal_account(journal.clone(), AccountId::new("101401"));

    let min_f64: f64 = config.min_amount.to_string().parse().unwrap_or(50.0);
    let max_f64: f64 = config.max_amount.to_string().parse().unwrap_or(25_000.0);

    let mut candidates = Vec::with_capacity(config.invoice_count);
    for i in 0..config.invoice_count {
        let reference = format!("INV/2026/{:04}", i + 1);
        let amount_f64 = rng.gen_range(min_f64..max_f64);
        let residual = Decimal::from_f64_retain(amount_f64)
            .unwrap_or(Decimal::from(100))
            .round_dp(2);
        let partner = &partner_ids[rng.gen_range(0..partner_ids.len())];
        candidates.push(
            CandidateLine::new(
                reference.clone(),
                DocumentKind::CustomerInvoice,
                AccountId::new("121000"),
                residual,
            )
            .with_reference(reference)
            .with_partner(partner.clone()),
        );
    }

    let mut lines = Vec::with_capacity(config.line_count);
    for i in 0..config.line_count {
        let hit = !candidates.is_empty() && rng.gen_bool(config.reference_hit_ratio);
        let line = if hit {
            // Pay a random invoice in full, quoting its reference.
            let invoice = &candidates[rng.gen_range(0..candidates.len())];
            let reference = invoice.reference().unwrap_or(invoice.label());
            let mut line = StatementLine::new(
                format!("WIRE {} SEQ{:04}", reference, i),
                invoice.residual(),
                journal.clone(),
            );
            if let Some(partner) = invoice.partner() {
                line = line.with_partner(partner.clone());
            }
            line
        } else {
            let amount_f64 = rng.gen_range(min_f64..max_f64);
            let amount = Decimal::from_f64_retain(amount_f64)
                .unwrap_or(Decimal::from(100))
                .round_dp(2);
            StatementLine::new(format!("TRANSFER SEQ{:04}", i), amount, journal.clone())
        };
        lines.push(line);
    }

    Scenario {
        context,
        candidates,
        lines,
    }
}
