use crate::core::candidate::CandidateLine;
use crate::core::journal::{JournalEntry, JournalId, JournalLine};
use crate::core::partner::PartnerId;
use crate::core::statement::StatementLine;
use crate::matching::context::MatchContext;
use crate::matching::writeoff::write_off_lines;
use crate::rules::model::ReconcileModel;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use thiserror::Error;

/// Errors arising while posting a reconciling entry.
///
/// Posting failures are per statement line; they never abort the batch.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no liquidity account configured for journal '{journal}'")]
    MissingJournalAccount { journal: JournalId },
    #[error("entry for '{label}' does not balance: debit {debit} != credit {credit}")]
    UnbalancedEntry {
        label: String,
        debit: Decimal,
        credit: Decimal,
    },
}

/// Whether a residual open-balance line is needed, and on what.
#[derive(Debug, Clone)]
pub enum OpenBalance {
    /// Candidates and write-offs cover the statement amount exactly.
    NotNeeded,
    /// The leftover, attributed to the partner's receivable or payable
    /// account.
    Line(JournalLine),
    /// A leftover exists but no partner could be determined to carry
    /// it. The line must not be auto-posted.
    MissingPartner,
}

/// Everything needed to post a reconciling entry for one line.
#[derive(Debug, Clone)]
pub struct PreparedReconciliation {
    /// One counterpart line per matched candidate, reversing its
    /// residual.
    pub counterparts: Vec<JournalLine>,
    /// Generated write-off lines.
    pub write_off: Vec<JournalLine>,
    pub open_balance: OpenBalance,
}

impl PreparedReconciliation {
    /// Whether auto-posting is allowed for this preparation.
    pub fn can_post(&self) -> bool {
        !matches!(self.open_balance, OpenBalance::MissingPartner)
    }

    /// Whether there is anything to post at all.
    pub fn is_empty(&self) -> bool {
        self.counterparts.is_empty() && self.write_off.is_empty()
    }
}

/// Assemble the counterpart, write-off and open-balance lines for a
/// statement line matched by `model` against `matched` candidates.
pub fn prepare(
    model: &ReconcileModel,
    line: &StatementLine,
    matched: &[&CandidateLine],
    partner_override: Option<&PartnerId>,
    ctx: &MatchContext,
) -> PreparedReconciliation {
    let currency = ctx.line_currency(line);

    let mut counterparts = Vec::with_capacity(matched.len());
    for candidate in matched {
        let residual = candidate.residual();
        let mut counterpart = if residual > Decimal::ZERO {
            JournalLine::credit(candidate.display_label(), candidate.account().clone(), residual)
        } else {
            JournalLine::debit(candidate.display_label(), candidate.account().clone(), -residual)
        };
        if let Some(partner) = candidate.partner() {
            counterpart = counterpart.with_partner(partner.clone());
        }
        counterparts.push(counterpart);
    }

    let write_off = write_off_lines(model, line, matched, ctx);

    // Covered = candidate residuals plus what the write-off lines
    // credit (their balance is debit-minus-credit, hence the minus).
    let mut covered: Decimal = matched.iter().map(|c| c.residual()).sum();
    covered -= write_off.iter().map(|l| l.balance()).sum::<Decimal>();

    let open_balance = if ctx.currencies.compare(line.amount(), covered, &currency) != Ordering::Equal
    {
        let partner = partner_override
            .or_else(|| line.partner())
            .and_then(|id| ctx.partners.get(id));
        match partner {
            None => OpenBalance::MissingPartner,
            Some(partner) => {
                let balance = covered - line.amount();
                let account = if balance < Decimal::ZERO {
                    partner.payable_account.clone()
                } else {
                    partner.receivable_account.clone()
                };
                let label = format!("{} : Open Balance", line.label());
                let open_line = if balance > Decimal::ZERO {
                    JournalLine::debit(label, account, balance)
                } else {
                    JournalLine::credit(label, account, -balance)
                };
                OpenBalance::Line(open_line.with_partner(partner.id.clone()))
            }
        }
    } else {
        OpenBalance::NotNeeded
    };

    PreparedReconciliation {
        counterparts,
        write_off,
        open_balance,
    }
}

/// Post the reconciling entry for a statement line.
///
/// The entry carries the bank liquidity line, the counterparts, the
/// write-off lines and the open-balance line when one is needed. It
/// must balance at the line currency's precision.
pub fn post(
    line: &StatementLine,
    prepared: &PreparedReconciliation,
    ctx: &MatchContext,
) -> Result<JournalEntry, ReconcileError> {
    let liquidity_account = ctx
        .journal_account(line.journal())
        .ok_or_else(|| ReconcileError::MissingJournalAccount {
            journal: line.journal().clone(),
        })?
        .clone();

    let mut entry = JournalEntry::new();

    let amount = line.amount();
    let mut bank_line = if amount >= Decimal::ZERO {
        JournalLine::debit(line.label(), liquidity_account, amount)
    } else {
        JournalLine::credit(line.label(), liquidity_account, -amount)
    };
    if let Some(partner) = line.partner() {
        bank_line = bank_line.with_partner(partner.clone());
    }
    entry.push(bank_line);

    entry.extend(prepared.counterparts.iter().cloned());
    entry.extend(prepared.write_off.iter().cloned());
    if let OpenBalance::Line(open_line) = &prepared.open_balance {
        entry.push(open_line.clone());
    }

    let currency = ctx.line_currency(line);
    if !entry.is_balanced_in(&ctx.currencies, &currency) {
        return Err(ReconcileError::UnbalancedEntry {
            label: line.label().to_string(),
            debit: entry.total_debit(),
            credit: entry.total_credit(),
        });
    }
    Ok(entry)
}
