use crate::core::account::AccountId;
use crate::core::candidate::CandidateLine;
use crate::core::currency::{CurrencyCode, CurrencyTable};
use crate::core::journal::JournalLine;
use crate::core::statement::StatementLine;
use crate::matching::context::MatchContext;
use crate::rules::model::{ReconcileModel, WriteOffAmount, WriteOffTemplate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Generate the write-off counter lines for a statement line.
///
/// The leftover balance is the statement amount minus the residuals of
/// the already-proposed candidates. No lines are generated when the
/// rule has no write-off account, when the leftover rounds to zero, or
/// when it is negative (the match over-covers the line).
///
/// The first line takes the template amount (fixed, or a percentage of
/// the leftover) as a credit when positive, a debit when negative; its
/// optional tax line follows. A configured second line absorbs
/// whatever the first part left over, so the generated split always
/// balances against the leftover within currency rounding.
pub fn write_off_lines(
    model: &ReconcileModel,
    line: &StatementLine,
    matched: &[&CandidateLine],
    ctx: &MatchContext,
) -> Vec<JournalLine> {
    let Some(account) = model.write_off.account.clone() else {
        return Vec::new();
    };

    let currency = ctx.line_currency(line);
    let total_residual: Decimal = matched.iter().map(|c| c.residual()).sum();
    let balance = line.amount() - total_residual;
    if ctx.currencies.is_zero(balance, &currency) || balance < Decimal::ZERO {
        return Vec::new();
    }

    let mut lines = Vec::new();

    let first_amount = match &model.write_off.amount {
        WriteOffAmount::Percentage(pct) => {
            ctx.currencies.round(balance * pct / dec!(100), &currency)
        }
        WriteOffAmount::Fixed(amount) => *amount,
    };
    push_template_lines(
        &mut lines,
        &model.write_off,
        account,
        first_amount,
        &ctx.currencies,
        &currency,
        ctx,
    );

    if let Some(second) = &model.second_write_off {
        if let Some(second_account) = second.account.clone() {
            // The second part absorbs whatever the first part (and its
            // tax) did not: credited minus debited so far.
            let absorbed: Decimal = lines.iter().map(|l| l.credit - l.debit).sum();
            let remaining = ctx.currencies.round(balance - absorbed, &currency);
            if !ctx.currencies.is_zero(remaining, &currency) {
                push_template_lines(
                    &mut lines,
                    second,
                    second_account,
                    remaining,
                    &ctx.currencies,
                    &currency,
                    ctx,
                );
            }
        }
    }

    lines
}

/// Push one template line (credit-positive amount convention) plus its
/// tax line, if any.
fn push_template_lines(
    lines: &mut Vec<JournalLine>,
    template: &WriteOffTemplate,
    account: AccountId,
    amount: Decimal,
    currencies: &CurrencyTable,
    currency: &CurrencyCode,
    ctx: &MatchContext,
) {
    let make_line = |balance: Decimal| {
        // Credit-positive: a positive template amount credits the account.
        if balance >= Decimal::ZERO {
            JournalLine::credit(&template.label, account.clone(), balance)
        } else {
            JournalLine::debit(&template.label, account.clone(), -balance)
        }
    };

    let mut base_line = make_line(amount);

    let tax = template.tax.as_ref().and_then(|id| {
        let tax = ctx.taxes.get(id);
        if tax.is_none() {
            log::warn!("write-off template references unknown tax '{}'", id);
        }
        tax
    });

    let Some(tax) = tax else {
        lines.push(base_line);
        return;
    };

    base_line.taxes = vec![tax.id.clone()];
    let split = tax.compute(
        base_line.balance(),
        template.force_tax_included,
        currencies,
        currency,
    );
    let included = tax.price_include || template.force_tax_included;
    if included {
        // Carve the tax out of the base line so base + tax still
        // matches the template amount.
        let mut adjusted = make_line(-split.base);
        adjusted.taxes = vec![tax.id.clone()];
        base_line = adjusted;
    }
    lines.push(base_line);

    if !currencies.is_zero(split.tax, currency) {
        let tax_account = tax.account.clone().unwrap_or(account);
        let tax_line = if split.tax > Decimal::ZERO {
            JournalLine::debit(&tax.name, tax_account, split.tax)
        } else {
            JournalLine::credit(&tax.name, tax_account, -split.tax)
        };
        lines.push(tax_line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account::AccountId;
    use crate::core::candidate::DocumentKind;
    use crate::core::currency::CurrencyTable;
    use crate::core::journal::JournalId;
    use crate::core::tax::{Tax, TaxId};
    use crate::rules::model::RuleType;

    fn ctx() -> MatchContext {
        MatchContext::new(CurrencyTable::new(CurrencyCode::new("USD")))
    }

    fn fee_model() -> ReconcileModel {
        ReconcileModel::new(1, "Bank fees", RuleType::WriteOff)
            .with_write_off(WriteOffTemplate::new(AccountId::new("627000"), "Bank fees"))
    }

    fn line(amount: Decimal) -> StatementLine {
        StatementLine::new("FEE", amount, JournalId::new("BNK1"))
    }

    #[test]
    fn test_full_percentage_write_off() {
        let lines = write_off_lines(&fee_model(), &line(dec!(12.50)), &[], &ctx());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].credit, dec!(12.50));
        assert_eq!(lines[0].debit, dec!(0));
        assert_eq!(lines[0].account, AccountId::new("627000"));
    }

    #[test]
    fn test_no_account_no_lines() {
        let model = ReconcileModel::new(1, "x", RuleType::WriteOff);
        assert!(write_off_lines(&model, &line(dec!(10)), &[], &ctx()).is_empty());
    }

    #[test]
    fn test_negative_leftover_no_lines() {
        // Candidates already over-cover the line.
        let inv = CandidateLine::new(
            "INV",
            DocumentKind::CustomerInvoice,
            AccountId::new("121000"),
            dec!(120),
        );
        assert!(write_off_lines(&fee_model(), &line(dec!(100)), &[&inv], &ctx()).is_empty());
    }

    #[test]
    fn test_zero_leftover_no_lines() {
        let inv = CandidateLine::new(
            "INV",
            DocumentKind::CustomerInvoice,
            AccountId::new("121000"),
            dec!(100),
        );
        assert!(write_off_lines(&fee_model(), &line(dec!(100.004)), &[&inv], &ctx()).is_empty());
    }

    #[test]
    fn test_partial_percentage_with_second_line() {
        let model = ReconcileModel::new(1, "Split", RuleType::WriteOff)
            .with_write_off(
                WriteOffTemplate::new(AccountId::new("700000"), "Sales")
                    .with_amount(WriteOffAmount::Percentage(dec!(60))),
            )
            .with_second_write_off(WriteOffTemplate::new(AccountId::new("700100"), "Other"));
        let lines = write_off_lines(&model, &line(dec!(100)), &[], &ctx());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].credit, dec!(60));
        assert_eq!(lines[1].credit, dec!(40));
        let credited: Decimal = lines.iter().map(|l| l.credit - l.debit).sum();
        assert_eq!(credited, dec!(100));
    }

    #[test]
    fn test_exclusive_tax_adds_line() {
        let mut context = ctx();
        context.taxes.insert(
            Tax::new(TaxId::new("VAT10"), "VAT 10%", dec!(10))
                .with_account(AccountId::new("451000")),
        );
        let model = ReconcileModel::new(1, "Fees", RuleType::WriteOff).with_write_off(
            WriteOffTemplate::new(AccountId::new("627000"), "Bank fees")
                .with_tax(TaxId::new("VAT10")),
        );
        let lines = write_off_lines(&model, &line(dec!(100)), &[], &context);
        assert_eq!(lines.len(), 2);
        // Base line keeps the full amount; tax is credited on top.
        assert_eq!(lines[0].credit, dec!(100));
        assert_eq!(lines[0].taxes, vec![TaxId::new("VAT10")]);
        assert_eq!(lines[1].credit, dec!(10));
        assert_eq!(lines[1].account, AccountId::new("451000"));
    }

    #[test]
    fn test_included_tax_splits_base() {
        let mut context = ctx();
        context
            .taxes
            .insert(Tax::new(TaxId::new("VAT21"), "VAT 21%", dec!(21)).price_included());
        let model = ReconcileModel::new(1, "Fees", RuleType::WriteOff).with_write_off(
            WriteOffTemplate::new(AccountId::new("627000"), "Bank fees")
                .with_tax(TaxId::new("VAT21")),
        );
        let lines = write_off_lines(&model, &line(dec!(121)), &[], &context);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].credit, dec!(100));
        assert_eq!(lines[1].credit, dec!(21));
        let credited: Decimal = lines.iter().map(|l| l.credit - l.debit).sum();
        assert_eq!(credited, dec!(121));
    }

    #[test]
    fn test_fixed_amount_write_off() {
        let model = ReconcileModel::new(1, "Fixed", RuleType::WriteOff).with_write_off(
            WriteOffTemplate::new(AccountId::new("627000"), "Charge")
                .with_amount(WriteOffAmount::Fixed(dec!(7.5))),
        );
        let lines = write_off_lines(&model, &line(dec!(100)), &[], &ctx());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].credit, dec!(7.5));
    }
}
