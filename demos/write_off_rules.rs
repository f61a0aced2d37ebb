//! Write-off rule example.
//!
//! Demonstrates rules that sweep recurring bank charges straight to
//! expense accounts, including a two-line split and a tax line.

use reconcile_engine::core::account::AccountId;
use reconcile_engine::core::currency::{CurrencyCode, CurrencyTable};
use reconcile_engine::core::journal::JournalId;
use reconcile_engine::core::statement::StatementLine;
use reconcile_engine::core::tax::{Tax, TaxId, TaxTable};
use reconcile_engine::matching::context::MatchContext;
use reconcile_engine::matching::matcher::{MatchOptions, ReconcileEngine};
use reconcile_engine::rules::model::{
    AmountCondition, AmountNature, LabelCondition, ReconcileModel, RuleType, WriteOffAmount,
    WriteOffTemplate,
};
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  reconcile-engine: Write-off Rules Example    ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let mut taxes = TaxTable::new();
    taxes.insert(
        Tax::new(TaxId::new("VAT21"), "VAT 21%", dec!(21))
            .price_included()
            .with_account(AccountId::new("451000")),
    );

    let mut ctx = MatchContext::new(CurrencyTable::new(CurrencyCode::new("USD")))
        .with_taxes(taxes);
    ctx.set_journal_account(JournalId::new("BNK1"), AccountId::new("101401"));

    let engine = ReconcileEngine::new(vec![
        // Small interest credits, swept automatically with VAT carved out.
        ReconcileModel::new(1, "Bank interest", RuleType::WriteOff)
            .with_sequence(5)
            .auto_reconciling()
            .with_nature(AmountNature::Received)
            .with_amount(AmountCondition::Lower(dec!(50)))
            .with_label(LabelCondition::Contains("interest".into()))
            .with_write_off(
                WriteOffTemplate::new(AccountId::new("753000"), "Interest income")
                    .with_tax(TaxId::new("VAT21")),
            ),
        // Incoming settlements split 80/20 across two revenue accounts.
        ReconcileModel::new(2, "Commission split", RuleType::WriteOff)
            .with_sequence(10)
            .auto_reconciling()
            .with_label(LabelCondition::Contains("COMMISSION".into()))
            .with_write_off(
                WriteOffTemplate::new(AccountId::new("706000"), "Commission")
                    .with_amount(WriteOffAmount::Percentage(dec!(80))),
            )
            .with_second_write_off(WriteOffTemplate::new(
                AccountId::new("706100"),
                "Commission share",
            )),
    ])
    .expect("valid rules");

    let lines = vec![
        StatementLine::new("interest Q2", dec!(12.10), JournalId::new("BNK1")),
        StatementLine::new("COMMISSION MARCH", dec!(500.00), JournalId::new("BNK1")),
        StatementLine::new("regular deposit", dec!(75.00), JournalId::new("BNK1")),
    ];

    let results = engine.run(&lines, &[], &ctx, &MatchOptions::new());

    println!("━━━ Results ━━━\n");
    for (line, result) in lines.iter().zip(&results) {
        println!("Line: {:<20} {:>8}", line.label(), line.amount());
        match &result.entry {
            Some(entry) => {
                println!(
                    "  → reconciled by '{}'",
                    result.model_name.as_deref().unwrap_or("-")
                );
                for jl in entry.lines() {
                    println!(
                        "      {:<24} D {:>8}  C {:>8}",
                        jl.label, jl.debit, jl.credit
                    );
                }
            }
            None => println!("  → no match"),
        }
        println!();
    }
}
