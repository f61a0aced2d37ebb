//! Basic invoice matching example.
//!
//! Demonstrates how the engine pairs incoming bank transactions with
//! open invoices, by reference or by partner, and posts balanced
//! entries for auto-reconcile rules.

use reconcile_engine::core::account::AccountId;
use reconcile_engine::core::candidate::{CandidateLine, DocumentKind};
use reconcile_engine::core::currency::{CurrencyCode, CurrencyTable};
use reconcile_engine::core::journal::JournalId;
use reconcile_engine::core::partner::{Partner, PartnerBook, PartnerId};
use reconcile_engine::core::statement::StatementLine;
use reconcile_engine::matching::context::MatchContext;
use reconcile_engine::matching::matcher::{MatchOptions, MatchStatus, ReconcileEngine};
use reconcile_engine::rules::model::{ReconcileModel, RuleType};
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  reconcile-engine: Basic Matching Example     ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // --- Reference data ---
    let mut partners = PartnerBook::new();
    partners.insert(Partner::new(
        PartnerId::new("ACME"),
        "Acme Corp",
        AccountId::new("121000"),
        AccountId::new("211000"),
    ));
    partners.insert(Partner::new(
        PartnerId::new("GLOBEX"),
        "Globex LLC",
        AccountId::new("121000"),
        AccountId::new("211000"),
    ));

    let mut ctx = MatchContext::new(CurrencyTable::new(CurrencyCode::new("USD")))
        .with_partners(partners);
    ctx.set_journal_account(JournalId::new("BNK1"), AccountId::new("101401"));

    // --- Open invoices ---
    let invoices = vec![
        CandidateLine::new(
            "INV/2026/0042",
            DocumentKind::CustomerInvoice,
            AccountId::new("121000"),
            dec!(1210.00),
        )
        .with_reference("INV/2026/0042")
        .with_partner(PartnerId::new("ACME")),
        CandidateLine::new(
            "INV/2026/0057",
            DocumentKind::CustomerInvoice,
            AccountId::new("121000"),
            dec!(350.75),
        )
        .with_reference("INV/2026/0057")
        .with_partner(PartnerId::new("GLOBEX")),
    ];

    // --- Incoming bank transactions ---
    let lines = vec![
        // Quotes the invoice number: matched by communication.
        StatementLine::new("WIRE INV 2026 0042", dec!(1210.00), JournalId::new("BNK1")),
        // No reference, but the importer identified the partner.
        StatementLine::new("TRANSFER GLOBEX", dec!(350.75), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("GLOBEX")),
        // Nothing to go on.
        StatementLine::new("UNKNOWN DEPOSIT", dec!(75.00), JournalId::new("BNK1")),
    ];

    // --- Rules ---
    let engine = ReconcileEngine::new(vec![
        ReconcileModel::new(1, "Invoice matching", RuleType::Invoices).auto_reconciling(),
    ])
    .expect("valid rules");

    let results = engine.run(&lines, &invoices, &ctx, &MatchOptions::new());

    println!("━━━ Results ━━━\n");
    for (line, result) in lines.iter().zip(&results) {
        println!("Line: {:<24} {:>10}", line.label(), line.amount());
        match result.status {
            MatchStatus::Reconciled => {
                let entry = result.entry.as_ref().expect("posted entry");
                println!(
                    "  → reconciled by '{}' ({} candidates, entry of {} lines)",
                    result.model_name.as_deref().unwrap_or("-"),
                    result.candidate_ids.len(),
                    entry.len()
                );
                for jl in entry.lines() {
                    println!(
                        "      {:<32} D {:>10}  C {:>10}",
                        jl.label, jl.debit, jl.credit
                    );
                }
            }
            MatchStatus::WriteOff => println!("  → write-off suggested"),
            MatchStatus::None => println!("  → no match"),
        }
        println!();
    }
}
