use reconcile_engine::core::account::AccountId;
use reconcile_engine::core::candidate::{CandidateLine, DocumentKind};
use reconcile_engine::core::currency::{CurrencyCode, CurrencyTable};
use reconcile_engine::core::journal::JournalId;
use reconcile_engine::core::partner::{Partner, PartnerBook, PartnerId};
use reconcile_engine::core::statement::StatementLine;
use reconcile_engine::matching::context::MatchContext;
use reconcile_engine::matching::matcher::{MatchOptions, MatchStatus, ReconcileEngine};
use reconcile_engine::rules::model::{
    AmountCondition, AmountNature, LabelCondition, ReconcileModel, RuleType, WriteOffTemplate,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn company_context() -> MatchContext {
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
    ctx
}

fn standard_rules() -> Vec<ReconcileModel> {
    vec![
        // Small incoming interest amounts, auto write-off.
        ReconcileModel::new(1, "Bank interest", RuleType::WriteOff)
            .with_sequence(5)
            .auto_reconciling()
            .with_nature(AmountNature::Received)
            .with_amount(AmountCondition::Lower(dec!(5)))
            .with_label(LabelCondition::Contains("interest".into()))
            .with_write_off(WriteOffTemplate::new(AccountId::new("753000"), "Interest")),
        // Outgoing bank fees, suggestion only.
        ReconcileModel::new(2, "Bank fees", RuleType::WriteOff)
            .with_sequence(8)
            .with_nature(AmountNature::Paid)
            .with_label(LabelCondition::Contains("FEE".into()))
            .with_write_off(WriteOffTemplate::new(AccountId::new("627000"), "Bank fees")),
        // Everything else tries the invoice pool.
        ReconcileModel::new(3, "Invoice matching", RuleType::Invoices)
            .with_sequence(10)
            .auto_reconciling(),
    ]
}

/// Full pipeline: a mixed statement batch against fee, interest and
/// invoice rules.
#[test]
fn full_pipeline_mixed_batch() {
    let ctx = company_context();
    let engine = ReconcileEngine::new(standard_rules()).unwrap();

    let invoice = CandidateLine::new(
        "INV/2026/0042",
        DocumentKind::CustomerInvoice,
        AccountId::new("121000"),
        dec!(1210),
    )
    .with_reference("INV/2026/0042")
    .with_partner(PartnerId::new("ACME"));
    let bill = CandidateLine::new(
        "BILL/2026/0007",
        DocumentKind::VendorBill,
        AccountId::new("211000"),
        dec!(-480),
    )
    .with_reference("BILL/2026/0007")
    .with_partner(PartnerId::new("GLOBEX"));
    let candidates = vec![invoice.clone(), bill.clone()];

    let lines = vec![
        StatementLine::new("interest Q1", dec!(1.37), JournalId::new("BNK1")),
        StatementLine::new("FEE wire transfer", dec!(-12.50), JournalId::new("BNK1")),
        StatementLine::new("WIRE INV 2026 0042", dec!(1210), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("ACME")),
        StatementLine::new("PAYMENT BILL 2026 0007", dec!(-480), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("GLOBEX")),
        StatementLine::new("UNKNOWN DEPOSIT", dec!(9999), JournalId::new("BNK1")),
    ];

    let results = engine.run(&lines, &candidates, &ctx, &MatchOptions::new());
    assert_eq!(results.len(), 5);

    // Interest: auto write-off, balanced entry posted.
    assert_eq!(results[0].model, Some(1));
    assert_eq!(results[0].status, MatchStatus::Reconciled);
    let entry = results[0].entry.as_ref().unwrap();
    assert!(entry.is_balanced());
    assert_eq!(entry.total_debit(), dec!(1.37));

    // Fee: the rule claims the line but generates no lines for an
    // outgoing leftover; the operator completes it manually.
    assert_eq!(results[1].model, Some(2));
    assert_eq!(results[1].status, MatchStatus::WriteOff);
    assert!(results[1].entry.is_none());
    assert!(results[1].write_off.is_empty());

    // Invoice paid in full by reference.
    assert_eq!(results[2].model, Some(3));
    assert_eq!(results[2].status, MatchStatus::Reconciled);
    assert_eq!(results[2].candidate_ids, vec![invoice.id()]);
    assert!(results[2].entry.as_ref().unwrap().is_balanced());

    // Vendor bill paid out.
    assert_eq!(results[3].model, Some(3));
    assert_eq!(results[3].status, MatchStatus::Reconciled);
    assert_eq!(results[3].candidate_ids, vec![bill.id()]);

    // Unmatched deposit.
    assert!(results[4].model.is_none());
    assert_eq!(results[4].status, MatchStatus::None);
}

/// A partial payment posts an open-balance line on the partner's
/// receivable account and the entry still balances.
#[test]
fn partial_payment_open_balance() {
    let ctx = company_context();
    let engine = ReconcileEngine::new(vec![
        ReconcileModel::new(1, "Invoices", RuleType::Invoices)
            .auto_reconciling()
            .with_total_amount_param(dec!(50)),
    ])
    .unwrap();

    let invoice = CandidateLine::new(
        "INV/2026/0042",
        DocumentKind::CustomerInvoice,
        AccountId::new("121000"),
        dec!(1000),
    )
    .with_reference("INV/2026/0042")
    .with_partner(PartnerId::new("ACME"));

    let lines = vec![
        StatementLine::new("WIRE 20260042 partial", dec!(1600), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("ACME")),
    ];

    let results = engine.run(&lines, &[invoice], &ctx, &MatchOptions::new());
    assert_eq!(results[0].status, MatchStatus::Reconciled);

    let entry = results[0].entry.as_ref().unwrap();
    assert!(entry.is_balanced());
    // Bank debit 1600, invoice credit 1000, overpayment credited on
    // the payable account.
    assert_eq!(entry.total_debit(), dec!(1600));
    let open = entry
        .lines()
        .iter()
        .find(|l| l.label.ends_with(": Open Balance"))
        .unwrap();
    assert_eq!(open.credit, dec!(600));
    assert_eq!(open.account, AccountId::new("211000"));
}

/// Two lines competing for one invoice: the first claims it, the
/// second degrades to no proposal even under an auto rule.
#[test]
fn batch_never_double_spends_a_candidate() {
    let ctx = company_context();
    let engine = ReconcileEngine::new(vec![
        ReconcileModel::new(1, "Invoices", RuleType::Invoices).auto_reconciling(),
    ])
    .unwrap();

    let invoice = CandidateLine::new(
        "INV/2026/0042",
        DocumentKind::CustomerInvoice,
        AccountId::new("121000"),
        dec!(500),
    )
    .with_reference("INV/2026/0042")
    .with_partner(PartnerId::new("ACME"));

    let lines = vec![
        StatementLine::new("WIRE 20260042", dec!(500), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("ACME")),
        StatementLine::new("WIRE 20260042 duplicate", dec!(500), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("ACME")),
    ];

    let results = engine.run(&lines, &[invoice.clone()], &ctx, &MatchOptions::new());
    assert_eq!(results[0].status, MatchStatus::Reconciled);
    assert_eq!(results[0].candidate_ids, vec![invoice.id()]);

    assert!(results[1].candidate_ids.is_empty());
    assert!(results[1].entry.is_none());

    let claimed: usize = results.iter().map(|r| r.candidate_ids.len()).sum();
    assert_eq!(claimed, 1);
}

/// Rules order: a lower sequence wins even with a higher id.
#[test]
fn rule_sequence_takes_precedence() {
    let ctx = company_context();
    let engine = ReconcileEngine::new(vec![
        ReconcileModel::new(9, "Specific fees", RuleType::WriteOff)
            .with_sequence(1)
            .with_label(LabelCondition::Contains("FEE".into()))
            .with_write_off(WriteOffTemplate::new(AccountId::new("627100"), "Fees")),
        ReconcileModel::new(1, "Catch-all", RuleType::WriteOff)
            .with_sequence(50)
            .with_write_off(WriteOffTemplate::new(AccountId::new("627000"), "Misc")),
    ])
    .unwrap();

    let lines = vec![StatementLine::new("FEE q2", dec!(-3), JournalId::new("BNK1"))];
    let results = engine.run(&lines, &[], &ctx, &MatchOptions::new());
    assert_eq!(results[0].model_name.as_deref(), Some("Specific fees"));
}

/// Statement lines and rules survive a JSON round trip with defaults
/// filled in.
#[test]
fn statement_line_json_round_trip() {
    let line = StatementLine::new("WIRE 42", dec!(-350.25), JournalId::new("BNK1"))
        .with_partner(PartnerId::new("ACME"));

    let json = serde_json::to_string(&line).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["label"], "WIRE 42");
    assert_eq!(parsed["amount"], "-350.25");
    assert_eq!(parsed["journal"], "BNK1");
    assert_eq!(parsed["partner"], "ACME");

    let back: StatementLine = serde_json::from_str(&json).unwrap();
    assert_eq!(back.amount(), dec!(-350.25));
    assert_eq!(back.id(), line.id());
}

/// A rules file parses with sparse JSON, leaving defaults in place.
#[test]
fn rules_parse_from_sparse_json() {
    let json = r#"[
        {"id": 1, "name": "Fees", "rule_type": "write_off",
         "match_label": {"contains": "FEE"},
         "write_off": {"account": "627000", "label": "Bank fees"}},
        {"id": 2, "name": "Invoices", "rule_type": "invoices", "auto_reconcile": true}
    ]"#;
    let models: Vec<ReconcileModel> = serde_json::from_str(json).unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].write_off.account, Some(AccountId::new("627000")));
    assert_eq!(models[0].sequence, 10);
    assert!(models[1].auto_reconcile);

    let engine = ReconcileEngine::new(models).unwrap();
    assert_eq!(engine.len(), 2);
}

/// Match results serialize to JSON with the fields the CLI prints.
#[test]
fn match_results_serialize() {
    let ctx = company_context();
    let engine = ReconcileEngine::new(standard_rules()).unwrap();
    let lines = vec![StatementLine::new("interest", dec!(2), JournalId::new("BNK1"))];
    let results = engine.run(&lines, &[], &ctx, &MatchOptions::new());

    let json = serde_json::to_string_pretty(&results).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["status"], "reconciled");
    assert_eq!(parsed[0]["model"], 1);
    assert!(parsed[0]["entry"].is_object());
}

/// An invalid regex in any rule fails engine construction.
#[test]
fn invalid_regex_rejected_at_construction() {
    let result = ReconcileEngine::new(vec![
        ReconcileModel::new(1, "Broken", RuleType::Invoices)
            .with_label(LabelCondition::MatchRegex("[unclosed".into())),
    ]);
    assert!(result.is_err());
}

/// Residual sums respect currency precision when posting.
#[test]
fn sub_cent_difference_still_balances() {
    let ctx = company_context();
    let engine = ReconcileEngine::new(vec![
        ReconcileModel::new(1, "Invoices", RuleType::Invoices).auto_reconciling(),
    ])
    .unwrap();

    let invoice = CandidateLine::new(
        "INV/2026/0042",
        DocumentKind::CustomerInvoice,
        AccountId::new("121000"),
        dec!(100.004),
    )
    .with_reference("INV/2026/0042")
    .with_partner(PartnerId::new("ACME"));

    let lines = vec![
        StatementLine::new("WIRE 20260042", dec!(100.00), JournalId::new("BNK1"))
            .with_partner(PartnerId::new("ACME")),
    ];
    let results = engine.run(&lines, &[invoice], &ctx, &MatchOptions::new());
    assert_eq!(results[0].status, MatchStatus::Reconciled);

    let entry = results[0].entry.as_ref().unwrap();
    // Not exactly equal, but equal at 2 decimal places.
    let diff = (entry.total_debit() - entry.total_credit()).abs();
    assert!(diff < Decimal::new(5, 3));
    assert!(entry.is_balanced_in(&ctx.currencies, &CurrencyCode::new("USD")));
}
