use crate::core::candidate::CandidateLine;
use crate::core::journal::{JournalEntry, JournalLine};
use crate::core::partner::PartnerId;
use crate::core::statement::StatementLine;
use crate::matching::context::MatchContext;
use crate::matching::executor;
use crate::matching::writeoff::write_off_lines;
use crate::rules::filter::{RuleError, RuleFilter};
use crate::rules::model::{ReconcileModel, RuleType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Outcome of matching one statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// No rule claimed the line.
    #[default]
    None,
    /// A write-off (or a degraded match) is suggested but nothing was
    /// posted.
    WriteOff,
    /// A balanced entry was posted.
    Reconciled,
}

/// Per-line result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub line_id: Uuid,
    /// Id of the rule that claimed the line, if any.
    pub model: Option<u32>,
    pub model_name: Option<String>,
    /// Candidate ledger lines proposed for the match.
    pub candidate_ids: Vec<Uuid>,
    /// Generated write-off lines (suggested or posted).
    pub write_off: Vec<JournalLine>,
    pub status: MatchStatus,
    /// The posted entry when `status` is `Reconciled`.
    pub entry: Option<JournalEntry>,
}

impl MatchResult {
    fn empty(line_id: Uuid) -> Self {
        Self {
            line_id,
            model: None,
            model_name: None,
            candidate_ids: Vec::new(),
            write_off: Vec::new(),
            status: MatchStatus::None,
            entry: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.model.is_some()
    }
}

/// Caller-supplied adjustments to a batch run.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Candidate lines to leave out entirely (e.g. already consumed by
    /// a previous batch).
    pub excluded: HashSet<Uuid>,
    /// Per-line partner overrides, keyed by statement line id.
    pub partner_map: HashMap<Uuid, PartnerId>,
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, candidate_id: Uuid) -> Self {
        self.excluded.insert(candidate_id);
        self
    }

    pub fn map_partner(mut self, line_id: Uuid, partner: PartnerId) -> Self {
        self.partner_map.insert(line_id, partner);
        self
    }
}

struct CompiledRule {
    model: ReconcileModel,
    filter: RuleFilter,
}

/// The batch reconciliation matcher.
///
/// Holds the configured rules, compiled and ordered by
/// `(sequence, id)`. Manual rules are dropped at construction; they
/// only ever run from an operator's explicit action.
///
/// A batch run walks every statement line through the ordered rules
/// and stops at the first rule that claims it. Candidate ledger lines
/// are never double-claimed: a candidate consumed by an earlier rule
/// degrades a later rule from auto-reconcile to suggestion-only, and a
/// candidate that was already reconciled in this batch is not proposed
/// again at all.
pub struct ReconcileEngine {
    rules: Vec<CompiledRule>,
}

impl ReconcileEngine {
    /// Build an engine from rule configuration.
    ///
    /// Fails when any rule carries a malformed label regex.
    pub fn new(models: Vec<ReconcileModel>) -> Result<Self, RuleError> {
        let mut models: Vec<ReconcileModel> = models
            .into_iter()
            .filter(|m| m.rule_type != RuleType::Manual)
            .collect();
        models.sort_by_key(ReconcileModel::order_key);

        let mut rules = Vec::with_capacity(models.len());
        for model in models {
            let filter = RuleFilter::compile(&model)?;
            rules.push(CompiledRule { model, filter });
        }
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn models(&self) -> impl Iterator<Item = &ReconcileModel> {
        self.rules.iter().map(|r| &r.model)
    }

    /// Match a batch of statement lines against the open candidates.
    ///
    /// Results come back in the order of `lines`. Failures (a missing
    /// journal account, an unbalanced entry) downgrade the affected
    /// line to a suggestion; they never abort the batch.
    pub fn run(
        &self,
        lines: &[StatementLine],
        candidates: &[CandidateLine],
        ctx: &MatchContext,
        opts: &MatchOptions,
    ) -> Vec<MatchResult> {
        // Candidates claimed as propositions anywhere in this batch.
        let mut claimed: HashSet<Uuid> = HashSet::new();
        // Candidates consumed by a posted entry in this batch.
        let mut reconciled: HashSet<Uuid> = HashSet::new();

        let mut results = Vec::with_capacity(lines.len());
        for line in lines {
            let partner = opts.partner_map.get(&line.id()).or_else(|| line.partner());
            let mut result = MatchResult::empty(line.id());

            for rule in &self.rules {
                let model = &rule.model;
                if !rule.filter.accepts_line(line, partner, ctx) {
                    continue;
                }

                let mut process_auto = model.auto_reconcile;
                match model.rule_type {
                    RuleType::Invoices => {
                        let available = self.available_candidates(
                            line, partner, candidates, rule, ctx, opts, &reconciled,
                        );
                        if available.is_empty() {
                            continue;
                        }
                        if !total_amount_covered(model, line, &available, ctx) {
                            continue;
                        }
                        for candidate in &available {
                            // A proposition already consumed elsewhere
                            // stays out and blocks auto-reconciliation.
                            if claimed.contains(&candidate.id()) {
                                log::debug!(
                                    "rule '{}': candidate {} already claimed, degrading '{}' to suggestion",
                                    model.name,
                                    candidate.id(),
                                    line.label()
                                );
                                process_auto = false;
                                continue;
                            }
                            result.candidate_ids.push(candidate.id());
                            claimed.insert(candidate.id());
                        }
                    }
                    RuleType::WriteOff => {
                        result.status = MatchStatus::WriteOff;
                        result.write_off = write_off_lines(model, line, &[], ctx);
                    }
                    RuleType::Manual => continue,
                }
                result.model = Some(model.id);
                result.model_name = Some(model.name.clone());
                log::debug!("rule '{}' claimed line '{}'", model.name, line.label());

                if process_auto {
                    self.auto_reconcile(
                        model,
                        line,
                        candidates,
                        partner,
                        ctx,
                        &mut result,
                        &mut reconciled,
                    );
                }
                break;
            }

            results.push(result);
        }
        results
    }

    /// Collect the candidates a rule may propose for a line, split by
    /// communication preference.
    ///
    /// Candidates whose reference digits appear in the line label are
    /// preferred; partner-only candidates are collected only as long
    /// as no communication match has shown up. A line without a
    /// partner can only match through the communication.
    fn available_candidates<'a>(
        &self,
        line: &StatementLine,
        partner: Option<&PartnerId>,
        candidates: &'a [CandidateLine],
        rule: &CompiledRule,
        ctx: &MatchContext,
        opts: &MatchOptions,
        reconciled: &HashSet<Uuid>,
    ) -> Vec<&'a CandidateLine> {
        let mut with_com: Vec<&CandidateLine> = Vec::new();
        let mut without_com: Vec<&CandidateLine> = Vec::new();

        for candidate in candidates {
            if opts.excluded.contains(&candidate.id()) || reconciled.contains(&candidate.id()) {
                continue;
            }
            if !candidate.kind().settles_amount(line.amount()) {
                continue;
            }
            if !rule.filter.accepts_candidate(line, candidate, ctx) {
                continue;
            }
            let com = communication_matches(line, candidate);
            match partner {
                Some(p) => {
                    if candidate.partner() != Some(p) {
                        continue;
                    }
                }
                None => {
                    if !com {
                        continue;
                    }
                }
            }
            if com {
                with_com.push(candidate);
            } else if with_com.is_empty() {
                without_com.push(candidate);
            }
        }

        if with_com.is_empty() {
            without_com
        } else {
            with_com
        }
    }

    fn auto_reconcile(
        &self,
        model: &ReconcileModel,
        line: &StatementLine,
        candidates: &[CandidateLine],
        partner: Option<&PartnerId>,
        ctx: &MatchContext,
        result: &mut MatchResult,
        reconciled: &mut HashSet<Uuid>,
    ) {
        let matched: Vec<&CandidateLine> = candidates
            .iter()
            .filter(|c| result.candidate_ids.contains(&c.id()))
            .collect();

        let prepared = executor::prepare(model, line, &matched, partner, ctx);
        if prepared.is_empty() {
            return;
        }

        if !prepared.can_post() {
            log::info!(
                "line '{}': open balance needs a partner, keeping suggestion only",
                line.label()
            );
            reconciled.extend(matched.iter().map(|c| c.id()));
            result.write_off = prepared.write_off;
            return;
        }

        match executor::post(line, &prepared, ctx) {
            Ok(entry) => {
                log::info!(
                    "line '{}' reconciled by rule '{}' ({} lines)",
                    line.label(),
                    model.name,
                    entry.len()
                );
                // Consumed only once the entry actually posted.
                reconciled.extend(matched.iter().map(|c| c.id()));
                result.write_off = prepared.write_off;
                result.status = MatchStatus::Reconciled;
                result.entry = Some(entry);
            }
            Err(err) => {
                log::warn!("line '{}': posting failed: {}", line.label(), err);
                result.write_off = prepared.write_off;
            }
        }
    }
}

/// Whether the candidate's document reference digits occur in the
/// statement label digits.
pub fn communication_matches(line: &StatementLine, candidate: &CandidateLine) -> bool {
    let line_digits = digit_token(line.label());
    if line_digits.is_empty() {
        return false;
    }
    candidate
        .reference()
        .into_iter()
        .chain(Some(candidate.label()))
        .any(|text| {
            let digits = digit_token(text);
            !digits.is_empty() && line_digits.contains(&digits)
        })
}

/// Strip everything but ASCII digits.
fn digit_token(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Whether the proposed residual total acceptably covers the
/// statement amount.
///
/// The statement amount must not be below the total; equality (at the
/// line currency's precision) always passes; partial coverage passes
/// when its percentage reaches the rule's threshold.
fn total_amount_covered(
    model: &ReconcileModel,
    line: &StatementLine,
    available: &[&CandidateLine],
    ctx: &MatchContext,
) -> bool {
    if !model.match_total_amount {
        return true;
    }
    let currency = ctx.line_currency(line);
    let total: Decimal = available.iter().map(|c| c.residual()).sum();
    let line_residual = line.amount();

    match ctx.currencies.compare(line_residual, total, &currency) {
        Ordering::Less => false,
        Ordering::Equal => true,
        Ordering::Greater => {
            if line_residual.is_zero() {
                return false;
            }
            let coverage = total / line_residual * dec!(100);
            coverage >= model.total_amount_param()
        }
    }
}
