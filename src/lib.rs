//! # reconcile-engine
//!
//! Rules-driven bank statement reconciliation engine.
//!
//! Given a batch of bank statement lines, a pool of open ledger lines
//! (invoices, bills, refunds) and an ordered set of reconciliation
//! rules, the engine proposes matches, generates write-off lines and
//! posts balanced journal entries for rules allowed to reconcile on
//! their own.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: statement lines, candidates, journal
//!   entries, partners, currencies, taxes
//! - **rules** — Rule configuration and compiled line/candidate filters
//! - **matching** — The batch matcher, write-off generation and entry
//!   posting
//! - **simulation** — Random scenario generation for testing and
//!   benchmarking

pub mod core;
pub mod matching;
pub mod rules;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::account::AccountId;
    pub use crate::core::candidate::{CandidateLine, DocumentKind};
    pub use crate::core::currency::{CurrencyCode, CurrencyTable};
    pub use crate::core::journal::{JournalEntry, JournalId, JournalLine};
    pub use crate::core::partner::{Partner, PartnerBook, PartnerId};
    pub use crate::core::statement::StatementLine;
    pub use crate::matching::context::MatchContext;
    pub use crate::matching::matcher::{MatchOptions, MatchResult, MatchStatus, ReconcileEngine};
    pub use crate::rules::model::{ReconcileModel, RuleType};
}
