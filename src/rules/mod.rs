//! Reconciliation rule configuration and compiled filters.
//!
//! A [`model::ReconcileModel`] is pure configuration; compiling it into a
//! [`filter::RuleFilter`] validates the criteria (notably label regexes)
//! and produces the predicate the matcher evaluates per line.

pub mod filter;
pub mod model;
