//! The matching pipeline: shared reference data, candidate selection,
//! write-off generation and entry posting.
//!
//! [`matcher::ReconcileEngine`] drives the batch loop; [`executor`]
//! turns a match into a balanced journal entry; [`writeoff`] expands a
//! rule's write-off templates into counter lines.

pub mod context;
pub mod executor;
pub mod matcher;
pub mod writeoff;
