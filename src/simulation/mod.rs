//! Scenario generation for testing and benchmarking.
//!
//! Produces randomized batches of open invoices and bank statement
//! lines with a configurable share of label/reference hits, so matcher
//! behavior can be exercised at scale.

pub mod scenario;
