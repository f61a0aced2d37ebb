//! Foundational types: currencies, partners, accounts, journals,
//! statement lines, matching candidates and taxes.

pub mod account;
pub mod candidate;
pub mod currency;
pub mod journal;
pub mod partner;
pub mod statement;
pub mod tax;
