//! Core business logic for Walletd.
//!
//! This crate holds the pure ledger rules that keep wallet balances
//! consistent. It has no web or database dependencies; the persistence
//! layer calls into it while holding the wallet row lock.

pub mod ledger;

pub use ledger::{LedgerError, TransactionKey, validate_mutation};
