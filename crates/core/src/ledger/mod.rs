//! Wallet balance mutation rules.
//!
//! This module implements the business rules that every balance change
//! must satisfy:
//! - Transaction amounts are never zero
//! - A wallet balance never goes negative
//! - An update applies the net delta (`new_amount - previous_amount`),
//!   not the raw new amount
//!
//! The functions here are pure. Serialization of concurrent mutations is
//! the persistence layer's job (a per-wallet row lock held for the whole
//! database transaction); these rules are evaluated under that lock.

pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use types::TransactionKey;
pub use validation::{balance_delta, validate_mutation};
