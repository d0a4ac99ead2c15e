//! Error types for ledger mutations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Business rule violations for balance mutations.
///
/// These are expected, frequent rejections surfaced to the caller; they
/// never indicate corrupted state and must not be retried as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Transaction amount (or resulting new amount) is zero.
    #[error("Transaction amount cannot be zero")]
    ZeroAmount,

    /// Applying the delta would make the wallet balance negative.
    #[error("Insufficient wallet balance: {balance} + {change} would be negative")]
    InsufficientBalance {
        /// Wallet balance read under the row lock.
        balance: Decimal,
        /// Net change that was rejected.
        change: Decimal,
    },
}
