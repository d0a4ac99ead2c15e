//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. All wallet balance writes go through
//! [`TransactionRepository`]; [`WalletRepository`] deliberately exposes
//! no way to set a balance.

pub mod transaction;
pub mod wallet;

pub use transaction::{
    CreateTransactionInput, TransactionError, TransactionFilter, TransactionRepository,
    TransactionSortField, UpdateTransactionInput,
};
pub use wallet::{WalletError, WalletFilter, WalletRepository, WalletSortField};

/// Direction for list sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}
