//! Domain types for ledger operations.

use uuid::Uuid;

use walletd_shared::types::TransactionId;

/// Lookup key for fetching a single transaction.
///
/// Transactions are addressable both by their internal record id and by
/// the externally supplied `txid`; a tagged key keeps the two lookups on
/// one code path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKey {
    /// Internal record id.
    ById(TransactionId),
    /// External transaction identifier (e.g. a blockchain hash).
    ByTxid(String),
}

impl From<TransactionId> for TransactionKey {
    fn from(id: TransactionId) -> Self {
        Self::ById(id)
    }
}

impl From<Uuid> for TransactionKey {
    fn from(id: Uuid) -> Self {
        Self::ById(TransactionId::from_uuid(id))
    }
}
