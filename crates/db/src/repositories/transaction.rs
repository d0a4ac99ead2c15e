//! Transaction repository implementing the balance mutation protocol.
//!
//! Creating or updating a transaction is the only way a wallet balance
//! changes. Both paths run inside one database transaction and take a
//! `SELECT ... FOR UPDATE` lock on the wallet row first, so all balance
//! changes to a single wallet are serialized even across independent
//! service instances sharing the store. Mutations on different wallets
//! never block each other.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use walletd_core::ledger::{LedgerError, TransactionKey, validate_mutation};
use walletd_shared::types::{PageRequest, TransactionId, WalletId};

use super::SortDirection;
use crate::entities::{transactions, wallets};

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found")]
    NotFound,

    /// Referenced wallet not found.
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// txid already used by another transaction.
    #[error("Transaction with txid '{0}' already exists")]
    DuplicateTxid(String),

    /// Business rule rejection (zero amount, insufficient balance).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Owning wallet.
    pub wallet_id: WalletId,
    /// External transaction identifier.
    pub txid: String,
    /// Signed amount: positive credits, negative debits. Never zero.
    pub amount: Decimal,
}

/// Input for updating a transaction. Ownership (`wallet_id`) is fixed at
/// creation and cannot be changed here.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// New external identifier, if changing.
    pub txid: Option<String>,
    /// New amount, if changing. The wallet receives the net difference.
    pub amount: Option<Decimal>,
}

/// Filter options for listing transactions.
///
/// Amount bounds are strict comparisons, like the wallet balance filters.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Keep transactions with amount > this value.
    pub min_amount: Option<Decimal>,
    /// Keep transactions with amount < this value.
    pub max_amount: Option<Decimal>,
    /// Keep transactions belonging to this wallet.
    pub wallet_id: Option<WalletId>,
}

/// Sortable fields for transaction listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSortField {
    /// Sort by amount.
    Amount,
    /// Sort by creation time.
    CreatedAt,
}

/// Transaction repository. Owns every write to `wallets.balance`.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction and applies its amount to the wallet balance.
    ///
    /// Protocol: begin, lock the wallet row, validate against the balance
    /// read under the lock, insert the transaction row, write the new
    /// balance, commit. The row and the balance become visible atomically
    /// or not at all; an abort leaves no partial state.
    ///
    /// # Errors
    ///
    /// Returns `WalletNotFound`, `ZeroAmount` / `InsufficientBalance`
    /// (via `Ledger`), `DuplicateTxid`, or `Database`. None of these are
    /// retryable business failures except transient `Database` errors,
    /// which are the caller's concern.
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let txn = self.db.begin().await?;

        let wallet = Self::lock_wallet(&txn, input.wallet_id).await?;

        let change = validate_mutation(wallet.balance, Decimal::ZERO, input.amount)?;

        Self::ensure_txid_free(&txn, &input.txid, None).await?;

        let now = Utc::now().into();
        let txid = input.txid;
        let transaction = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            wallet_id: Set(wallet.id),
            txid: Set(txid.clone()),
            amount: Set(input.amount),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let transaction = match transaction.insert(&txn).await {
            Ok(model) => model,
            Err(e) => return Err(map_unique_violation(e, &txid)),
        };

        let new_balance = wallet.balance + change;
        Self::write_balance(&txn, wallet, new_balance).await?;

        txn.commit().await?;

        info!(
            wallet_id = %transaction.wallet_id,
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            balance = %new_balance,
            "Transaction created"
        );

        Ok(transaction)
    }

    /// Updates a transaction's txid and/or amount, adjusting the wallet
    /// balance by the net difference (`new_amount - previous_amount`).
    ///
    /// Same locking discipline as creation. The transaction row is
    /// re-read after the wallet lock is acquired, so the previous amount
    /// is stable: any concurrent mutation of this wallet either committed
    /// before the lock was granted or waits behind it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `WalletNotFound`, `ZeroAmount` /
    /// `InsufficientBalance` (via `Ledger`), `DuplicateTxid`, or
    /// `Database`.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        input: UpdateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let txn = self.db.begin().await?;

        // First read only resolves the owning wallet; the authoritative
        // amount is re-read below, under the wallet lock.
        let wallet_id = transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound)?
            .wallet_id;

        let wallet = Self::lock_wallet(&txn, WalletId::from_uuid(wallet_id)).await?;

        let current = transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound)?;

        let new_amount = input.amount.unwrap_or(current.amount);
        let change = validate_mutation(wallet.balance, current.amount, new_amount)?;

        if let Some(new_txid) = &input.txid
            && *new_txid != current.txid
        {
            Self::ensure_txid_free(&txn, new_txid, Some(id.into_inner())).await?;
        }

        let effective_txid = input.txid.clone().unwrap_or_else(|| current.txid.clone());

        let mut active: transactions::ActiveModel = current.into();
        if let Some(txid) = input.txid {
            active.txid = Set(txid);
        }
        active.amount = Set(new_amount);
        active.updated_at = Set(Utc::now().into());

        let updated = match active.update(&txn).await {
            Ok(model) => model,
            Err(e) => return Err(map_unique_violation(e, &effective_txid)),
        };

        let new_balance = wallet.balance + change;
        Self::write_balance(&txn, wallet, new_balance).await?;

        txn.commit().await?;

        info!(
            wallet_id = %updated.wallet_id,
            transaction_id = %updated.id,
            change = %change,
            balance = %new_balance,
            "Transaction updated"
        );

        Ok(updated)
    }

    /// Finds a transaction by internal id or external txid.
    ///
    /// Pure read; both key kinds resolve the same logical record through
    /// one code path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_transaction(
        &self,
        key: &TransactionKey,
    ) -> Result<Option<transactions::Model>, TransactionError> {
        let query = match key {
            TransactionKey::ById(id) => transactions::Entity::find_by_id(id.into_inner()),
            TransactionKey::ByTxid(txid) => {
                transactions::Entity::find().filter(transactions::Column::Txid.eq(txid))
            }
        };

        let transaction = query.one(&self.db).await?;
        Ok(transaction)
    }

    /// Lists transactions with filtering, sorting, and pagination.
    ///
    /// Returns the page of transactions and the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        sort: Option<(TransactionSortField, SortDirection)>,
        page: &PageRequest,
    ) -> Result<(Vec<transactions::Model>, u64), TransactionError> {
        let mut query = transactions::Entity::find();

        if let Some(min) = filter.min_amount {
            query = query.filter(transactions::Column::Amount.gt(min));
        }
        if let Some(max) = filter.max_amount {
            query = query.filter(transactions::Column::Amount.lt(max));
        }
        if let Some(wallet_id) = filter.wallet_id {
            query = query.filter(transactions::Column::WalletId.eq(wallet_id.into_inner()));
        }

        let total = query.clone().count(&self.db).await?;

        query = match sort {
            Some((field, direction)) => {
                let column = match field {
                    TransactionSortField::Amount => transactions::Column::Amount,
                    TransactionSortField::CreatedAt => transactions::Column::CreatedAt,
                };
                match direction {
                    SortDirection::Asc => query.order_by_asc(column),
                    SortDirection::Desc => query.order_by_desc(column),
                }
            }
            None => query.order_by_desc(transactions::Column::CreatedAt),
        }
        .order_by_asc(transactions::Column::Id);

        let transactions = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((transactions, total))
    }

    /// Acquires the exclusive row lock on a wallet and returns the row as
    /// read under that lock.
    ///
    /// Blocks (does not fail) while another mutation on the same wallet
    /// holds the lock; the balance returned always reflects every
    /// previously committed mutation.
    async fn lock_wallet(
        txn: &DatabaseTransaction,
        wallet_id: WalletId,
    ) -> Result<wallets::Model, TransactionError> {
        let wallet = wallets::Entity::find_by_id(wallet_id.into_inner())
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(TransactionError::WalletNotFound(wallet_id))?;

        Ok(wallet)
    }

    /// Rejects a txid that is already taken by a different transaction.
    ///
    /// The unique index remains the authoritative guard for racing
    /// inserts; this pre-check exists to report the conflict before any
    /// row is written.
    async fn ensure_txid_free(
        txn: &DatabaseTransaction,
        txid: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), TransactionError> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::Txid.eq(txid));

        if let Some(id) = exclude_id {
            query = query.filter(transactions::Column::Id.ne(id));
        }

        if query.count(txn).await? > 0 {
            return Err(TransactionError::DuplicateTxid(txid.to_string()));
        }

        Ok(())
    }

    /// Persists a new wallet balance. Only reachable from the two
    /// mutation paths above, both of which hold the wallet row lock.
    async fn write_balance(
        txn: &impl ConnectionTrait,
        wallet: wallets::Model,
        new_balance: Decimal,
    ) -> Result<(), TransactionError> {
        let mut active: wallets::ActiveModel = wallet.into();
        active.balance = Set(new_balance);
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;

        Ok(())
    }
}

/// Maps a unique-constraint violation on insert/update to
/// `DuplicateTxid`; everything else stays a database error.
fn map_unique_violation(e: DbErr, txid: &str) -> TransactionError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            TransactionError::DuplicateTxid(txid.to_string())
        }
        _ => TransactionError::Database(e),
    }
}
