//! Wallet repository for wallet database operations.
//!
//! Wallets are created with a zero balance and only their label is ever
//! directly writable. The balance column belongs to the transaction
//! mutation protocol in [`super::transaction`].

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use walletd_shared::types::{PageRequest, WalletId};

use super::SortDirection;
use crate::entities::wallets;

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Wallet not found.
    #[error("Wallet not found: {0}")]
    NotFound(WalletId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filter options for listing wallets.
///
/// Bounds are strict comparisons, matching the external filter contract:
/// `min_balance` keeps wallets with balance strictly greater, `max_balance`
/// strictly smaller.
#[derive(Debug, Clone, Default)]
pub struct WalletFilter {
    /// Keep wallets with balance > this value.
    pub min_balance: Option<Decimal>,
    /// Keep wallets with balance < this value.
    pub max_balance: Option<Decimal>,
}

/// Sortable fields for wallet listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletSortField {
    /// Sort by current balance.
    Balance,
    /// Sort by creation time.
    CreatedAt,
}

/// Wallet repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new wallet with a zero balance.
    ///
    /// The starting balance is not an input: a wallet can only be funded
    /// through transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_wallet(&self, label: String) -> Result<wallets::Model, WalletError> {
        let now = Utc::now().into();
        let wallet = wallets::ActiveModel {
            id: Set(WalletId::new().into_inner()),
            label: Set(label),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let wallet = wallet.insert(&self.db).await?;
        Ok(wallet)
    }

    /// Finds a wallet by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_wallet_by_id(
        &self,
        id: WalletId,
    ) -> Result<Option<wallets::Model>, WalletError> {
        let wallet = wallets::Entity::find_by_id(id.into_inner()).one(&self.db).await?;
        Ok(wallet)
    }

    /// Updates a wallet's label.
    ///
    /// This is the only externally reachable wallet write path, and it
    /// cannot touch the balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::NotFound` if the wallet does not exist.
    pub async fn update_label(
        &self,
        id: WalletId,
        label: String,
    ) -> Result<wallets::Model, WalletError> {
        let wallet = wallets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(WalletError::NotFound(id))?;

        let mut active: wallets::ActiveModel = wallet.into();
        active.label = Set(label);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Lists wallets with filtering, sorting, and pagination.
    ///
    /// Returns the page of wallets and the total match count. Without an
    /// explicit sort, listings come back newest first with the id as a
    /// stable tiebreaker.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_wallets(
        &self,
        filter: WalletFilter,
        sort: Option<(WalletSortField, SortDirection)>,
        page: &PageRequest,
    ) -> Result<(Vec<wallets::Model>, u64), WalletError> {
        let mut query = wallets::Entity::find();

        if let Some(min) = filter.min_balance {
            query = query.filter(wallets::Column::Balance.gt(min));
        }
        if let Some(max) = filter.max_balance {
            query = query.filter(wallets::Column::Balance.lt(max));
        }

        let total = query.clone().count(&self.db).await?;

        query = match sort {
            Some((field, direction)) => {
                let column = match field {
                    WalletSortField::Balance => wallets::Column::Balance,
                    WalletSortField::CreatedAt => wallets::Column::CreatedAt,
                };
                match direction {
                    SortDirection::Asc => query.order_by_asc(column),
                    SortDirection::Desc => query.order_by_desc(column),
                }
            }
            None => query.order_by_desc(wallets::Column::CreatedAt),
        }
        .order_by_asc(wallets::Column::Id);

        let wallets = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((wallets, total))
    }
}
