//! Initial database migration.
//!
//! Creates the wallets and transactions tables with their indexes and
//! integrity constraints.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY,
    label VARCHAR(255) NOT NULL,
    -- 18 fractional digits, 15 integral: matches the fixed-point wire format.
    -- The CHECK is a backstop; the application enforces non-negativity
    -- under the wallet row lock before writing.
    balance NUMERIC(33, 18) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- min_balance/max_balance filtering and balance sorting
CREATE INDEX idx_wallets_balance ON wallets(balance);
CREATE INDEX idx_wallets_created_at ON wallets(created_at);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    wallet_id UUID NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    txid VARCHAR(64) NOT NULL,
    amount NUMERIC(33, 18) NOT NULL CHECK (amount <> 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- txid is globally unique; racing inserts are resolved here
    CONSTRAINT uq_transactions_txid UNIQUE (txid)
);

CREATE INDEX idx_transactions_wallet_id ON transactions(wallet_id);
CREATE INDEX idx_transactions_amount ON transactions(amount);
CREATE INDEX idx_transactions_created_at ON transactions(created_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
";
