//! `SeaORM` Entity for the transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A transaction row. `wallet_id` is fixed at creation; `txid` is the
/// externally supplied identifier, unique across all transactions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_id: Uuid,
    #[sea_orm(unique)]
    pub txid: String,
    #[sea_orm(column_type = "Decimal(Some((33, 18)))")]
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
