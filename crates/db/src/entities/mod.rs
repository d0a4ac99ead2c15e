//! `SeaORM` entity definitions.

pub mod transactions;
pub mod wallets;
