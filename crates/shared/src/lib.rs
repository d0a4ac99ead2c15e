//! Shared types, errors, and configuration for Walletd.
//!
//! This crate provides common types used across all other crates:
//! - Fixed-point decimal wire format for balances and amounts
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
