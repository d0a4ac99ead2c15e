//! Common types used across the application.

pub mod amount;
pub mod id;
pub mod pagination;

pub use amount::format_fixed;
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
