//! Transaction management routes.
//!
//! Create and update run the balance mutation protocol in
//! `walletd-db`; this layer only parses input, invokes the repository,
//! and translates the outcome into an HTTP response.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use walletd_core::ledger::{LedgerError, TransactionKey};
use walletd_db::entities::transactions;
use walletd_db::repositories::{
    CreateTransactionInput, SortDirection, TransactionError, TransactionFilter,
    TransactionRepository, TransactionSortField, UpdateTransactionInput,
};
use walletd_shared::types::{PageRequest, PageResponse, TransactionId, WalletId};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route("/transactions/{transaction_id}", put(update_transaction))
        .route("/transactions/txid/{txid}", get(get_transaction_by_txid))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Keep transactions with amount strictly greater than this decimal string.
    pub min_amount: Option<String>,
    /// Keep transactions with amount strictly smaller than this decimal string.
    pub max_amount: Option<String>,
    /// Keep transactions belonging to this wallet.
    pub wallet: Option<WalletId>,
    /// Sort field: `amount` or `created_at`, prefix `-` for descending.
    pub sort: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 10, max: 100).
    pub per_page: Option<u32>,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Owning wallet ID.
    pub wallet_id: WalletId,
    /// External transaction identifier, unique across all transactions.
    pub txid: String,
    /// Signed decimal string: positive credits, negative debits.
    pub amount: String,
}

/// Request body for updating a transaction. Ownership is fixed at
/// creation; only `txid` and `amount` are mutable.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateTransactionRequest {
    /// New external identifier.
    pub txid: Option<String>,
    /// New signed decimal string amount.
    pub amount: Option<String>,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Owning wallet ID.
    pub wallet_id: Uuid,
    /// External transaction identifier.
    pub txid: String,
    /// Amount, serialized as a fixed-point string with 18 fractional
    /// digits.
    #[serde(with = "walletd_shared::types::amount::fixed")]
    pub amount: Decimal,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        Self {
            id: model.id,
            wallet_id: model.wallet_id,
            txid: model.txid,
            amount: model.amount,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Parses a transaction sort parameter (`amount`, `-created_at`, ...).
fn parse_sort(raw: &str) -> Option<(TransactionSortField, SortDirection)> {
    let (name, direction) = match raw.strip_prefix('-') {
        Some(rest) => (rest, SortDirection::Desc),
        None => (raw, SortDirection::Asc),
    };

    let field = match name {
        "amount" => TransactionSortField::Amount,
        "created_at" => TransactionSortField::CreatedAt,
        _ => return None,
    };

    Some((field, direction))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List transactions with filters, sorting, and
/// pagination.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let mut filter = TransactionFilter {
        wallet_id: query.wallet,
        ..Default::default()
    };

    if let Some(raw) = &query.min_amount {
        match Decimal::from_str(raw) {
            Ok(value) => filter.min_amount = Some(value),
            Err(_) => return invalid_decimal_response("min_amount"),
        }
    }
    if let Some(raw) = &query.max_amount {
        match Decimal::from_str(raw) {
            Ok(value) => filter.max_amount = Some(value),
            Err(_) => return invalid_decimal_response("max_amount"),
        }
    }

    let sort = match &query.sort {
        Some(raw) => match parse_sort(raw) {
            Some(sort) => Some(sort),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_sort",
                        "message": "Sort field must be 'amount' or 'created_at'"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.list_transactions(filter, sort, &page).await {
        Ok((items, total)) => {
            let items: Vec<TransactionResponse> = items.into_iter().map(Into::into).collect();
            let body = PageResponse::new(items, page.page, page.per_page(), total);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            internal_error_response()
        }
    }
}

/// POST `/transactions` - Create a transaction and apply its amount to
/// the owning wallet's balance.
async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return invalid_amount_response();
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let input = CreateTransactionInput {
        wallet_id: payload.wallet_id,
        txid: payload.txid,
        amount,
    };

    match repo.create_transaction(input).await {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Err(e) => transaction_error_response(&e),
    }
}

/// GET `/transactions/{transaction_id}` - Fetch by internal id.
async fn get_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> impl IntoResponse {
    fetch_transaction(&state, TransactionKey::ById(transaction_id)).await
}

/// GET `/transactions/txid/{txid}` - Fetch by external txid.
async fn get_transaction_by_txid(
    State(state): State<AppState>,
    Path(txid): Path<String>,
) -> impl IntoResponse {
    fetch_transaction(&state, TransactionKey::ByTxid(txid)).await
}

/// Shared lookup for both key kinds.
async fn fetch_transaction(state: &AppState, key: TransactionKey) -> axum::response::Response {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.find_transaction(&key).await {
        Ok(Some(transaction)) => (
            StatusCode::OK,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Ok(None) => transaction_not_found_response(),
        Err(e) => {
            error!(error = %e, "Failed to get transaction");
            internal_error_response()
        }
    }
}

/// PUT `/transactions/{transaction_id}` - Update txid and/or amount; the
/// wallet balance is adjusted by the net difference.
async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    let amount = match &payload.amount {
        Some(raw) => match Decimal::from_str(raw) {
            Ok(value) => Some(value),
            Err(_) => return invalid_amount_response(),
        },
        None => None,
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let input = UpdateTransactionInput {
        txid: payload.txid,
        amount,
    };

    match repo.update_transaction(transaction_id, input).await {
        Ok(transaction) => (
            StatusCode::OK,
            Json(TransactionResponse::from(transaction)),
        )
            .into_response(),
        Err(e) => transaction_error_response(&e),
    }
}

// ============================================================================
// Error Responses
// ============================================================================

/// Translates a repository failure into the client-facing response.
///
/// Business rule rejections carry the violated rule so clients can tell
/// a correctable input apart from a permanent conflict.
fn transaction_error_response(e: &TransactionError) -> axum::response::Response {
    match e {
        TransactionError::Ledger(LedgerError::ZeroAmount) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "zero_amount",
                "message": "Transaction amount cannot be zero"
            })),
        )
            .into_response(),
        TransactionError::Ledger(LedgerError::InsufficientBalance { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "insufficient_balance",
                "message": "Insufficient wallet balance. Wallet balance cannot be negative"
            })),
        )
            .into_response(),
        TransactionError::DuplicateTxid(txid) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_txid",
                "message": format!("Transaction with txid '{txid}' already exists")
            })),
        )
            .into_response(),
        TransactionError::WalletNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "wallet_not_found",
                "message": "Wallet not found"
            })),
        )
            .into_response(),
        TransactionError::NotFound => transaction_not_found_response(),
        TransactionError::Database(err) => {
            error!(error = %err, "Transaction mutation failed");
            internal_error_response()
        }
    }
}

fn transaction_not_found_response() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "transaction_not_found",
            "message": "Transaction not found"
        })),
    )
        .into_response()
}

fn invalid_amount_response() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_amount",
            "message": "Amount must be a decimal string"
        })),
    )
        .into_response()
}

fn invalid_decimal_response(param: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_decimal",
            "message": format!("Parameter '{param}' is not a valid decimal")
        })),
    )
        .into_response()
}

fn internal_error_response() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("amount", Some((TransactionSortField::Amount, SortDirection::Asc)))]
    #[case("-amount", Some((TransactionSortField::Amount, SortDirection::Desc)))]
    #[case("created_at", Some((TransactionSortField::CreatedAt, SortDirection::Asc)))]
    #[case("-created_at", Some((TransactionSortField::CreatedAt, SortDirection::Desc)))]
    #[case("txid", None)]
    #[case("", None)]
    fn test_parse_sort(
        #[case] raw: &str,
        #[case] expected: Option<(TransactionSortField, SortDirection)>,
    ) {
        assert_eq!(parse_sort(raw), expected);
    }

    #[test]
    fn test_transaction_response_uses_wire_format() {
        let model = transactions::Model {
            id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            txid: "abc123".to_string(),
            amount: dec!(-0.25),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().into(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().into(),
        };

        let response = TransactionResponse::from(model);
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["amount"], "-0.250000000000000000");
    }

    #[test]
    fn test_negative_amount_strings_parse() {
        assert_eq!(
            Decimal::from_str("-100.000000000000000000").unwrap(),
            dec!(-100)
        );
    }
}
