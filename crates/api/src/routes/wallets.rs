//! Wallet management routes.

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
use walletd_db::entities::wallets;
use walletd_db::repositories::{
    SortDirection, WalletError, WalletFilter, WalletRepository, WalletSortField,
};
use walletd_shared::types::{PageRequest, PageResponse, WalletId};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets))
        .route("/wallets", post(create_wallet))
        .route("/wallets/{wallet_id}", get(get_wallet))
        .route("/wallets/{wallet_id}", put(update_wallet))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing wallets.
#[derive(Debug, Deserialize)]
pub struct ListWalletsQuery {
    /// Keep wallets with balance strictly greater than this decimal string.
    pub min_balance: Option<String>,
    /// Keep wallets with balance strictly smaller than this decimal string.
    pub max_balance: Option<String>,
    /// Sort field: `balance` or `created_at`, prefix `-` for descending.
    pub sort: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 10, max: 100).
    pub per_page: Option<u32>,
}

/// Request body for creating a wallet. The balance is not settable; every
/// wallet starts at zero and changes only through transactions.
#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    /// Wallet label.
    pub label: String,
}

/// Request body for updating a wallet. Only the label is mutable.
#[derive(Debug, Deserialize)]
pub struct UpdateWalletRequest {
    /// New wallet label.
    pub label: String,
}

/// Response for a wallet.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Wallet ID.
    pub id: Uuid,
    /// Wallet label.
    pub label: String,
    /// Balance, serialized as a fixed-point string with 18 fractional
    /// digits.
    #[serde(with = "walletd_shared::types::amount::fixed")]
    pub balance: Decimal,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<wallets::Model> for WalletResponse {
    fn from(model: wallets::Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
            balance: model.balance,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Parses a wallet sort parameter (`balance`, `-created_at`, ...).
fn parse_sort(raw: &str) -> Option<(WalletSortField, SortDirection)> {
    let (name, direction) = match raw.strip_prefix('-') {
        Some(rest) => (rest, SortDirection::Desc),
        None => (raw, SortDirection::Asc),
    };

    let field = match name {
        "balance" => WalletSortField::Balance,
        "created_at" => WalletSortField::CreatedAt,
        _ => return None,
    };

    Some((field, direction))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/wallets` - List wallets with filters, sorting, and pagination.
async fn list_wallets(
    State(state): State<AppState>,
    Query(query): Query<ListWalletsQuery>,
) -> impl IntoResponse {
    let mut filter = WalletFilter::default();

    if let Some(raw) = &query.min_balance {
        match Decimal::from_str(raw) {
            Ok(value) => filter.min_balance = Some(value),
            Err(_) => return invalid_decimal_response("min_balance"),
        }
    }
    if let Some(raw) = &query.max_balance {
        match Decimal::from_str(raw) {
            Ok(value) => filter.max_balance = Some(value),
            Err(_) => return invalid_decimal_response("max_balance"),
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
                        "message": "Sort field must be 'balance' or 'created_at'"
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

    let repo = WalletRepository::new((*state.db).clone());
    match repo.list_wallets(filter, sort, &page).await {
        Ok((wallets, total)) => {
            let items: Vec<WalletResponse> = wallets.into_iter().map(Into::into).collect();
            let body = PageResponse::new(items, page.page, page.per_page(), total);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list wallets");
            internal_error_response()
        }
    }
}

/// POST `/wallets` - Create a new wallet with a zero balance.
async fn create_wallet(
    State(state): State<AppState>,
    Json(payload): Json<CreateWalletRequest>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.create_wallet(payload.label).await {
        Ok(wallet) => (StatusCode::CREATED, Json(WalletResponse::from(wallet))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create wallet");
            internal_error_response()
        }
    }
}

/// GET `/wallets/{wallet_id}` - Fetch a single wallet.
async fn get_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<WalletId>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.find_wallet_by_id(wallet_id).await {
        Ok(Some(wallet)) => (StatusCode::OK, Json(WalletResponse::from(wallet))).into_response(),
        Ok(None) => wallet_not_found_response(),
        Err(e) => {
            error!(error = %e, "Failed to get wallet");
            internal_error_response()
        }
    }
}

/// PUT `/wallets/{wallet_id}` - Update a wallet's label.
async fn update_wallet(
    State(state): State<AppState>,
    Path(wallet_id): Path<WalletId>,
    Json(payload): Json<UpdateWalletRequest>,
) -> impl IntoResponse {
    let repo = WalletRepository::new((*state.db).clone());

    match repo.update_label(wallet_id, payload.label).await {
        Ok(wallet) => (StatusCode::OK, Json(WalletResponse::from(wallet))).into_response(),
        Err(WalletError::NotFound(_)) => wallet_not_found_response(),
        Err(e) => {
            error!(error = %e, "Failed to update wallet");
            internal_error_response()
        }
    }
}

// ============================================================================
// Error Responses
// ============================================================================

fn wallet_not_found_response() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "wallet_not_found",
            "message": "Wallet not found"
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
    #[case("balance", Some((WalletSortField::Balance, SortDirection::Asc)))]
    #[case("-balance", Some((WalletSortField::Balance, SortDirection::Desc)))]
    #[case("created_at", Some((WalletSortField::CreatedAt, SortDirection::Asc)))]
    #[case("-created_at", Some((WalletSortField::CreatedAt, SortDirection::Desc)))]
    #[case("label", None)]
    #[case("", None)]
    #[case("--balance", None)]
    fn test_parse_sort(
        #[case] raw: &str,
        #[case] expected: Option<(WalletSortField, SortDirection)>,
    ) {
        assert_eq!(parse_sort(raw), expected);
    }

    #[test]
    fn test_wallet_response_uses_wire_format() {
        let model = wallets::Model {
            id: Uuid::new_v4(),
            label: "test".to_string(),
            balance: dec!(42.5),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().into(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap().into(),
        };

        let response = WalletResponse::from(model);
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["balance"], "42.500000000000000000");
    }
}
