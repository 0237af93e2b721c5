//! HTTP handlers for listing and looking up transactions.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use crate::{
    Error,
    database_id::TransactionId,
    pagination::Paginated,
    transaction::{
        Transaction, TransactionFilters, TransactionService, users::UserEntry,
    },
};

/// Get a page of transactions matching the filters in the query string.
///
/// Store failures produce an empty page rather than an error response.
pub async fn get_transactions(
    State(service): State<TransactionService>,
    Query(filters): Query<TransactionFilters>,
) -> Result<Json<Paginated<Transaction>>, Error> {
    service.get_filtered_transactions(&filters).map(Json)
}

/// Get a single transaction by its ID.
///
/// IDs that are not integers cannot refer to a transaction, so they are reported as not found.
pub async fn get_transaction(
    State(service): State<TransactionService>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Transaction>, Error> {
    let transaction_id: TransactionId = transaction_id
        .trim()
        .parse()
        .map_err(|_| Error::NotFound)?;

    service.get_transaction(transaction_id).map(Json)
}

/// The users that own transactions.
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<UserEntry>,
}

/// List the users that own transactions, for populating filter options.
pub async fn get_transaction_users(
    State(service): State<TransactionService>,
) -> Json<UsersResponse> {
    Json(UsersResponse {
        users: service.get_unique_users(),
    })
}
