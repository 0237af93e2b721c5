//! Finboard is a REST backend for browsing, summarising and exporting financial transactions.
//!
//! The library provides a JSON API over a single collection of transactions:
//! - paginated, filterable and sortable listings,
//! - dashboard aggregates (revenue, expenses, monthly buckets, category and per-user totals),
//! - CSV exports of filtered transactions,
//! - bearer token authentication for all of the above.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod export;
mod logging;
mod not_found;
mod pagination;
mod routing;
mod transaction;

pub use app_state::{AppState, JwtKeys, create_jwt_keys};
pub use auth::{
    DEFAULT_TOKEN_DURATION, PasswordHash, User, UserID, ValidatedPassword, ensure_demo_user,
    get_user_by_email, update_password,
};
pub use dashboard::{
    CategoryData, DashboardService, DashboardSummary, MonthlyData, UserExpenseData, summarize,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{PageInfo, Paginated, PaginationConfig};
pub use routing::build_router;
pub use transaction::{
    Category, CompiledQuery, LenientNumber, Predicate, SQLiteTransactionStore, SearchPredicate,
    Sort, SortField, SortOrder, Status, StoreField, Transaction, TransactionBuilder,
    TransactionFilters, TransactionRecord, TransactionService, TransactionStore, UserEntry,
    compile_filters, create_transaction, delete_all_transactions, import_transactions,
    parse_records,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not include a bearer token.
    #[error("Access token required")]
    MissingToken,

    /// The bearer token could not be decoded, has a bad signature or has expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// A token could not be created for a user that successfully logged in.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The log in or registration request did not include an email and password.
    #[error("Email and password are required")]
    MissingCredentials,

    /// The email does not belong to a user, or the password did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A user with the same email address is already registered.
    #[error("User already exists")]
    DuplicateEmail,

    /// An empty string was used as a password.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A date filter could not be parsed.
    ///
    /// Callers should pass in the name of the field and the offending value.
    #[error("invalid date \"{1}\" for {0}, expected a date like 2024-01-31")]
    InvalidDate(&'static str, String),

    /// The filter object in a request body was malformed.
    #[error("invalid filters: {0}")]
    InvalidFilters(String),

    /// A transaction failed validation before being written.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An export was requested for filters that match no transactions.
    #[error("No transactions found for export")]
    NothingToExport,

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK =>
            {
                Error::InvalidTransaction(desc)
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidFilters(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingCredentials
            | Error::EmptyPassword
            | Error::InvalidDate(..)
            | Error::InvalidFilters(_)
            | Error::InvalidTransaction(_) => StatusCode::BAD_REQUEST,
            Error::MissingToken | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::FORBIDDEN,
            Error::NotFound | Error::NothingToExport => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::TokenCreation(_)
            | Error::HashingError(_)
            | Error::CsvError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::NotFound => "Not found".to_owned(),
            // Server errors are not intended to be shown to the client.
            error if status.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                "Internal server error".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[test]
    fn missing_and_invalid_tokens_have_distinct_status_codes() {
        let missing = Error::MissingToken.into_response();
        let invalid = Error::InvalidToken.into_response();

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn nothing_to_export_is_not_a_server_error() {
        let response = Error::NothingToExport.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn sql_errors_are_server_errors() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }
}
