//! HTTP handlers for exporting transactions.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    export::format::{DEFAULT_EXPORT_COLUMNS, write_csv},
    transaction::{DATE_FORMAT, TransactionFilters, TransactionService},
};

/// The body of an export request.
#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    /// The filters selecting which transactions to export. Pagination is ignored.
    #[serde(default)]
    pub filters: Option<TransactionFilters>,
    /// The columns to include, in order. Defaults to [DEFAULT_EXPORT_COLUMNS].
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

/// Download the transactions matching the request filters as a CSV file.
///
/// # Errors
/// Returns [Error::InvalidFilters] if the body is not a valid export request,
/// [Error::NothingToExport] if no transactions match, or the store's error if
/// the query fails.
pub async fn export_csv(
    State(service): State<TransactionService>,
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(request) = request?;
    let export_limit = service.pagination_config().export_limit;
    let filters = request.filters.unwrap_or_default().with_page(1, export_limit);
    let columns = request
        .columns
        .filter(|columns| !columns.is_empty())
        .unwrap_or_else(|| DEFAULT_EXPORT_COLUMNS.map(str::to_owned).to_vec());

    let page = service.query_transactions(&filters)?;

    if page.data.is_empty() {
        return Err(Error::NothingToExport);
    }

    if page.pagination.total_items > export_limit {
        tracing::warn!(
            "export truncated to {export_limit} of {} transactions",
            page.pagination.total_items
        );
    }

    let csv = write_csv(&page.data, columns.as_slice())?;
    let date = OffsetDateTime::now_utc()
        .date()
        .format(DATE_FORMAT)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"transactions-export-{date}.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// How many transactions an export would contain.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPreview {
    total_transactions: u64,
    message: String,
}

/// Count the transactions an export with the request filters would contain.
///
/// # Errors
/// Returns [Error::InvalidFilters] if the body is not a valid export request,
/// or the store's error if the count fails.
pub async fn get_export_preview(
    State(service): State<TransactionService>,
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Json<ExportPreview>, Error> {
    let Json(request) = request?;
    let filters = request.filters.unwrap_or_default();
    let total_transactions = service.count_transactions(&filters)?;

    Ok(Json(ExportPreview {
        total_transactions,
        message: format!("{total_transactions} transactions will be exported"),
    }))
}
