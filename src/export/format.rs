//! Flattens transactions into CSV rows with a caller-chosen set of columns.

use time::{Date, format_description::well_known::Rfc3339};

use crate::{Error, transaction::Transaction};

/// The columns exported when the client does not choose any.
pub const DEFAULT_EXPORT_COLUMNS: [&str; 6] =
    ["id", "date", "amount", "category", "status", "user_id"];

type ColumnAccessor = fn(&Transaction) -> String;

/// Get the function that renders the column `name`, or `None` for an unknown column.
fn column_accessor(name: &str) -> Option<ColumnAccessor> {
    let accessor: ColumnAccessor = match name {
        "id" => |transaction| transaction.id.to_string(),
        "date" => |transaction| format_date(transaction.date),
        "amount" => |transaction| format_amount(transaction.amount),
        "category" => |transaction| transaction.category.to_string(),
        "status" => |transaction| transaction.status.to_string(),
        "user_id" => |transaction| transaction.user_id.clone(),
        "user_profile" => |transaction| transaction.user_profile.clone(),
        "description" => |transaction| transaction.description.clone().unwrap_or_default(),
        "created_at" => |transaction| {
            transaction
                .created_at
                .format(&Rfc3339)
                .unwrap_or_default()
        },
        "updated_at" => |transaction| {
            transaction
                .updated_at
                .format(&Rfc3339)
                .unwrap_or_default()
        },
        _ => return None,
    };

    Some(accessor)
}

/// Format a date as month/day/year without zero padding, e.g. "1/5/2024".
pub fn format_date(date: Date) -> String {
    format!(
        "{}/{}/{}",
        u8::from(date.month()),
        date.day(),
        date.year()
    )
}

/// Format an amount as dollars with two decimal places, e.g. "$1234.50".
///
/// Amounts exactly halfway between two cents, such as 10.125, round away from zero.
pub fn format_amount(amount: f64) -> String {
    if is_half_cent(amount) {
        let cents = (amount * 100.0).round();
        return format!("${:.2}", cents / 100.0);
    }

    format!("${amount:.2}")
}

/// Whether `amount` is exactly an odd number of half cents.
///
/// `mul_add` gives the exact remainder of the multiplication, so values like 1.005 that are
/// stored slightly below the half cent are not counted.
fn is_half_cent(amount: f64) -> bool {
    let half_cents = amount * 200.0;

    half_cents.is_finite()
        && half_cents.fract() == 0.0
        && half_cents % 2.0 != 0.0
        && amount.mul_add(200.0, -half_cents) == 0.0
}

/// Flatten `transactions` into one row per transaction with the cells for `columns`, in order.
///
/// Unknown columns produce empty cells.
pub fn to_rows<S: AsRef<str>>(transactions: &[Transaction], columns: &[S]) -> Vec<Vec<String>> {
    let accessors: Vec<Option<ColumnAccessor>> = columns
        .iter()
        .map(|column| column_accessor(column.as_ref()))
        .collect();

    transactions
        .iter()
        .map(|transaction| {
            accessors
                .iter()
                .map(|accessor| accessor.map(|get| get(transaction)).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Render `transactions` as CSV text with a header row of `columns`.
///
/// # Errors
/// Returns [Error::CsvError] if the CSV could not be written.
pub fn write_csv<S: AsRef<str>>(transactions: &[Transaction], columns: &[S]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: Vec<&str> = columns.iter().map(|column| column.as_ref()).collect();

    writer
        .write_record(&header)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for row in to_rows(transactions, columns) {
        writer
            .write_record(&row)
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}
