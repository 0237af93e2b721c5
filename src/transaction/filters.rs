//! The filter, sort and pagination options a client can send with a transaction listing.

use serde::Deserialize;

/// A number sent by a client that may arrive as a JSON number or as text.
///
/// Query strings always carry text, while JSON bodies usually carry numbers.
/// Values that are not positive integers are replaced by defaults when the
/// filters are compiled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LenientNumber {
    /// An integral JSON number.
    Integer(i64),
    /// A JSON number with a fractional part.
    Float(f64),
    /// Anything else, usually a query string value.
    Text(String),
}

impl LenientNumber {
    /// The value as a positive integer, if it is one.
    ///
    /// Fractional values are truncated whether they arrive as numbers or as
    /// text, so "2.5" and 2.5 both give 2. Text is read up to the first
    /// character that is not a digit.
    pub fn as_positive_integer(&self) -> Option<u64> {
        match self {
            LenientNumber::Integer(value) => u64::try_from(*value).ok(),
            LenientNumber::Float(value) if value.is_finite() => Some(value.trunc() as u64),
            LenientNumber::Float(_) => None,
            LenientNumber::Text(text) => leading_integer(text),
        }
        .filter(|value| *value >= 1)
    }
}

/// Parse the run of digits at the start of `text`, after whitespace and an optional plus sign.
fn leading_integer(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());

    text[..digits_end].parse().ok()
}

impl From<u64> for LenientNumber {
    fn from(value: u64) -> Self {
        LenientNumber::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// The filters for a transaction listing, as sent by the client.
///
/// Every field is optional and empty strings count as absent. The filters are
/// turned into a store query by [crate::transaction::compile_filters].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Free text matched against the user ID, category, status and amount.
    pub search: Option<String>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
    /// Only include transactions with exactly this status.
    pub status: Option<String>,
    /// Only include transactions belonging to exactly this user ID.
    #[serde(rename = "user_id")]
    pub user_id: Option<String>,
    /// Only include transactions on or after this date.
    pub date_from: Option<String>,
    /// Only include transactions on or before this date.
    pub date_to: Option<String>,
    /// The field to sort by, "date" or "amount".
    pub sort_by: Option<String>,
    /// The sort direction, "asc" or "desc".
    pub sort_order: Option<String>,
    /// The 1-based page to return.
    pub page: Option<LenientNumber>,
    /// The maximum number of transactions per page.
    pub limit: Option<LenientNumber>,
}

impl TransactionFilters {
    /// The same filters, but asking for page `page` with `limit` transactions per page.
    pub fn with_page(self, page: u64, limit: u64) -> Self {
        Self {
            page: Some(page.into()),
            limit: Some(limit.into()),
            ..self
        }
    }
}

/// Returns the trimmed value, or `None` if the value is absent or blank.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
