//! Compiles client-facing [TransactionFilters] into a store query.
//!
//! The compiled query is independent of any particular store: it describes
//! which transactions match ([Predicate]), how they are ordered ([Sort]) and
//! which slice of them to return (`skip`/`limit`). Each [TransactionStore]
//! translates it into its own query language.
//!
//! [TransactionStore]: crate::transaction::TransactionStore

use time::Date;

use crate::{
    Error,
    pagination::PaginationConfig,
    transaction::{
        date::parse_date,
        filters::{TransactionFilters, non_empty},
    },
};

/// The field transactions are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Sort by the transaction date.
    #[default]
    Date,
    /// Sort by the transaction amount.
    Amount,
}

impl SortField {
    /// Parse a client supplied sort key. Unrecognised keys fall back to [SortField::Date].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("amount") => SortField::Amount,
            _ => SortField::Date,
        }
    }
}

/// The order to sort transactions in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

impl SortOrder {
    /// Parse a client supplied sort order.
    ///
    /// An absent value or "desc" sorts in descending order, anything else sorts in ascending order.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("desc") => SortOrder::Descending,
            Some(_) => SortOrder::Ascending,
        }
    }
}

/// How to order the matching transactions.
///
/// Stores must break ties by ascending transaction ID so that pages are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    /// The field to sort by.
    pub field: SortField,
    /// The direction to sort in.
    pub order: SortOrder,
}

/// A free-text search. A transaction matches if any of the conditions hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPredicate {
    /// Matched case-insensitively as a substring of the user ID, category and status.
    pub text: String,
    /// Matched exactly against the amount, set when the text is a finite number.
    pub amount_equals: Option<f64>,
    /// Matched as a substring of the amount's decimal representation, e.g.
    /// "100" matches 1100 and 100.5. Set when the text is a finite number.
    pub amount_contains: Option<String>,
}

/// The conditions a transaction must meet to be included in a query.
///
/// All present conditions must hold. The default predicate matches every transaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact status match.
    pub status: Option<String>,
    /// Exact user ID match.
    pub user_id: Option<String>,
    /// Inclusive lower bound on the date.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the date.
    pub date_to: Option<Date>,
    /// Free-text search.
    pub search: Option<SearchPredicate>,
}

/// A store-independent query produced from [TransactionFilters].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Which transactions match.
    pub predicate: Predicate,
    /// How the matching transactions are ordered.
    pub sort: Sort,
    /// The requested 1-based page.
    pub page: u64,
    /// How many matching transactions to skip, `(page - 1) * limit`.
    pub skip: u64,
    /// The maximum number of transactions to return.
    pub limit: u64,
}

impl CompiledQuery {
    /// Drop the amount substring condition from the search, leaving exact amount matches.
    ///
    /// Used for stores that cannot match substrings of numbers.
    pub fn without_amount_substring(mut self) -> Self {
        if let Some(search) = self.predicate.search.as_mut() {
            search.amount_contains = None;
        }

        self
    }
}

/// Compile `filters` into a [CompiledQuery], using `config` for pagination defaults.
///
/// # Errors
/// Returns [Error::InvalidDate] if `dateFrom` or `dateTo` is present but is not a date.
pub fn compile_filters(
    filters: &TransactionFilters,
    config: &PaginationConfig,
) -> Result<CompiledQuery, Error> {
    let date_from = compile_date("dateFrom", &filters.date_from)?;
    let date_to = compile_date("dateTo", &filters.date_to)?;

    let predicate = Predicate {
        category: non_empty(&filters.category).map(str::to_owned),
        status: non_empty(&filters.status).map(str::to_owned),
        user_id: non_empty(&filters.user_id).map(str::to_owned),
        date_from,
        date_to,
        search: non_empty(&filters.search).map(compile_search),
    };

    let sort = Sort {
        field: SortField::parse(non_empty(&filters.sort_by)),
        order: SortOrder::parse(non_empty(&filters.sort_order)),
    };

    let page = filters
        .page
        .as_ref()
        .and_then(|page| page.as_positive_integer())
        .unwrap_or(config.default_page);
    let limit = filters
        .limit
        .as_ref()
        .and_then(|limit| limit.as_positive_integer())
        .unwrap_or(config.default_page_size);

    Ok(CompiledQuery {
        predicate,
        sort,
        page,
        skip: (page - 1).saturating_mul(limit),
        limit,
    })
}

fn compile_date(field: &'static str, value: &Option<String>) -> Result<Option<Date>, Error> {
    non_empty(value)
        .map(|text| parse_date(text).ok_or_else(|| Error::InvalidDate(field, text.to_owned())))
        .transpose()
}

fn compile_search(text: &str) -> SearchPredicate {
    let amount = text.parse::<f64>().ok().filter(|amount| amount.is_finite());

    SearchPredicate {
        text: text.to_owned(),
        amount_equals: amount,
        amount_contains: amount.map(|_| text.to_owned()),
    }
}

/// Format an amount the way stores compare amount substrings: the shortest
/// decimal form, without a trailing ".0" for whole numbers.
#[cfg(test)]
pub(crate) fn amount_to_search_string(amount: f64) -> String {
    format!("{amount}")
}

#[cfg(test)]
impl Predicate {
    /// Evaluate the predicate against a transaction in memory.
    pub(crate) fn matches(&self, transaction: &crate::transaction::Transaction) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        self.category
            .as_deref()
            .is_none_or(|category| transaction.category.as_str() == category)
            && self
                .status
                .as_deref()
                .is_none_or(|status| transaction.status.as_str() == status)
            && self
                .user_id
                .as_deref()
                .is_none_or(|user_id| transaction.user_id == user_id)
            && self.date_from.is_none_or(|from| transaction.date >= from)
            && self.date_to.is_none_or(|to| transaction.date <= to)
            && self.search.as_ref().is_none_or(|search| {
                contains(&transaction.user_id, &search.text)
                    || contains(transaction.category.as_str(), &search.text)
                    || contains(transaction.status.as_str(), &search.text)
                    || search.amount_equals == Some(transaction.amount)
                    || search.amount_contains.as_deref().is_some_and(|needle| {
                        amount_to_search_string(transaction.amount).contains(needle)
                    })
            })
    }
}
