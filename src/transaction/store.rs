//! Defines the transaction store trait.

use std::fmt::Debug;

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        Transaction,
        query::{Predicate, Sort},
    },
};

/// A text field that [TransactionStore::distinct] can list the values of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreField {
    /// The free-text user identifier.
    UserId,
    /// The transaction category.
    Category,
    /// The transaction status.
    Status,
}

/// Handles the retrieval of transactions.
///
/// Implementers may be shared between request handlers, so must be safe to use from many threads.
pub trait TransactionStore: Debug + Send + Sync {
    /// Retrieve the transactions matching `predicate` ordered by `sort`.
    ///
    /// Skips the first `skip` matching transactions and returns at most `limit`
    /// transactions, or every remaining transaction if `limit` is `None`.
    /// Ties in `sort` are broken by ascending transaction ID.
    fn find(
        &self,
        predicate: &Predicate,
        sort: Sort,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Count the transactions matching `predicate`, ignoring pagination.
    fn count(&self, predicate: &Predicate) -> Result<u64, Error>;

    /// Retrieve the transaction with the ID `id`, or `None` if there is no such transaction.
    fn find_one(&self, id: TransactionId) -> Result<Option<Transaction>, Error>;

    /// List the distinct values of `field`, in ascending order.
    fn distinct(&self, field: StoreField) -> Result<Vec<String>, Error>;

    /// Whether the store can match a search term against part of an amount,
    /// e.g. "100" against 1100.
    ///
    /// Stores that cannot are only given queries that match whole amounts.
    fn supports_amount_substring(&self) -> bool {
        true
    }
}
