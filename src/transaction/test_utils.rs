//! Transaction stores for exercising services without SQLite.

use std::sync::Mutex;

use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        Category, Status, Transaction,
        query::{Predicate, Sort, SortField, SortOrder},
        store::{StoreField, TransactionStore},
    },
};

/// Create a transaction without going through a store.
pub fn transaction(
    id: TransactionId,
    date: Date,
    amount: f64,
    category: Category,
    status: Status,
    user_id: &str,
) -> Transaction {
    let now = OffsetDateTime::UNIX_EPOCH;

    Transaction {
        id,
        date,
        amount,
        category,
        status,
        user_id: user_id.to_owned(),
        user_profile: format!("https://example.com/{user_id}.png"),
        description: None,
        created_at: now,
        updated_at: now,
    }
}

/// Keeps transactions in a vector and evaluates queries in memory.
///
/// Records every predicate it is given so tests can inspect what the service asked for.
#[derive(Debug)]
pub struct InMemoryTransactionStore {
    transactions: Vec<Transaction>,
    supports_amount_substring: bool,
    pub predicates: Mutex<Vec<Predicate>>,
}

impl InMemoryTransactionStore {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            supports_amount_substring: true,
            predicates: Mutex::new(Vec::new()),
        }
    }

    /// A store that cannot match part of an amount.
    pub fn without_amount_substring(transactions: Vec<Transaction>) -> Self {
        Self {
            supports_amount_substring: false,
            ..Self::new(transactions)
        }
    }

    fn matching(&self, predicate: &Predicate) -> Vec<Transaction> {
        self.predicates.lock().unwrap().push(predicate.clone());

        self.transactions
            .iter()
            .filter(|transaction| predicate.matches(transaction))
            .cloned()
            .collect()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn find(
        &self,
        predicate: &Predicate,
        sort: Sort,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.matching(predicate);

        transactions.sort_by(|a, b| {
            let ordering = match sort.field {
                SortField::Date => a.date.cmp(&b.date),
                SortField::Amount => a.amount.total_cmp(&b.amount),
            };
            let ordering = match sort.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };

            ordering.then(a.id.cmp(&b.id))
        });

        Ok(transactions
            .into_iter()
            .skip(skip as usize)
            .take(limit.map_or(usize::MAX, |limit| limit as usize))
            .collect())
    }

    fn count(&self, predicate: &Predicate) -> Result<u64, Error> {
        Ok(self.matching(predicate).len() as u64)
    }

    fn find_one(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        Ok(self
            .transactions
            .iter()
            .find(|transaction| transaction.id == id)
            .cloned())
    }

    fn distinct(&self, field: StoreField) -> Result<Vec<String>, Error> {
        let mut values: Vec<String> = self
            .transactions
            .iter()
            .map(|transaction| match field {
                StoreField::UserId => transaction.user_id.clone(),
                StoreField::Category => transaction.category.to_string(),
                StoreField::Status => transaction.status.to_string(),
            })
            .collect();
        values.sort();
        values.dedup();

        Ok(values)
    }

    fn supports_amount_substring(&self) -> bool {
        self.supports_amount_substring
    }
}

/// A store where every operation fails, as if the database were unreachable.
#[derive(Debug)]
pub struct FailingTransactionStore;

impl TransactionStore for FailingTransactionStore {
    fn find(
        &self,
        _predicate: &Predicate,
        _sort: Sort,
        _skip: u64,
        _limit: Option<u64>,
    ) -> Result<Vec<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn count(&self, _predicate: &Predicate) -> Result<u64, Error> {
        Err(Error::DatabaseLockError)
    }

    fn find_one(&self, _id: TransactionId) -> Result<Option<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn distinct(&self, _field: StoreField) -> Result<Vec<String>, Error> {
        Err(Error::DatabaseLockError)
    }
}
