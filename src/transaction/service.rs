//! Runs transaction queries against a [TransactionStore].

use std::sync::Arc;

use crate::{
    Error,
    database_id::TransactionId,
    pagination::{PageInfo, Paginated, PaginationConfig},
    transaction::{
        Transaction,
        filters::TransactionFilters,
        query::{CompiledQuery, compile_filters},
        store::{StoreField, TransactionStore},
        users::{UserEntry, build_user_directory},
    },
};

/// Lists and looks up transactions.
///
/// Created once at start-up and shared between requests.
#[derive(Debug, Clone)]
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
    pagination_config: PaginationConfig,
}

impl TransactionService {
    /// Create a service that reads from `store`.
    pub fn new(store: Arc<dyn TransactionStore>, pagination_config: PaginationConfig) -> Self {
        Self {
            store,
            pagination_config,
        }
    }

    /// The pagination defaults used when compiling filters.
    pub fn pagination_config(&self) -> &PaginationConfig {
        &self.pagination_config
    }

    fn compile(&self, filters: &TransactionFilters) -> Result<CompiledQuery, Error> {
        let query = compile_filters(filters, &self.pagination_config)?;

        if query
            .predicate
            .search
            .as_ref()
            .is_some_and(|search| search.amount_contains.is_some())
            && !self.store.supports_amount_substring()
        {
            tracing::warn!(
                "transaction store cannot match part of an amount, searching for whole amounts only"
            );
            return Ok(query.without_amount_substring());
        }

        Ok(query)
    }

    fn run(&self, query: &CompiledQuery) -> Result<Paginated<Transaction>, Error> {
        let data = self.store.find(
            &query.predicate,
            query.sort,
            query.skip,
            Some(query.limit),
        )?;
        let total_items = self.store.count(&query.predicate)?;

        Ok(Paginated {
            data,
            pagination: PageInfo::new(query.page, total_items, query.limit),
        })
    }

    /// Get one page of the transactions matching `filters`.
    ///
    /// If the store fails, the error is logged and an empty page is returned.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a date filter is not a date.
    pub fn get_filtered_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Paginated<Transaction>, Error> {
        let query = self.compile(filters)?;

        match self.run(&query) {
            Ok(page) => Ok(page),
            Err(error) => {
                tracing::error!("could not query transactions, returning an empty page: {error}");
                Ok(Paginated {
                    data: Vec::new(),
                    pagination: PageInfo::empty(query.limit),
                })
            }
        }
    }

    /// Get one page of the transactions matching `filters`, passing on store errors.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a date filter is not a date, or the
    /// store's error if the query fails.
    pub fn query_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Paginated<Transaction>, Error> {
        let query = self.compile(filters)?;

        self.run(&query)
            .inspect_err(|error| tracing::error!("could not query transactions: {error}"))
    }

    /// Count the transactions matching `filters`, ignoring pagination.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a date filter is not a date, or the
    /// store's error if the query fails.
    pub fn count_transactions(&self, filters: &TransactionFilters) -> Result<u64, Error> {
        let query = self.compile(filters)?;

        self.store
            .count(&query.predicate)
            .inspect_err(|error| tracing::error!("could not count transactions: {error}"))
    }

    /// Get the transaction with the ID `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no such transaction, or the
    /// store's error if the lookup fails.
    pub fn get_transaction(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.store
            .find_one(id)
            .inspect_err(|error| tracing::error!("could not get transaction {id}: {error}"))?
            .ok_or(Error::NotFound)
    }

    /// List the users that own transactions, in display order.
    ///
    /// If the store fails, the error is logged and an empty list is returned.
    pub fn get_unique_users(&self) -> Vec<UserEntry> {
        match self.store.distinct(StoreField::UserId) {
            Ok(user_ids) => build_user_directory(user_ids),
            Err(error) => {
                tracing::error!("could not list transaction users, returning no users: {error}");
                Vec::new()
            }
        }
    }
}
