//! Transactions and the queries over them.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The filters clients send and the compiler that turns them into store queries
//! - The `TransactionStore` trait and its SQLite implementation
//! - `TransactionService`, which runs paginated queries and lists transaction users
//! - The HTTP handlers for the transaction routes
//! - Bulk import of transactions from JSON records

mod core;
mod date;
mod endpoints;
mod filters;
mod import;
mod query;
mod service;
mod sqlite_store;
mod store;
mod users;

#[cfg(test)]
pub(crate) mod test_utils;

pub use core::{
    Category, Status, Transaction, TransactionBuilder, create_transaction,
    create_transaction_table, delete_all_transactions,
};
pub(crate) use date::DATE_FORMAT;
pub use endpoints::{get_transaction, get_transaction_users, get_transactions};
pub use filters::{LenientNumber, TransactionFilters};
pub use import::{TransactionRecord, import_transactions, parse_records};
pub use query::{
    CompiledQuery, Predicate, SearchPredicate, Sort, SortField, SortOrder, compile_filters,
};
pub use service::TransactionService;
pub use sqlite_store::SQLiteTransactionStore;
pub use store::{StoreField, TransactionStore};
pub use users::UserEntry;
