//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params_from_iter, types::Value};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        Transaction,
        core::{TRANSACTION_COLUMNS, map_transaction_row},
        query::{Predicate, Sort, SortField, SortOrder},
        store::{StoreField, TransactionStore},
    },
};

/// Stores transactions in a SQLite database.
///
/// The transaction table must have been created, see [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// A WHERE clause and the values for its numbered parameters.
#[derive(Debug, Default)]
struct WhereClause {
    parts: Vec<String>,
    parameters: Vec<Value>,
}

impl WhereClause {
    /// Add `value` as a parameter and return its placeholder, e.g. "?3".
    fn bind(&mut self, value: Value) -> String {
        self.parameters.push(value);
        format!("?{}", self.parameters.len())
    }

    fn from_predicate(predicate: &Predicate) -> Self {
        let mut clause = Self::default();

        for (column, value) in [
            ("category", &predicate.category),
            ("status", &predicate.status),
            ("user_id", &predicate.user_id),
        ] {
            if let Some(value) = value {
                let placeholder = clause.bind(Value::Text(value.clone()));
                clause.parts.push(format!("{column} = {placeholder}"));
            }
        }

        if let Some(date_from) = predicate.date_from {
            let placeholder = clause.bind(Value::Text(date_from.to_string()));
            clause.parts.push(format!("date >= {placeholder}"));
        }

        if let Some(date_to) = predicate.date_to {
            let placeholder = clause.bind(Value::Text(date_to.to_string()));
            clause.parts.push(format!("date <= {placeholder}"));
        }

        if let Some(search) = &predicate.search {
            let text = clause.bind(Value::Text(search.text.clone()));
            let mut conditions: Vec<String> = ["user_id", "category", "status"]
                .into_iter()
                .map(|column| format!("instr(lower({column}), lower({text})) > 0"))
                .collect();

            if let Some(amount) = search.amount_equals {
                let placeholder = clause.bind(Value::Real(amount));
                conditions.push(format!("amount = {placeholder}"));
            }

            if let Some(needle) = &search.amount_contains {
                let placeholder = clause.bind(Value::Text(needle.clone()));
                conditions.push(format!(
                    "instr(printf('%.15g', amount), {placeholder}) > 0"
                ));
            }

            clause.parts.push(format!("({})", conditions.join(" OR ")));
        }

        clause
    }

    fn to_sql(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.parts.join(" AND "))
        }
    }
}

fn order_by_clause(sort: Sort) -> String {
    let column = match sort.field {
        SortField::Date => "date",
        SortField::Amount => "amount",
    };
    let direction = match sort.order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };

    format!(" ORDER BY {column} {direction}, id ASC")
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl TransactionStore for SQLiteTransactionStore {
    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock could not be acquired,
    /// - or [Error::SqlError] there is a SQL error.
    fn find(
        &self,
        predicate: &Predicate,
        sort: Sort,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Transaction>, Error> {
        let mut clause = WhereClause::from_predicate(predicate);
        let where_sql = clause.to_sql();
        // SQLite treats a negative limit as no limit.
        let limit_placeholder = clause.bind(Value::Integer(limit.map_or(-1, to_sql_integer)));
        let offset_placeholder = clause.bind(Value::Integer(to_sql_integer(skip)));

        let query_string = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"{where_sql}{} LIMIT {limit_placeholder} OFFSET {offset_placeholder}",
            order_by_clause(sort)
        );

        let connection = self.lock()?;
        let mut statement = connection.prepare(&query_string)?;
        statement
            .query_map(params_from_iter(clause.parameters.iter()), map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Count the transactions in the database that match `predicate`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock could not be acquired,
    /// - or [Error::SqlError] there is a SQL error.
    fn count(&self, predicate: &Predicate) -> Result<u64, Error> {
        let clause = WhereClause::from_predicate(predicate);
        let query_string = format!(
            "SELECT COUNT(id) FROM \"transaction\"{}",
            clause.to_sql()
        );

        let count: i64 = self.lock()?.query_row(
            &query_string,
            params_from_iter(clause.parameters.iter()),
            |row| row.get(0),
        )?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock could not be acquired,
    /// - or [Error::SqlError] there is a SQL error.
    fn find_one(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)
            .optional()?;

        Ok(transaction)
    }

    /// List the distinct values of `field` in ascending order.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the database lock could not be acquired,
    /// - or [Error::SqlError] there is a SQL error.
    fn distinct(&self, field: StoreField) -> Result<Vec<String>, Error> {
        let column = match field {
            StoreField::UserId => "user_id",
            StoreField::Category => "category",
            StoreField::Status => "status",
        };

        let connection = self.lock()?;
        let mut statement = connection.prepare(&format!(
            "SELECT DISTINCT {column} FROM \"transaction\" ORDER BY {column} ASC"
        ))?;
        statement
            .query_map([], |row| row.get(0))?
            .map(|maybe_value| maybe_value.map_err(Error::from))
            .collect()
    }
}
