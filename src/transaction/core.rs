//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, database_id::TransactionId, transaction::date::date_serde};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// Only [Category::Revenue] and [Category::Expense] can be written. Values
/// read from the store that match neither are kept as [Category::Other] so
/// that they can be excluded from totals instead of failing the whole read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Money earned.
    Revenue,
    /// Money spent.
    Expense,
    /// An unrecognised category.
    Other(String),
}

impl Category {
    /// The category as it is written to the store and shown to clients.
    pub fn as_str(&self) -> &str {
        match self {
            Category::Revenue => "Revenue",
            Category::Expense => "Expense",
            Category::Other(other) => other,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Revenue" => Category::Revenue,
            "Expense" => Category::Expense,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a transaction has been settled.
///
/// Unrecognised values read from the store are kept as [Status::Other].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// The money has changed hands.
    Paid,
    /// The transaction has not been settled yet.
    Pending,
    /// An unrecognised status.
    Other(String),
}

impl Status {
    /// The status as it is written to the store and shown to clients.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Paid => "Paid",
            Status::Pending => "Pending",
            Status::Other(other) => other,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Paid" => Status::Paid,
            "Pending" => Status::Pending,
            _ => Status::Other(value),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Category::from)
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Status::from)
    }
}

/// A revenue or expense record.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// When the transaction happened. Only the calendar date is meaningful.
    #[serde(with = "date_serde")]
    pub date: Date,
    /// The non-negative amount of money earned or spent.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub category: Category,
    /// Whether the transaction has been settled.
    pub status: Status,
    /// Free-text identifier of the person the transaction belongs to, e.g. "john_doe".
    pub user_id: String,
    /// URL of the person's profile picture.
    pub user_profile: String,
    /// An optional note about the transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the transaction was written to the store.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last written to the store.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        date: Date,
        amount: f64,
        category: Category,
        status: Status,
        user_id: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            date,
            amount,
            category,
            status,
            user_id: user_id.to_owned(),
            user_profile: String::new(),
            description: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder is checked by [TransactionBuilder::validate] before it is
/// written to the database by [create_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The date when the transaction occurred.
    pub date: Date,

    /// The amount of money, must be finite and no less than zero.
    pub amount: f64,

    /// Must be [Category::Revenue] or [Category::Expense].
    pub category: Category,

    /// Must be [Status::Paid] or [Status::Pending].
    pub status: Status,

    /// Who the transaction belongs to. Surrounding whitespace is removed and
    /// the result must not be empty.
    pub user_id: String,

    /// URL of the person's profile picture. Surrounding whitespace is removed
    /// and the result must not be empty.
    pub user_profile: String,

    /// An optional note about the transaction.
    pub description: Option<String>,
}

impl TransactionBuilder {
    /// Set the profile picture URL for the transaction.
    pub fn user_profile(mut self, user_profile: &str) -> Self {
        self.user_profile = user_profile.to_owned();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Check the builder against the rules every stored transaction must follow.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransaction] describing the first rule that was broken.
    pub fn validate(self) -> Result<Self, Error> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidTransaction(format!(
                "amount must be a number no less than zero, got {}",
                self.amount
            )));
        }

        if let Category::Other(category) = &self.category {
            return Err(Error::InvalidTransaction(format!(
                "category must be Revenue or Expense, got \"{category}\""
            )));
        }

        if let Status::Other(status) = &self.status {
            return Err(Error::InvalidTransaction(format!(
                "status must be Paid or Pending, got \"{status}\""
            )));
        }

        let user_id = self.user_id.trim().to_owned();
        if user_id.is_empty() {
            return Err(Error::InvalidTransaction("user_id is required".to_owned()));
        }

        let user_profile = self.user_profile.trim().to_owned();
        if user_profile.is_empty() {
            return Err(Error::InvalidTransaction(
                "user_profile is required".to_owned(),
            ));
        }

        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());

        Ok(Self {
            user_id,
            user_profile,
            description,
            ..self
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected for every transaction query, in the order expected by
/// [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, date, amount, category, status, user_id, user_profile, description, created_at, updated_at";

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTransaction] if the builder fails validation,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let builder = builder.validate()?;
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
            (date, amount, category, status, user_id, user_profile, description, created_at, updated_at) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.date,
                builder.amount,
                builder.category,
                builder.status,
                builder.user_id,
                builder.user_profile,
                builder.description,
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Delete every transaction, returning the number of rows removed.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM \"transaction\"", ())
        .map_err(Error::from)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                category TEXT NOT NULL CHECK (category IN ('Revenue', 'Expense')),
                status TEXT NOT NULL CHECK (status IN ('Paid', 'Pending')),
                user_id TEXT NOT NULL,
                user_profile TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    // Indexes for the filterable and sortable columns.
    for (name, column) in [
        ("idx_transaction_user_id", "user_id"),
        ("idx_transaction_category", "category"),
        ("idx_transaction_status", "status"),
        ("idx_transaction_date", "date DESC"),
        ("idx_transaction_amount", "amount"),
    ] {
        connection.execute(
            &format!("CREATE INDEX IF NOT EXISTS {name} ON \"transaction\"({column});"),
            (),
        )?;
    }

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in [TRANSACTION_COLUMNS], in order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        status: row.get(4)?,
        user_id: row.get(5)?,
        user_profile: row.get(6)?,
        description: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
