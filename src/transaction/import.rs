//! Bulk loading of transactions from JSON records.

use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    transaction::{
        Category, Status, Transaction, TransactionBuilder, create_transaction,
        date::date_serde, delete_all_transactions,
    },
};

/// A transaction as it appears in an import file.
///
/// Any `id` in the file is ignored, the database assigns new ones.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    /// A plain date or an RFC 3339 date-time.
    #[serde(with = "date_serde")]
    pub date: Date,
    /// The amount of money.
    pub amount: f64,
    /// "Revenue" or "Expense".
    pub category: Category,
    /// "Paid" or "Pending".
    pub status: Status,
    /// Who the transaction belongs to.
    pub user_id: String,
    /// URL of the person's profile picture.
    pub user_profile: String,
    /// An optional note about the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<TransactionRecord> for TransactionBuilder {
    fn from(record: TransactionRecord) -> Self {
        Transaction::build(
            record.date,
            record.amount,
            record.category,
            record.status,
            &record.user_id,
        )
        .user_profile(&record.user_profile)
        .description(record.description)
    }
}

/// Parse the JSON array of transaction records in `json_text`.
///
/// # Errors
/// Returns [Error::InvalidTransaction] if the text is not an array of records.
pub fn parse_records(json_text: &str) -> Result<Vec<TransactionRecord>, Error> {
    serde_json::from_str(json_text).map_err(|error| Error::InvalidTransaction(error.to_string()))
}

/// Insert `records` in a single SQL transaction, first deleting existing
/// transactions if `clear` is set.
///
/// Returns the number of transactions inserted. If any record fails
/// validation nothing is changed.
///
/// # Errors
/// Returns [Error::InvalidTransaction] naming the position of the first
/// invalid record, or [Error::SqlError] if there is some other SQL error.
pub fn import_transactions(
    records: Vec<TransactionRecord>,
    clear: bool,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    if clear {
        let deleted = delete_all_transactions(&transaction)?;
        tracing::info!("Deleted {deleted} existing transactions");
    }

    let count = records.len();
    for (index, record) in records.into_iter().enumerate() {
        create_transaction(record.into(), &transaction).map_err(|error| match error {
            Error::InvalidTransaction(reason) => {
                Error::InvalidTransaction(format!("record {index}: {reason}"))
            }
            error => error,
        })?;
    }

    transaction.commit()?;

    Ok(count)
}

#[cfg(test)]
mod import_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Category, Status, Transaction, create_transaction, query::Predicate,
            sqlite_store::SQLiteTransactionStore, store::TransactionStore,
        },
    };

    use super::{import_transactions, parse_records};

    const RECORDS: &str = r#"[
        {
            "id": 1,
            "date": "2024-01-15T08:34:12Z",
            "amount": 1500.5,
            "category": "Revenue",
            "status": "Paid",
            "user_id": "user_001",
            "user_profile": "https://example.com/user_001.png"
        },
        {
            "id": 2,
            "date": "2024-02-01",
            "amount": 20,
            "category": "Expense",
            "status": "Pending",
            "user_id": "user_002",
            "user_profile": "https://example.com/user_002.png",
            "description": "Lunch"
        }
    ]"#;

    fn get_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn count(connection: Connection) -> u64 {
        let store = SQLiteTransactionStore::new(std::sync::Arc::new(std::sync::Mutex::new(
            connection,
        )));
        store.count(&Predicate::default()).unwrap()
    }

    #[test]
    fn parses_dates_and_optional_fields() {
        let records = parse_records(RECORDS).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date!(2024 - 01 - 15));
        assert_eq!(records[0].description, None);
        assert_eq!(records[1].category, Category::Expense);
        assert_eq!(records[1].description.as_deref(), Some("Lunch"));
    }

    #[test]
    fn imports_all_records() {
        let connection = get_db_connection();

        let imported =
            import_transactions(parse_records(RECORDS).unwrap(), false, &connection).unwrap();

        assert_eq!(imported, 2);
        assert_eq!(count(connection), 2);
    }

    #[test]
    fn clear_replaces_existing_transactions() {
        let connection = get_db_connection();
        create_transaction(
            Transaction::build(
                date!(2023 - 12 - 31),
                1.0,
                Category::Expense,
                Status::Paid,
                "old",
            )
            .user_profile("https://example.com/old.png"),
            &connection,
        )
        .unwrap();

        import_transactions(parse_records(RECORDS).unwrap(), true, &connection).unwrap();

        assert_eq!(count(connection), 2);
    }

    #[test]
    fn invalid_record_aborts_whole_import() {
        let connection = get_db_connection();
        let mut records = parse_records(RECORDS).unwrap();
        records[1].amount = -5.0;

        let result = import_transactions(records, false, &connection);

        assert!(matches!(
            result,
            Err(Error::InvalidTransaction(reason)) if reason.starts_with("record 1")
        ));
        assert_eq!(count(connection), 0);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            parse_records("{\"not\": \"an array\"}"),
            Err(Error::InvalidTransaction(_))
        ));
    }
}
