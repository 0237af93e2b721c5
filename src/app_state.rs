//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::DEFAULT_TOKEN_DURATION,
    dashboard::DashboardService,
    db::initialize,
    pagination::PaginationConfig,
    transaction::{SQLiteTransactionStore, TransactionService, TransactionStore},
};

/// The keys used to sign and verify JSON Web Tokens.
#[derive(Clone)]
pub struct JwtKeys {
    /// The key for signing new tokens.
    pub encoding_key: EncodingKey,
    /// The key for verifying the signature of incoming tokens.
    pub decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtKeys { .. }")
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys used for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,

    /// The duration for which newly issued tokens are valid.
    pub token_duration: Duration,

    /// The config that controls default page sizes and export limits.
    pub pagination_config: PaginationConfig,

    /// The database connection, used for user accounts.
    pub db_connection: Arc<Mutex<Connection>>,

    /// Listing, lookup and user directory queries over transactions.
    pub transaction_service: TransactionService,

    /// Dashboard summaries over transactions.
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// The transaction services are backed by a [SQLiteTransactionStore] sharing the same
    /// connection.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let store = Arc::new(SQLiteTransactionStore::new(connection.clone()));

        Ok(Self::with_store(
            connection,
            store,
            jwt_secret,
            pagination_config,
        ))
    }

    /// Create a new [AppState] where transactions are read from `store`.
    ///
    /// `db_connection` must already be initialized; it is only used for user accounts.
    pub fn with_store(
        db_connection: Arc<Mutex<Connection>>,
        store: Arc<dyn TransactionStore>,
        jwt_secret: &str,
        pagination_config: PaginationConfig,
    ) -> Self {
        Self {
            jwt_keys: create_jwt_keys(jwt_secret),
            token_duration: DEFAULT_TOKEN_DURATION,
            transaction_service: TransactionService::new(store.clone(), pagination_config.clone()),
            dashboard_service: DashboardService::new(store),
            pagination_config,
            db_connection,
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_keys.clone()
    }
}

impl FromRef<AppState> for TransactionService {
    fn from_ref(state: &AppState) -> Self {
        state.transaction_service.clone()
    }
}

impl FromRef<AppState> for DashboardService {
    fn from_ref(state: &AppState) -> Self {
        state.dashboard_service.clone()
    }
}

/// Create the keys for signing and verifying tokens from a `secret` string.
pub fn create_jwt_keys(secret: &str) -> JwtKeys {
    let hash = Sha512::digest(secret);

    JwtKeys {
        encoding_key: EncodingKey::from_secret(&hash),
        decoding_key: DecodingKey::from_secret(&hash),
    }
}
