//! This file defines the route for handling log-in requests.
//! The auth module handles the lower level token and password logic.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::JwtKeys,
    auth::{User, get_user_by_email, token::create_token},
};

/// The state needed to log in, register and look up the authenticated user.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys used for signing and verifying bearer tokens.
    pub jwt_keys: JwtKeys,
    /// The duration for which newly issued tokens are valid.
    pub token_duration: Duration,
    /// The database connection holding the user table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials sent in a log-in request.
///
/// Missing fields are treated as empty so that they are reported as missing credentials
/// rather than as a malformed request.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// A freshly issued token and the user it belongs to.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user, without their password hash.
    pub user: User,
}

/// Handler for log-in requests.
///
/// On success the response contains a new bearer token and the user.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email or password is empty.
/// - The email does not belong to a user or the password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn post_log_in(
    State(state): State<AuthState>,
    Json(credentials): Json<LogInData>,
) -> Result<Json<AuthResponse>, Error> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_email(&credentials.email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            Error::HashingError(error.to_string())
        })?;

    if !is_password_valid {
        tracing::info!("Failed log-in attempt for {}", user.email);
        return Err(Error::InvalidCredentials);
    }

    let token = create_token(&user, &state.jwt_keys, state.token_duration)?;

    Ok(Json(AuthResponse { token, user }))
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        app_state::create_jwt_keys,
        auth::{
            DEFAULT_TOKEN_DURATION, PasswordHash, UserID, create_user, create_user_table,
            token::decode_token,
        },
        endpoints,
    };

    use super::{AuthState, post_log_in};

    fn get_test_state() -> AuthState {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        create_user(
            "test@example.com",
            "Test User",
            PasswordHash::from_raw_password("hunter2", 4).unwrap(),
            &connection,
        )
        .unwrap();

        AuthState {
            jwt_keys: create_jwt_keys("foobar"),
            token_duration: DEFAULT_TOKEN_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: AuthState) -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state();
        let keys = state.jwt_keys.clone();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "Test@Example.com", "password": "hunter2"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["user"],
            json!({"id": 1, "email": "test@example.com", "name": "Test User"})
        );
        let claims = decode_token(body["token"].as_str().unwrap(), &keys).unwrap();
        assert_eq!(claims.id, UserID::new(1));
        assert_eq!(claims.email, "test@example.com");
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "test@example.com", "password": "wrong"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>(),
            json!({"error": "Invalid credentials"})
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "nobody@example.com", "password": "hunter2"}))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_fields() {
        let server = get_test_server(get_test_state());

        let missing_password = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "test@example.com"}))
            .await;
        let empty_email = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "", "password": "hunter2"}))
            .await;

        missing_password.assert_status_bad_request();
        empty_email.assert_status_bad_request();
        assert_eq!(
            missing_password.json::<Value>(),
            json!({"error": "Email and password are required"})
        );
    }
}
