//! This file defines the route for registering a new user.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{
        PasswordHash, ValidatedPassword, create_user,
        log_in::{AuthResponse, AuthState},
        token::create_token,
    },
};

/// The name given to users that register without one.
pub const DEFAULT_USER_NAME: &str = "New User";

/// The data sent in a registration request.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    /// The email to log in with.
    pub email: String,
    /// The new user's password.
    pub password: String,
    /// An optional display name.
    pub name: Option<String>,
}

/// Handler for registration requests.
///
/// On success the user is created and logged in, and the response has the status 201 Created.
///
/// # Errors
///
/// This function will return an error if:
/// - the email or password is empty,
/// - the email is already registered,
/// - or an internal error occurred while hashing the password or signing the token.
pub async fn register_user(
    State(state): State<AuthState>,
    Json(user_data): Json<RegisterForm>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    if user_data.email.trim().is_empty() || user_data.password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let validated_password = ValidatedPassword::new(&user_data.password)?;
    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| tracing::error!("an error occurred while hashing a password: {error}"))?;

    let name = user_data
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_USER_NAME);

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(&user_data.email, name, password_hash, &connection)?
    };
    tracing::info!("Registered user {}", user.email);

    let token = create_token(&user, &state.jwt_keys, state.token_duration)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}
