//! This file defines the route for checking a token and fetching the user it belongs to.

use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{
    Error,
    auth::{Identity, User, get_user_by_id, log_in::AuthState},
};

/// The user that a token belongs to.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// The authenticated user, without their password hash.
    pub user: User,
}

/// Get the user for the bearer token on the request.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user was deleted after the token was issued.
pub async fn get_verify(
    State(state): State<AuthState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<VerifyResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(identity.id, &connection)?;

    Ok(Json(VerifyResponse { user }))
}
