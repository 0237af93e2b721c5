//! Defines the claims carried by bearer tokens and how to sign and verify them.

use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    app_state::JwtKeys,
    auth::{User, UserID},
};

/// How long a token is valid for after log-in or registration.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The claims in a bearer token.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub id: UserID,
    /// The email of the user the token was issued to.
    pub email: String,
    /// When the token was issued, as a UNIX timestamp.
    pub iat: i64,
    /// When the token expires, as a UNIX timestamp.
    pub exp: i64,
}

/// Create a signed token for `user` that expires after `duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn create_token(user: &User, keys: &JwtKeys, duration: Duration) -> Result<String, Error> {
    let issued_at = OffsetDateTime::now_utc();
    let claims = Claims {
        id: user.id,
        email: user.email.clone(),
        iat: issued_at.unix_timestamp(),
        exp: (issued_at + duration).unix_timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify the signature and expiry of `token` and get its claims.
///
/// # Errors
///
/// Returns [Error::InvalidToken] if the token is malformed, was signed with a different key or
/// has expired.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|error| {
            tracing::debug!("rejected bearer token: {error}");
            Error::InvalidToken
        })
}
