//! Authentication middleware that checks the bearer token on protected routes.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use crate::{
    Error,
    app_state::JwtKeys,
    auth::{UserID, token::decode_token},
};

/// The user a request was authenticated as.
///
/// Handlers behind [auth_guard] can receive this with `Extension(identity): Extension<Identity>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The ID of the authenticated user.
    pub id: UserID,
    /// The email of the authenticated user.
    pub email: String,
}

/// Middleware function that checks for a valid bearer token in the `Authorization` header.
///
/// If the token is valid, the user's [Identity] is placed into the request extensions and the
/// request is executed normally. A request without a token gets a 401 response and a request
/// with an invalid or expired token gets a 403 response. A credential under any scheme other
/// than `Bearer` counts as an invalid token.
pub async fn auth_guard(
    State(keys): State<JwtKeys>,
    authorization: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match authorization {
        Ok(TypedHeader(Authorization(bearer))) if !bearer.token().is_empty() => {
            bearer.token().to_owned()
        }
        Ok(_) => return Error::MissingToken.into_response(),
        Err(_) => {
            let error = match request.headers().get(AUTHORIZATION) {
                Some(value) if has_credential(value) => Error::InvalidToken,
                _ => Error::MissingToken,
            };
            return error.into_response();
        }
    };

    let claims = match decode_token(&token, &keys) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    request.extensions_mut().insert(Identity {
        id: claims.id,
        email: claims.email,
    });

    next.run(request).await
}

/// Whether an `Authorization` value has something after its scheme, e.g. `Basic abc`.
fn has_credential(value: &HeaderValue) -> bool {
    value
        .to_str()
        .ok()
        .and_then(|text| text.split(' ').nth(1))
        .is_some_and(|credential| !credential.is_empty())
}
