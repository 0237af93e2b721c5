//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";
const PASSWORD_FIELD: &str = "password";
/// JSON keys whose values are never logged.
const SECRET_FIELDS: [&str; 2] = [PASSWORD_FIELD, "token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Passwords in JSON and URL-encoded request bodies, tokens in JSON response bodies and
/// bearer tokens in headers are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    let display_text = match content_type(&parts.headers) {
        Some(content_type) if content_type.starts_with("application/json") => {
            redact_json_secrets(&body_text)
        }
        Some(content_type) if content_type.starts_with("application/x-www-form-urlencoded") => {
            redact_form_password(&body_text, PASSWORD_FIELD)
        }
        _ => body_text.into_owned(),
    };
    log_body(
        &format!(
            "Received request: {} {}\nheaders: {:#?}",
            parts.method,
            parts.uri,
            redact_headers(&parts.headers)
        ),
        "request",
        &display_text,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };
    let body_text = String::from_utf8_lossy(&body_bytes);
    let display_text = match content_type(&parts.headers) {
        Some(content_type) if content_type.starts_with("application/json") => {
            redact_json_secrets(&body_text)
        }
        _ => body_text.into_owned(),
    };
    log_body(
        &format!(
            "Sending response: {}\nheaders: {:#?}",
            parts.status, parts.headers
        ),
        "response",
        &display_text,
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("could not read body for logging: {error}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer ********"));
    }

    headers
}

/// Replace the value of `field_name` in URL-encoded form text.
fn redact_form_password(form_text: &str, field_name: &str) -> String {
    let prefix = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&prefix) {
                format!("{prefix}{REDACTED}")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Replace the value of every `password` or `token` key in a JSON document.
///
/// Text that is not valid JSON is returned unchanged.
fn redact_json_secrets(json_text: &str) -> String {
    match serde_json::from_str::<Value>(json_text) {
        Ok(mut value) => {
            redact_json_value(&mut value);
            value.to_string()
        }
        Err(_) => json_text.to_owned(),
    }
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if SECRET_FIELDS.contains(&key.as_str()) {
                    *value = Value::String(REDACTED.to_owned());
                } else {
                    redact_json_value(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact_json_value),
        _ => {}
    }
}

/// Get at most `limit` characters of `text`, or `None` if it is not longer than that.
fn truncate(text: &str, limit: usize) -> Option<&str> {
    text.char_indices()
        .nth(limit)
        .map(|(byte_index, _)| &text[..byte_index])
}

fn log_body(summary: &str, kind: &str, body: &str) {
    match truncate(body, LOG_BODY_LENGTH_LIMIT) {
        Some(truncated) => {
            tracing::info!("{summary}\nbody: {truncated}...");
            tracing::debug!("Full {kind} body: {body:?}");
        }
        None => tracing::info!("{summary}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Json, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{
        LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_form_password, redact_json_secrets,
        truncate,
    };

    #[test]
    fn form_password_is_redacted() {
        assert_eq!(
            redact_form_password("email=a%40b.com&password=hunter2&x=1", "password"),
            "email=a%40b.com&password=********&x=1"
        );
        assert_eq!(
            redact_form_password("password=hunter2", "password"),
            "password=********"
        );
        assert_eq!(redact_form_password("email=a", "password"), "email=a");
    }

    #[test]
    fn json_password_is_redacted() {
        let redacted = redact_json_secrets(r#"{"email":"a@b.com","password":"hunter2"}"#);

        let value: Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(value, json!({"email": "a@b.com", "password": "********"}));
    }

    #[test]
    fn invalid_json_is_unchanged() {
        assert_eq!(redact_json_secrets("{not json"), "{not json");
    }

    #[test]
    fn login_response_token_is_redacted() {
        let redacted = redact_json_secrets(
            r#"{"token":"eyJhbGciOiJIUzI1NiJ9.e30.c2ln","user":{"id":1,"username":"alice"}}"#,
        );

        let value: Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(
            value,
            json!({"token": "********", "user": {"id": 1, "username": "alice"}})
        );
        assert!(!redacted.contains("eyJhbGciOiJIUzI1NiJ9"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let truncated = truncate(&text, LOG_BODY_LENGTH_LIMIT).unwrap();

        assert_eq!(truncated.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("short", LOG_BODY_LENGTH_LIMIT), None);
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        async fn echo(Json(body): Json<Value>) -> Json<Value> {
            Json(body)
        }

        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = json!({"email": "a@b.com", "password": "hunter2"});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), body);
    }

    #[tokio::test]
    async fn redaction_does_not_change_the_response_sent() {
        async fn log_in() -> Json<Value> {
            Json(json!({"token": "secret-token", "user": {"id": 1}}))
        }

        let app = Router::new()
            .route("/login", post(log_in))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.post("/login").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["token"], "secret-token");
    }
}
