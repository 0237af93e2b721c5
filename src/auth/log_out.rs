//! Log-out route handler.
//!
//! Tokens are stateless, so logging out only acknowledges the request and the client discards
//! its token.

use axum::Json;
use serde_json::{Value, json};

/// Acknowledge a log-out request.
pub async fn post_log_out() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}
