//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::{
    AppState,
    auth::{auth_guard, get_verify, post_log_in, post_log_out, register_user},
    dashboard::get_dashboard_summary,
    endpoints,
    export::{export_csv, get_export_preview},
    not_found::get_404_not_found,
    transaction::{get_transaction, get_transaction_users, get_transactions},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index))
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::REGISTER, post(register_user));

    let protected_routes = Router::new()
        .route(endpoints::VERIFY, get(get_verify))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .route(endpoints::TRANSACTION_USERS, get(get_transaction_users))
        .route(endpoints::TRANSACTION_USERS_LIST, get(get_transaction_users))
        .route(endpoints::TRANSACTION, get(get_transaction))
        .route(endpoints::DASHBOARD_SUMMARY, get(get_dashboard_summary))
        .route(endpoints::EXPORT_CSV, post(export_csv))
        .route(endpoints::EXPORT_PREVIEW, post(get_export_preview))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(cors_layer())
        .with_state(state)
}

/// Allow any origin to make credentialed requests by echoing it back.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Describe the API.
async fn get_index() -> Json<Value> {
    Json(json!({
        "message": "Financial Analytics API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// Report that the server is up.
async fn get_health() -> Json<Value> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({ "status": "OK", "timestamp": timestamp }))
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        AppState,
        auth::{PasswordHash, create_user},
        endpoints,
        pagination::PaginationConfig,
        transaction::{Category, Status, Transaction, create_transaction},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            PaginationConfig::default(),
        )
        .unwrap();

        {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                "admin@loopr.com",
                "Admin User",
                PasswordHash::from_raw_password("password", 4).unwrap(),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(
                    date!(2024 - 01 - 15),
                    5000.0,
                    Category::Revenue,
                    Status::Paid,
                    "john_doe",
                )
                .user_profile("https://example.com/john_doe.png"),
                &connection,
            )
            .unwrap();
        }

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer) -> String {
        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"email": "admin@loopr.com", "password": "password"}))
            .await;
        response.assert_status_ok();

        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn health_is_public() {
        let server = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "OK");
    }

    #[tokio::test]
    async fn root_describes_api() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "running");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").await;

        response.assert_status_not_found();
        assert_eq!(response.json::<Value>(), json!({"error": "Route not found"}));
    }

    #[tokio::test]
    async fn protected_routes_need_token() {
        let server = get_test_server();

        for endpoint in [
            endpoints::TRANSACTIONS,
            endpoints::TRANSACTION_USERS,
            endpoints::DASHBOARD_SUMMARY,
            endpoints::VERIFY,
        ] {
            server
                .get(endpoint)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
        server
            .post(endpoints::EXPORT_CSV)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logged_in_user_can_list_transactions() {
        let server = get_test_server();
        let token = log_in(&server).await;

        let response = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["pagination"]["totalItems"], 1);
        assert_eq!(body["data"][0]["user_id"], "john_doe");
    }

    #[tokio::test]
    async fn users_list_alias_matches_users() {
        let server = get_test_server();
        let token = log_in(&server).await;

        let users = server
            .get(endpoints::TRANSACTION_USERS)
            .authorization_bearer(&token)
            .await;
        let users_list = server
            .get(endpoints::TRANSACTION_USERS_LIST)
            .authorization_bearer(&token)
            .await;

        users.assert_status_ok();
        assert_eq!(users.json::<Value>(), users_list.json::<Value>());
        assert_eq!(
            users.json::<Value>(),
            json!({"users": [{"id": "john_doe", "displayName": "John Doe"}]})
        );
    }

    #[tokio::test]
    async fn verify_returns_logged_in_user() {
        let server = get_test_server();
        let token = log_in(&server).await;

        let response = server
            .get(endpoints::VERIFY)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({"user": {"id": 1, "email": "admin@loopr.com", "name": "Admin User"}})
        );
    }

    #[tokio::test]
    async fn dashboard_summary_counts_paid_revenue() {
        let server = get_test_server();
        let token = log_in(&server).await;

        let response = server
            .get(endpoints::DASHBOARD_SUMMARY)
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["totalRevenue"], json!(5000.0));
    }

    #[tokio::test]
    async fn cors_mirrors_origin() {
        let server = get_test_server();

        let response = server
            .get(endpoints::HEALTH)
            .add_header("Origin", "http://localhost:3000")
            .await;

        assert_eq!(
            response.header("access-control-allow-origin"),
            "http://localhost:3000"
        );
        assert_eq!(response.header("access-control-allow-credentials"), "true");
    }
}
