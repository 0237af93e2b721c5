//! Dashboard HTTP handlers.

use axum::{Json, extract::State};

use crate::dashboard::{DashboardService, aggregation::DashboardSummary};

/// Get the dashboard summary over every transaction.
///
/// Store failures produce an all-zero summary rather than an error response.
pub async fn get_dashboard_summary(
    State(service): State<DashboardService>,
) -> Json<DashboardSummary> {
    Json(service.get_dashboard_summary())
}

#[cfg(test)]
mod dashboard_handler_tests {
    use std::sync::Arc;

    use axum::{Router, routing::get};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        dashboard::DashboardService,
        endpoints,
        transaction::{
            Category, Status, TransactionStore,
            test_utils::{FailingTransactionStore, InMemoryTransactionStore, transaction},
        },
    };

    use super::get_dashboard_summary;

    fn get_test_server(store: Arc<dyn TransactionStore>) -> TestServer {
        let app = Router::new()
            .route(endpoints::DASHBOARD_SUMMARY, get(get_dashboard_summary))
            .with_state(DashboardService::new(store));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn returns_summary_json() {
        let server = get_test_server(Arc::new(InMemoryTransactionStore::new(vec![
            transaction(1, date!(2024 - 01 - 15), 100.0, Category::Revenue, Status::Paid, "bob"),
            transaction(2, date!(2024 - 01 - 16), 40.0, Category::Expense, Status::Paid, "bob"),
        ])));

        let response = server.get(endpoints::DASHBOARD_SUMMARY).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["totalBalance"], json!(60.0));
        assert_eq!(body["totalTransactions"], json!(2));
        assert_eq!(
            body["userExpenses"],
            json!([{"user_id": "bob", "totalExpenses": 40.0, "transactionCount": 1}])
        );
    }

    #[tokio::test]
    async fn store_failure_is_zeroed_not_an_error() {
        let server = get_test_server(Arc::new(FailingTransactionStore));

        let response = server.get(endpoints::DASHBOARD_SUMMARY).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({
                "totalRevenue": 0.0,
                "totalExpenses": 0.0,
                "totalBalance": 0.0,
                "totalTransactions": 0,
                "monthlyData": [],
                "categoryData": [],
                "userExpenses": []
            })
        );
    }
}
