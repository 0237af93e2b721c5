//! Computes the dashboard summary from a [TransactionStore].

use std::sync::Arc;

use crate::{
    dashboard::aggregation::{DashboardSummary, summarize},
    transaction::{Predicate, Sort, TransactionStore},
};

/// Summarises every transaction in a store for the dashboard.
///
/// Created once at start-up and shared between requests.
#[derive(Debug, Clone)]
pub struct DashboardService {
    store: Arc<dyn TransactionStore>,
}

impl DashboardService {
    /// Create a service that reads from `store`.
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Summarise every transaction in the store.
    ///
    /// If the store fails, the error is logged and an all-zero summary is returned.
    pub fn get_dashboard_summary(&self) -> DashboardSummary {
        match self
            .store
            .find(&Predicate::default(), Sort::default(), 0, None)
        {
            Ok(transactions) => {
                tracing::debug!(
                    "summarising {} transactions for the dashboard",
                    transactions.len()
                );
                summarize(&transactions)
            }
            Err(error) => {
                tracing::error!(
                    "could not get transactions for the dashboard, returning an empty summary: {error}"
                );
                DashboardSummary::default()
            }
        }
    }
}
