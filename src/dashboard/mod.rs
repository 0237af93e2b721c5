//! Dashboard module
//!
//! Provides the summary shown on the dashboard: paid revenue and expense
//! totals, monthly buckets, a category breakdown and expenses per user.

mod aggregation;
mod handlers;
mod service;

pub use aggregation::{CategoryData, DashboardSummary, MonthlyData, UserExpenseData, summarize};
pub use handlers::get_dashboard_summary;
pub use service::DashboardService;
