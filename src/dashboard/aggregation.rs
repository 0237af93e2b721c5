//! Summary statistics over a set of transactions.
//!
//! Only settled transactions count towards money totals: revenue is the sum of
//! paid revenue and expenses the sum of paid expenses. Every transaction counts
//! towards the number of transactions, whatever its status.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::transaction::{Category, Status, Transaction};

/// Revenue and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyData {
    /// The month as "YYYY-MM".
    pub month: String,
    /// Paid revenue in the month.
    pub revenue: f64,
    /// Paid expenses in the month.
    pub expenses: f64,
}

/// Paid totals for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryData {
    /// The category name.
    pub category: String,
    /// The sum of paid amounts in the category.
    pub amount: f64,
    /// The number of paid transactions in the category.
    pub count: u64,
}

/// Paid expenses for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserExpenseData {
    /// The user the expenses belong to.
    #[serde(rename = "user_id")]
    pub user_id: String,
    /// The sum of the user's paid expenses.
    pub total_expenses: f64,
    /// The number of paid expenses the user has.
    pub transaction_count: u64,
}

/// The figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// The sum of paid revenue.
    pub total_revenue: f64,
    /// The sum of paid expenses.
    pub total_expenses: f64,
    /// `total_revenue - total_expenses`.
    pub total_balance: f64,
    /// The number of transactions of any category and status.
    pub total_transactions: u64,
    /// Paid revenue and expenses per month, oldest month first.
    pub monthly_data: Vec<MonthlyData>,
    /// Paid totals per category, in the order the categories first appear.
    pub category_data: Vec<CategoryData>,
    /// Paid expenses per user, largest total first.
    pub user_expenses: Vec<UserExpenseData>,
}

fn is_paid_revenue(transaction: &Transaction) -> bool {
    transaction.category == Category::Revenue && transaction.status == Status::Paid
}

fn is_paid_expense(transaction: &Transaction) -> bool {
    transaction.category == Category::Expense && transaction.status == Status::Paid
}

/// Compute the dashboard summary for `transactions`.
///
/// `transactions` should be every transaction in the store, not a page of them.
pub fn summarize(transactions: &[Transaction]) -> DashboardSummary {
    let total_revenue = transactions
        .iter()
        .filter(|transaction| is_paid_revenue(transaction))
        .map(|transaction| transaction.amount)
        .sum();
    let total_expenses = transactions
        .iter()
        .filter(|transaction| is_paid_expense(transaction))
        .map(|transaction| transaction.amount)
        .sum();

    DashboardSummary {
        total_revenue,
        total_expenses,
        total_balance: total_revenue - total_expenses,
        total_transactions: transactions.len() as u64,
        monthly_data: monthly_data(transactions),
        category_data: category_breakdown(transactions),
        user_expenses: user_expenses(transactions),
    }
}

/// Groups transactions by month.
///
/// Every month with a transaction gets a bucket, even if none of its
/// transactions are paid.
///
/// # Returns
/// One entry per month, sorted by month.
pub(super) fn monthly_data(transactions: &[Transaction]) -> Vec<MonthlyData> {
    // (year, month) sorts the same way as the "YYYY-MM" key.
    let mut buckets: BTreeMap<(i32, u8), (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let key = (transaction.date.year(), u8::from(transaction.date.month()));
        let (revenue, expenses) = buckets.entry(key).or_insert((0.0, 0.0));

        if is_paid_revenue(transaction) {
            *revenue += transaction.amount;
        } else if is_paid_expense(transaction) {
            *expenses += transaction.amount;
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), (revenue, expenses))| MonthlyData {
            month: format!("{year:04}-{month:02}"),
            revenue,
            expenses,
        })
        .collect()
}

/// Totals paid transactions by category.
///
/// Only categories that appear are included, in the order they first appear.
pub(super) fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryData> {
    let mut breakdown: Vec<CategoryData> = Vec::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.status == Status::Paid)
    {
        let category = transaction.category.as_str();

        match breakdown.iter_mut().find(|entry| entry.category == category) {
            Some(entry) => {
                entry.amount += transaction.amount;
                entry.count += 1;
            }
            None => breakdown.push(CategoryData {
                category: category.to_owned(),
                amount: transaction.amount,
                count: 1,
            }),
        }
    }

    breakdown
}

/// Totals paid expenses by user.
///
/// # Returns
/// One entry per user with a paid expense, largest total first. Users with
/// equal totals stay in the order they first appear.
pub(super) fn user_expenses(transactions: &[Transaction]) -> Vec<UserExpenseData> {
    let mut totals: Vec<UserExpenseData> = Vec::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| is_paid_expense(transaction))
    {
        match totals
            .iter_mut()
            .find(|entry| entry.user_id == transaction.user_id)
        {
            Some(entry) => {
                entry.total_expenses += transaction.amount;
                entry.transaction_count += 1;
            }
            None => totals.push(UserExpenseData {
                user_id: transaction.user_id.clone(),
                total_expenses: transaction.amount,
                transaction_count: 1,
            }),
        }
    }

    totals.sort_by(|a, b| b.total_expenses.total_cmp(&a.total_expenses));

    totals
}
