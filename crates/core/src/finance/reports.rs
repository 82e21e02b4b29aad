//! Computed reports. Reports have no collection of their own; they are
//! derived from transactions, budgets and goals on every request.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{Budget, BudgetPeriod, DateRange, Goal, GoalStatus, Transaction, TransactionKind};

/// Sum of transactions for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category_id: String,
    pub total: f64,
    pub count: usize,
}

/// Income or spending of a user over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub user_id: String,
    pub kind: TransactionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: f64,
    pub transaction_count: usize,
    /// Largest total first.
    pub by_category: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPerformance {
    pub budget_id: String,
    pub name: String,
    pub category_id: String,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budgeted: f64,
    pub spent: f64,
    pub remaining: f64,
    pub utilization_percent: f64,
    pub over_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub remaining: f64,
    /// Capped at 100.
    pub percent_complete: f64,
    pub status: GoalStatus,
    pub deadline: NaiveDate,
}

/// Totals the user's transactions of `kind` inside `range`.
pub fn summarize_transactions(
    user_id: &str,
    kind: TransactionKind,
    range: DateRange,
    transactions: &[Transaction],
) -> TransactionSummary {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    let mut total = 0.0;
    let mut transaction_count = 0;

    for transaction in transactions.iter().filter(|t| {
        t.deleted_at.is_none() && t.user_id == user_id && t.kind == kind && range.contains(t.date)
    }) {
        let entry = totals.entry(transaction.category_id.as_str()).or_default();
        entry.0 += transaction.amount;
        entry.1 += 1;
        total += transaction.amount;
        transaction_count += 1;
    }

    let mut by_category: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category_id, (total, count))| CategoryTotal {
            category_id: category_id.to_string(),
            total,
            count,
        })
        .collect();
    by_category.sort_by(|a, b| b.total.total_cmp(&a.total));

    TransactionSummary {
        user_id: user_id.to_string(),
        kind,
        start_date: range.start,
        end_date: range.end,
        total,
        transaction_count,
        by_category,
    }
}

/// Compares each active budget with the expenses booked against its
/// category inside the budget window.
pub fn budget_performance(budgets: &[Budget], transactions: &[Transaction]) -> Vec<BudgetPerformance> {
    budgets
        .iter()
        .filter(|budget| budget.deleted_at.is_none())
        .map(|budget| {
            let spent: f64 = transactions
                .iter()
                .filter(|t| {
                    t.deleted_at.is_none()
                        && t.kind == TransactionKind::Expense
                        && t.user_id == budget.user_id
                        && t.category_id == budget.category_id
                        && budget.start_date <= t.date
                        && t.date <= budget.end_date
                })
                .map(|t| t.amount)
                .sum();

            let utilization_percent = if budget.amount > 0.0 {
                spent / budget.amount * 100.0
            } else {
                0.0
            };

            BudgetPerformance {
                budget_id: budget.id.clone(),
                name: budget.name.clone(),
                category_id: budget.category_id.clone(),
                period: budget.period,
                start_date: budget.start_date,
                end_date: budget.end_date,
                budgeted: budget.amount,
                spent,
                remaining: budget.amount - spent,
                utilization_percent,
                over_budget: spent > budget.amount,
            }
        })
        .collect()
}

/// Progress of each active goal towards its target.
pub fn goal_progress(goals: &[Goal]) -> Vec<GoalProgress> {
    goals
        .iter()
        .filter(|goal| goal.deleted_at.is_none())
        .map(|goal| {
            let percent_complete = if goal.target_amount > 0.0 {
                (goal.current_amount / goal.target_amount * 100.0).min(100.0)
            } else {
                0.0
            };

            GoalProgress {
                goal_id: goal.id.clone(),
                name: goal.name.clone(),
                target_amount: goal.target_amount,
                current_amount: goal.current_amount,
                remaining: (goal.target_amount - goal.current_amount).max(0.0),
                percent_complete,
                status: goal.status,
                deadline: goal.deadline,
            }
        })
        .collect()
}
