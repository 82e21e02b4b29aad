mod error;
mod operations;
mod record;
mod reports;
mod requests;
mod types;

pub use error::FinanceError;
pub use operations::Validate;
pub use record::{Record, COLLECTIONS};
pub use reports::{
    budget_performance, goal_progress, summarize_transactions, BudgetPerformance, CategoryTotal,
    GoalProgress, TransactionSummary,
};
pub use requests::{
    AccountPatch, AccountQuery, BudgetPatch, BudgetQuery, ByIdRequest, CategoryPatch,
    CategoryQuery, GoalPatch, GoalQuery, NewAccount, NewBudget, NewCategory, NewGoal,
    NewNotification, NewTransaction, NotificationPatch, NotificationQuery, PeriodReportRequest,
    TransactionPatch, TransactionQuery, UpdateRequest, UserReportRequest,
};
pub use types::{
    Account, Budget, BudgetPeriod, Category, CategoryKind, DateRange, Goal, GoalStatus,
    Notification, Transaction, TransactionKind,
};
