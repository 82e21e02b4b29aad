//! Report handlers. Inputs are gathered through the entity services, the
//! arithmetic lives in `budgeting_core::finance`.

use budgeting_core::finance::{
    budget_performance, goal_progress, summarize_transactions, Budget, BudgetPerformance,
    BudgetQuery, DateRange, FinanceError, Goal, GoalProgress, GoalQuery, PeriodReportRequest,
    Transaction, TransactionKind, TransactionQuery, TransactionSummary, UserReportRequest,
};

use super::{EntityService, ServiceError};

type Result<T> = std::result::Result<T, ServiceError>;

fn require_user(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(FinanceError::MissingField("user_id").into());
    }
    Ok(())
}

#[derive(Clone)]
pub struct ReportService {
    transactions: EntityService<Transaction>,
    budgets: EntityService<Budget>,
    goals: EntityService<Goal>,
}

impl ReportService {
    pub fn new(
        transactions: EntityService<Transaction>,
        budgets: EntityService<Budget>,
        goals: EntityService<Goal>,
    ) -> Self {
        Self {
            transactions,
            budgets,
            goals,
        }
    }

    async fn user_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.transactions
            .list(&TransactionQuery {
                user_id: Some(user_id.to_string()),
                ..Default::default()
            })
            .await
    }

    async fn summary(
        &self,
        request: &PeriodReportRequest,
        kind: TransactionKind,
    ) -> Result<TransactionSummary> {
        require_user(&request.user_id)?;
        let range = DateRange::new(request.start_date, request.end_date)?;
        let transactions = self.user_transactions(&request.user_id).await?;
        Ok(summarize_transactions(
            &request.user_id,
            kind,
            range,
            &transactions,
        ))
    }

    /// Expense totals of a user over a date window.
    pub async fn spending(&self, request: &PeriodReportRequest) -> Result<TransactionSummary> {
        self.summary(request, TransactionKind::Expense).await
    }

    /// Income totals of a user over a date window.
    pub async fn income(&self, request: &PeriodReportRequest) -> Result<TransactionSummary> {
        self.summary(request, TransactionKind::Income).await
    }

    pub async fn budget_performance(
        &self,
        request: &UserReportRequest,
    ) -> Result<Vec<BudgetPerformance>> {
        require_user(&request.user_id)?;
        let budgets = self
            .budgets
            .list(&BudgetQuery {
                user_id: Some(request.user_id.clone()),
                ..Default::default()
            })
            .await?;
        let transactions = self.user_transactions(&request.user_id).await?;
        Ok(budget_performance(&budgets, &transactions))
    }

    pub async fn goal_progress(&self, request: &UserReportRequest) -> Result<Vec<GoalProgress>> {
        require_user(&request.user_id)?;
        let goals = self
            .goals
            .list(&GoalQuery {
                user_id: Some(request.user_id.clone()),
            })
            .await?;
        Ok(goal_progress(&goals))
    }
}
