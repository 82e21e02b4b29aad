//! Computed reports. Nothing here is stored; every call recomputes from the
//! user's active records.

use axum::{
    extract::{Query, State},
    Json,
};

use budgeting_core::finance::{
    BudgetPerformance, GoalProgress, PeriodReportRequest, TransactionSummary, UserReportRequest,
};

use crate::{handlers::error::AppError, state::AppState};

/// Spending report (GET /api/reports/spending?user_id=&start_date=&end_date=).
pub async fn spending_report(
    State(state): State<AppState>,
    Query(request): Query<PeriodReportRequest>,
) -> Result<Json<TransactionSummary>, AppError> {
    Ok(Json(state.services.reports.spending(&request).await?))
}

/// Income report (GET /api/reports/income?user_id=&start_date=&end_date=).
pub async fn income_report(
    State(state): State<AppState>,
    Query(request): Query<PeriodReportRequest>,
) -> Result<Json<TransactionSummary>, AppError> {
    Ok(Json(state.services.reports.income(&request).await?))
}

/// Budget performance report (GET /api/reports/budget-performance?user_id=).
pub async fn budget_performance_report(
    State(state): State<AppState>,
    Query(request): Query<UserReportRequest>,
) -> Result<Json<Vec<BudgetPerformance>>, AppError> {
    Ok(Json(state.services.reports.budget_performance(&request).await?))
}

/// Goal progress report (GET /api/reports/goal-progress?user_id=).
pub async fn goal_progress_report(
    State(state): State<AppState>,
    Query(request): Query<UserReportRequest>,
) -> Result<Json<Vec<GoalProgress>>, AppError> {
    Ok(Json(state.services.reports.goal_progress(&request).await?))
}
