use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use budgeting_core::finance::{Account, Budget, Category, Goal, Notification, Transaction};

use crate::{
    handlers::{
        health::{livez, readyz},
        notifications::mark_notification_read,
        records::{collection_routes, routes},
        reports::{
            budget_performance_report, goal_progress_report, income_report, spending_report,
        },
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    // API routes with CORS
    let api_routes = Router::new()
        .merge(routes::<Account>())
        .merge(routes::<Budget>())
        .merge(routes::<Category>())
        .merge(routes::<Goal>())
        .merge(routes::<Transaction>())
        // Notifications are created, listed and marked as read
        .merge(collection_routes::<Notification>())
        .route("/notifications/{id}/read", post(mark_notification_read))
        // Reports
        .route("/reports/spending", get(spending_report))
        .route("/reports/income", get(income_report))
        .route("/reports/budget-performance", get(budget_performance_report))
        .route("/reports/goal-progress", get(goal_progress_report))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
