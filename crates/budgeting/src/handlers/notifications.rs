use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::{
    handlers::{error::AppError, records::outcome_response},
    state::AppState,
};

/// Mark a notification as read (POST /api/notifications/{id}/read).
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let outcome = state.services.notifications.mark_as_read(&id).await?;
    Ok(outcome_response(outcome))
}
