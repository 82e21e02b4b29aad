use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use budgeting_core::storage::{repository_error_to_status_code, RepositoryError};

use crate::services::ServiceError;

pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = if let Some(service_error) = self.0.downcast_ref::<ServiceError>() {
            Some(service_error.status_code())
        } else {
            self.0
                .downcast_ref::<RepositoryError>()
                .map(repository_error_to_status_code)
        };

        let status_code = code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(error = %self.0, status = %status_code, "Request failed");
        }

        (status_code, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgeting_core::finance::FinanceError;

    #[test]
    fn test_validation_error_is_bad_request() {
        let response =
            AppError::from(ServiceError::Invalid(FinanceError::InvalidDateRange)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_connection_error_is_service_unavailable() {
        let error = ServiceError::from(RepositoryError::ConnectionFailed("down".to_string()));
        assert_eq!(
            AppError::from(error).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_bare_repository_error_is_mapped() {
        let response =
            AppError::from(RepositoryError::InvalidId("zz".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_error_is_internal() {
        let response = AppError(anyhow::anyhow!("unexpected")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
